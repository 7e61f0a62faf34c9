//! Messaging delivery port.

use async_trait::async_trait;

use crate::error::Result;

/// One inline button: a label and the opaque callback payload it sends back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub callback_data: String,
}

impl Button {
    pub fn new(label: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            callback_data: callback_data.into(),
        }
    }
}

/// An HTML-formatted message with optional rows of buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub chat_id: i64,
    pub html: String,
    pub keyboard: Vec<Vec<Button>>,
}

impl OutboundMessage {
    pub fn new(chat_id: i64, html: impl Into<String>) -> Self {
        Self {
            chat_id,
            html: html.into(),
            keyboard: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_keyboard(mut self, keyboard: Vec<Vec<Button>>) -> Self {
        self.keyboard = keyboard;
        self
    }
}

/// Delivers messages to users.
///
/// Unlike a fire-and-forget notifier, `send` reports delivery failure so
/// callers can release claims and retry later.
#[async_trait]
pub trait Messenger: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, message: &OutboundMessage) -> Result<()>;
}
