//! Telegram delivery for digests and copilot messages.
//!
//! Messages are sent with `HTML` parse mode and an inline keyboard built
//! from the message's button rows. Requires the `telegram` feature.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode};
use tracing::debug;

use crate::error::{ConfigError, Error, Result};
use crate::port::outbound::messenger::{Button, Messenger, OutboundMessage};

/// Sends [`OutboundMessage`]s through the Bot API.
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    #[must_use]
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// Build from `TELEGRAM_BOT_TOKEN`.
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("TELEGRAM_BOT_TOKEN").map_err(|_| ConfigError::MissingField {
            field: "TELEGRAM_BOT_TOKEN",
        })?;
        Ok(Self::new(Bot::new(token)))
    }
}

/// Inline keyboard for `rows`, or `None` when there are no buttons.
#[must_use]
pub fn inline_keyboard(rows: &[Vec<Button>]) -> Option<InlineKeyboardMarkup> {
    let rows: Vec<Vec<InlineKeyboardButton>> = rows
        .iter()
        .filter(|row| !row.is_empty())
        .map(|row| {
            row.iter()
                .map(|b| InlineKeyboardButton::callback(b.label.clone(), b.callback_data.clone()))
                .collect()
        })
        .collect();
    (!rows.is_empty()).then(|| InlineKeyboardMarkup::new(rows))
}

#[async_trait]
impl Messenger for TelegramMessenger {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn send(&self, message: &OutboundMessage) -> Result<()> {
        let mut request = self
            .bot
            .send_message(ChatId(message.chat_id), message.html.clone())
            .parse_mode(ParseMode::Html);
        if let Some(markup) = inline_keyboard(&message.keyboard) {
            request = request.reply_markup(markup);
        }
        request
            .await
            .map_err(|e| Error::Delivery(e.to_string()))?;
        debug!(chat_id = message.chat_id, "telegram message delivered");
        Ok(())
    }
}
