//! Messenger that writes deliveries to the log.

use async_trait::async_trait;
use tracing::info;

use crate::error::Result;
use crate::port::outbound::messenger::{Messenger, OutboundMessage};

/// Stands in for a chat transport during dry runs and local development.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMessenger;

#[async_trait]
impl Messenger for LogMessenger {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, message: &OutboundMessage) -> Result<()> {
        let buttons: usize = message.keyboard.iter().map(Vec::len).sum();
        info!(
            chat_id = message.chat_id,
            buttons,
            chars = message.html.chars().count(),
            "message delivered to log"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_accepts() {
        let message = OutboundMessage::new(7, "<b>hi</b>");
        assert!(LogMessenger.send(&message).await.is_ok());
        assert_eq!(LogMessenger.name(), "log");
    }
}
