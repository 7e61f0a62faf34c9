//! Recording [`Messenger`] for delivery assertions.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::port::outbound::messenger::{Messenger, OutboundMessage};

#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<OutboundMessage>>,
    failing: AtomicBool,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent send fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, message: &OutboundMessage) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Delivery("recording messenger set to fail".into()));
        }
        self.sent.lock().push(message.clone());
        Ok(())
    }
}
