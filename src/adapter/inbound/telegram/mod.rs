//! Telegram inline-button callbacks.

pub mod listener;
