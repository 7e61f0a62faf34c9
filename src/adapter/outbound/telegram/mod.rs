//! Telegram Bot API messenger.

pub mod messenger;
