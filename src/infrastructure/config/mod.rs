//! Infrastructure configuration modules.

pub mod feed;
pub mod llm;
pub mod logging;
pub mod settings;
pub mod telegram;
