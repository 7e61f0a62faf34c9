//! Outbound adapters (driven side).

pub mod feed;
pub mod guard;
pub mod llm;
pub mod log;
pub mod memory;
pub mod sqlite;
#[cfg(feature = "telegram")]
pub mod telegram;
