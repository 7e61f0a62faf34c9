//! Circuit breaking, concurrency limiting and retry for external calls.

pub mod breaker;
pub mod call;
pub mod config;
pub mod wrap;
