//! Scheduled pass and the loop that drives it.

pub mod config;
pub mod lock;
pub mod pass;
pub mod report;
pub mod scheduler;
