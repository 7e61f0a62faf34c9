//! Log-only adapters used when no external service is configured.

pub mod messenger;
