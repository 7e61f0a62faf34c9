//! Per-user effective settings: override coercion, layered resolution and
//! the key-value cache.

pub mod cache;
pub mod coerce;
pub mod config;
pub mod resolve;
