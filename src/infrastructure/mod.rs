//! Infrastructure layer: configuration, logging setup and wiring.

pub mod bootstrap;
pub mod config;
