//! Alert classification: price behaviour, decision table, signal speed.

pub mod behavior;
pub mod classifier;
pub mod config;
pub mod history;
pub mod speed;
