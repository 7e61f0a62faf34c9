//! Per-user digests: selection, theme grouping, rendering and delivery.

pub mod config;
pub mod render;
pub mod select;
pub mod service;
