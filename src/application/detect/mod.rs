//! Standard and fast dislocation detectors.

pub mod config;
pub mod context;
pub mod dislocation;
pub mod fast;
pub mod gate;
