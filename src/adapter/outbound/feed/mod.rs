//! Snapshot sources.

pub mod file;
