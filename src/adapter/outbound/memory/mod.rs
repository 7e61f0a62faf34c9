//! In-process adapters for the key-value store, record stores and user
//! directory.

pub mod directory;
pub mod kv;
pub mod store;
