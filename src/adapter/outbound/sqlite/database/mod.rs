//! SQLite database modules.
//!
//! Connection management, schema definitions and row types.

pub mod connection;
pub mod model;
pub mod schema;
