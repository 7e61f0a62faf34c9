//! SQLite persistence for snapshots and alerts using Diesel ORM.

pub mod database;
pub mod store;
