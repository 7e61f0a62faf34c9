//! pmd - prediction-market dislocation digests with an AI copilot.
//!
//! A scheduled pass ingests market snapshots, detects price dislocations
//! (standard and fast), groups them into themes and delivers per-user
//! digests. Eligible themes get a read-only copilot recommendation with
//! confirm/skip/mute buttons.
//!
//! # Layout
//!
//! - [`domain`] - plain data types
//! - [`port`] - traits for stores, key-value state, completion and delivery
//! - [`application`] - detection, classification, themes, settings, digest,
//!   copilot and the scheduled pass
//! - [`adapter`] - CLI, Telegram, SQLite, in-memory and HTTP adapters
//! - [`infrastructure`] - configuration, logging and wiring
//!
//! # Features
//!
//! - `telegram` (default) - Telegram delivery and callback listener
//! - `testkit` - builders and test doubles for integration tests

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
