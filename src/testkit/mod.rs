//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`domain`]: Builders for snapshots, alerts, recommendations, users.
//! - [`kv`]: `FaultyKv`, an in-memory store with switchable faults.
//! - [`llm`]: `ScriptedLlm`, replaying canned completions.
//! - [`messenger`]: `RecordingMessenger`, capturing deliveries.

pub mod domain;
pub mod kv;
pub mod llm;
pub mod messenger;
