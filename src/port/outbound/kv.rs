//! Key-value store port.
//!
//! Models the small subset of Redis semantics the pipeline relies on:
//! set-if-absent with TTL for claims and markers, counters with expiry,
//! and prefix scans for introspection.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// TTL-aware key-value store.
///
/// # Atomicity
///
/// [`set_nx`](Self::set_nx) must be an atomic test-and-set across every
/// process sharing the store: it is the only cross-process mutual exclusion
/// the pipeline uses (copilot theme claims, the scheduled-pass lock).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a live value.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Unconditionally write a value, with an optional TTL.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;

    /// Write only if the key is absent (or expired). Returns `true` when
    /// this call created the key.
    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> Result<bool>;

    /// Delete a key. Returns `true` if a live key was removed.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Atomically add `delta` to an integer value, creating it at zero.
    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64>;

    /// Set a TTL on an existing key. Returns `false` if the key is absent.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool>;

    /// Remaining TTL of a live key, `None` if absent or persistent.
    async fn ttl(&self, key: &str) -> Result<Option<Duration>>;

    /// Live keys starting with `prefix`, sorted. Administrative use only.
    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>>;
}
