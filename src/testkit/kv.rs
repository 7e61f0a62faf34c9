//! [`KeyValueStore`] with switchable faults over [`MemoryKv`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::adapter::outbound::memory::kv::MemoryKv;
use crate::error::{Error, Result};
use crate::port::outbound::kv::KeyValueStore;

#[derive(Default)]
pub struct FaultyKv {
    inner: MemoryKv,
    failing_reads: Mutex<Vec<String>>,
    failing_incrs: AtomicUsize,
}

impl FaultyKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every `get` of a key starting with `prefix`.
    pub fn fail_reads(&self, prefix: &str) {
        self.failing_reads.lock().push(prefix.to_string());
    }

    /// Fail the next `count` calls to `incr_by`.
    pub fn fail_next_incrs(&self, count: usize) {
        self.failing_incrs.store(count, Ordering::SeqCst);
    }

    /// Clear every fault.
    pub fn heal(&self) {
        self.failing_reads.lock().clear();
        self.failing_incrs.store(0, Ordering::SeqCst);
    }

    fn read_fails(&self, key: &str) -> bool {
        self.failing_reads
            .lock()
            .iter()
            .any(|prefix| key.starts_with(prefix.as_str()))
    }

    fn take_incr_fault(&self) -> bool {
        self.failing_incrs
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl KeyValueStore for FaultyKv {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        if self.read_fails(key) {
            return Err(Error::Connection(format!("read of {key} failed")));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        self.inner.set(key, value, ttl).await
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> Result<bool> {
        self.inner.set_nx(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.inner.delete(key).await
    }

    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64> {
        if self.take_incr_fault() {
            return Err(Error::Connection(format!("incr of {key} failed")));
        }
        self.inner.incr_by(key, delta).await
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        self.inner.expire(key, ttl).await
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        self.inner.ttl(key).await
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        self.inner.scan_prefix(prefix).await
    }
}
