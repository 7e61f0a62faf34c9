//! Mutual exclusion between overlapping scheduled passes.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;
use uuid::Uuid;

use crate::application::keyspace;
use crate::error::Result;
use crate::port::outbound::kv::KeyValueStore;

/// Proof of lock ownership: the token written into the lock key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockToken(String);

impl LockToken {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone)]
pub struct PassLock {
    kv: Arc<dyn KeyValueStore>,
}

impl PassLock {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Take the lock, or `None` if another pass holds it.
    pub async fn acquire(&self, ttl: Duration) -> Result<Option<LockToken>> {
        let token = Uuid::new_v4().to_string();
        let acquired = self.kv.set_nx(keyspace::INGEST_LOCK, &token, ttl).await?;
        Ok(acquired.then_some(LockToken(token)))
    }

    /// Release the lock if it still carries our token. A lock that expired
    /// and was taken by another pass is left alone.
    pub async fn release(&self, token: &LockToken) {
        match self.kv.get(keyspace::INGEST_LOCK).await {
            Ok(Some(current)) if current == token.0 => {
                if let Err(error) = self.kv.delete(keyspace::INGEST_LOCK).await {
                    warn!(error = %error, "pass lock release failed");
                }
            }
            Ok(_) => warn!("pass lock no longer held at release"),
            Err(error) => warn!(error = %error, "pass lock read failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::memory::kv::MemoryKv;

    #[tokio::test(start_paused = true)]
    async fn lock_is_exclusive_and_released_only_by_owner() {
        let kv = Arc::new(MemoryKv::new());
        let lock = PassLock::new(kv.clone());
        let ttl = Duration::from_secs(600);

        let token = lock.acquire(ttl).await.unwrap().unwrap();
        assert!(lock.acquire(ttl).await.unwrap().is_none());

        tokio::time::advance(Duration::from_secs(601)).await;
        let other = lock.acquire(ttl).await.unwrap().unwrap();
        lock.release(&token).await;
        assert_eq!(
            kv.get(keyspace::INGEST_LOCK).await.unwrap().as_deref(),
            Some(other.as_str())
        );

        lock.release(&other).await;
        assert!(lock.acquire(ttl).await.unwrap().is_some());
    }
}
