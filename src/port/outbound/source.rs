//! Snapshot feed port.

use async_trait::async_trait;

use crate::domain::snapshot::Snapshot;
use crate::error::Result;

/// Yields the newest snapshot per contract on each call.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<Snapshot>>;
}
