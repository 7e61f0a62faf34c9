//! Collaborators a detector reads from.

use chrono::{DateTime, Utc};

use crate::application::cancel::CancelToken;
use crate::domain::id::TenantId;
use crate::port::outbound::store::{AlertStore, SnapshotStore};

/// Read-only view over history plus the clock and cancel flag for one pass.
#[derive(Clone, Copy)]
pub struct DetectContext<'a> {
    pub snapshots: &'a dyn SnapshotStore,
    pub alerts: &'a dyn AlertStore,
    pub tenant_id: &'a TenantId,
    pub now: DateTime<Utc>,
    pub cancel: &'a CancelToken,
}
