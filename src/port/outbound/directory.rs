//! Subscriber directory port.

use async_trait::async_trait;

use crate::domain::id::UserId;
use crate::domain::user::UserProfile;
use crate::error::Result;

/// Read access to subscribers, their plans, preferences and overrides.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Users that should receive digests this run, ordered by id.
    async fn active_users(&self) -> Result<Vec<UserProfile>>;

    async fn profile(&self, user_id: &UserId) -> Result<Option<UserProfile>>;

    /// Reverse lookup from a messenger chat id.
    async fn by_chat_id(&self, chat_id: i64) -> Result<Option<UserProfile>>;
}
