//! Fixed user directory, loaded from configuration or built in tests.

use async_trait::async_trait;

use crate::domain::id::UserId;
use crate::domain::user::UserProfile;
use crate::error::Result;
use crate::port::outbound::directory::UserDirectory;

#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    users: Vec<UserProfile>,
}

impl StaticDirectory {
    /// Build a directory; users are kept sorted by id.
    #[must_use]
    pub fn new(mut users: Vec<UserProfile>) -> Self {
        users.sort_by(|a, b| a.id.cmp(&b.id));
        Self { users }
    }
}

#[async_trait]
impl UserDirectory for StaticDirectory {
    async fn active_users(&self) -> Result<Vec<UserProfile>> {
        Ok(self.users.clone())
    }

    async fn profile(&self, user_id: &UserId) -> Result<Option<UserProfile>> {
        Ok(self.users.iter().find(|u| &u.id == user_id).cloned())
    }

    async fn by_chat_id(&self, chat_id: i64) -> Result<Option<UserProfile>> {
        Ok(self.users.iter().find(|u| u.chat_id == chat_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, chat_id: i64) -> UserProfile {
        UserProfile {
            id: UserId::new(id),
            chat_id,
            plan: "pro".into(),
            preference: None,
            overrides: None,
        }
    }

    #[tokio::test]
    async fn users_are_listed_in_id_order() {
        let dir = StaticDirectory::new(vec![user("b", 2), user("a", 1)]);
        let ids: Vec<String> = dir
            .active_users()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.id.to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn chat_id_lookup_finds_owner() {
        let dir = StaticDirectory::new(vec![user("a", 10)]);
        assert_eq!(dir.by_chat_id(10).await.unwrap().unwrap().id, UserId::new("a"));
        assert!(dir.by_chat_id(11).await.unwrap().is_none());
    }
}
