//! Routes Telegram callback queries to the callback handler.
//!
//! The sender is resolved to a subscriber through the user directory by
//! chat id; presses from unknown chats are answered but never acted on.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use tracing::{debug, info, warn};

use crate::application::copilot::callback::{CallbackHandler, CallbackStatus};
use crate::error::{ConfigError, Result};
use crate::port::outbound::directory::UserDirectory;

const UNKNOWN_USER: &str = "Unknown user.";
const TRY_AGAIN: &str = "Something went wrong. Please try again.";

#[derive(Clone)]
struct Routes {
    handler: Arc<CallbackHandler>,
    directory: Arc<dyn UserDirectory>,
}

/// Resolve the chat and run one callback. Returns the toast text.
pub async fn reply_for_callback(
    handler: &CallbackHandler,
    directory: &dyn UserDirectory,
    chat_id: i64,
    callback_id: &str,
    data: &str,
    now: DateTime<Utc>,
) -> String {
    let user = match directory.by_chat_id(chat_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!(chat_id, "callback from unknown chat");
            return UNKNOWN_USER.to_string();
        }
        Err(err) => {
            warn!(chat_id, error = %err, "user lookup failed");
            return TRY_AGAIN.to_string();
        }
    };
    match handler.handle_callback(&user.id, callback_id, data, now).await {
        Ok(reply) => {
            if reply.status == CallbackStatus::Rejected {
                debug!(user_id = %user.id, data, reason = %reply.text, "callback rejected");
            }
            reply.text
        }
        Err(err) => {
            warn!(user_id = %user.id, data, error = %err, "callback failed");
            TRY_AGAIN.to_string()
        }
    }
}

async fn on_callback(bot: Bot, q: CallbackQuery, routes: Routes) -> ResponseResult<()> {
    let chat_id = q
        .message
        .as_ref()
        .map(|m| m.chat().id.0)
        .or_else(|| i64::try_from(q.from.id.0).ok());
    let text = match (chat_id, q.data.as_deref()) {
        (Some(chat_id), Some(data)) => {
            reply_for_callback(
                &routes.handler,
                routes.directory.as_ref(),
                chat_id,
                &q.id.to_string(),
                data,
                Utc::now(),
            )
            .await
        }
        _ => UNKNOWN_USER.to_string(),
    };
    bot.answer_callback_query(q.id).text(text).await?;
    Ok(())
}

pub struct CallbackListener {
    bot: Bot,
    routes: Routes,
}

impl CallbackListener {
    pub fn new(bot: Bot, handler: Arc<CallbackHandler>, directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            bot,
            routes: Routes { handler, directory },
        }
    }

    /// Build from `TELEGRAM_BOT_TOKEN`.
    pub fn from_env(handler: Arc<CallbackHandler>, directory: Arc<dyn UserDirectory>) -> Result<Self> {
        let token = std::env::var("TELEGRAM_BOT_TOKEN").map_err(|_| ConfigError::MissingField {
            field: "TELEGRAM_BOT_TOKEN",
        })?;
        Ok(Self::new(Bot::new(token), handler, directory))
    }

    /// Poll for callback queries until the task is aborted.
    pub async fn run(self) {
        info!("telegram callback listener started");
        let schema = Update::filter_callback_query().endpoint(on_callback);
        Dispatcher::builder(self.bot, schema)
            .dependencies(dptree::deps![self.routes])
            .default_handler(|_| async {})
            .build()
            .dispatch()
            .await;
        warn!("telegram callback listener stopped");
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::adapter::outbound::memory::directory::StaticDirectory;
    use crate::adapter::outbound::memory::kv::MemoryKv;
    use crate::adapter::outbound::memory::store::MemoryStore;
    use crate::application::copilot::callback::CallbackPorts;
    use crate::application::copilot::config::CopilotConfig;
    use crate::application::copilot::ledger::Ledger;
    use crate::port::outbound::kv::KeyValueStore;
    use crate::port::outbound::store::{AlertStore, RecommendationStore};
    use crate::testkit::domain::{alert_at, recommendation_for, user};

    #[tokio::test]
    async fn unknown_chat_is_not_acted_on() {
        let store = Arc::new(MemoryStore::new());
        let handler = CallbackHandler::new(
            CallbackPorts {
                alerts: store.clone(),
                recommendations: store.clone(),
                mutes: store,
                kv: Arc::new(MemoryKv::new()),
            },
            CopilotConfig::default(),
        );
        let directory = StaticDirectory::new(vec![user("u1", 11, "elite")]);
        let text = reply_for_callback(&handler, &directory, 99, "cb", "skip:x", Utc::now()).await;
        assert_eq!(text, UNKNOWN_USER);
    }

    #[tokio::test]
    async fn known_chat_confirms_once() {
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap();
        let store = Arc::new(MemoryStore::new());
        let u1 = user("u1", 11, "elite");
        let alert = alert_at("c1", now, 0.40, 0.46);
        store.insert_alert(&alert).await.unwrap();
        let rec = recommendation_for(&u1.id, &alert);
        store.insert_recommendation(&rec).await.unwrap();
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKv::new());
        let handler = CallbackHandler::new(
            CallbackPorts {
                alerts: store.clone(),
                recommendations: store.clone(),
                mutes: store.clone(),
                kv: kv.clone(),
            },
            CopilotConfig::default(),
        );
        let user_id = u1.id.clone();
        let directory = StaticDirectory::new(vec![u1]);
        let data = format!("confirm:{}", rec.id);

        let first = reply_for_callback(&handler, &directory, 11, "cb1", &data, now).await;
        assert_eq!(first, "Confirmed.");
        let again = reply_for_callback(&handler, &directory, 11, "cb1", &data, now).await;
        assert_eq!(again, "Already processed.");
        let spent = Ledger::new(kv).spent_today(&user_id, now).await.unwrap();
        assert_eq!(spent, dec!(25));
    }
}
