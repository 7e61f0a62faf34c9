//! Handler for the `settings` command.

use super::command::SettingsArgs;
use super::output;
use crate::application::settings::resolve::resolve_for_user;
use crate::domain::id::UserId;
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::settings::Config;

/// Print the effective settings of one configured user.
///
/// Resolution is done directly from configuration, so the printed values
/// are what the next pass will cache.
pub fn execute(config: &Config, args: &SettingsArgs) -> Result<()> {
    let id = UserId::new(args.user.clone());
    let user = config
        .users
        .iter()
        .find(|u| u.id == id)
        .ok_or_else(|| ConfigError::Other(format!("unknown user: {id}")))?;
    let settings = resolve_for_user(&config.settings.defaults, user);
    let payload = serde_json::to_value(&settings)?;
    output::section(&format!("Effective settings for {id}"));
    output::table("settings", output::key_value_rows(&payload), payload);
    Ok(())
}
