//! Handler for the `check` command.

use std::path::Path;

use super::output;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Validate the configuration file and report missing secrets.
pub fn execute(path: &Path) -> Result<Config> {
    let config = match Config::load(path) {
        Ok(config) => config,
        Err(err) => {
            output::error(&format!("{}: {err}", path.display()));
            return Err(err);
        }
    };
    output::success(&format!("{} is valid", path.display()));
    output::field("Users", config.users.len());
    output::field("Database", &config.database);
    output::field("Feed", config.feed.path.display());

    let key_var = config.llm.provider.key_var();
    if std::env::var(key_var).is_ok() {
        output::success(&format!("{key_var} is set"));
    } else {
        output::warning(&format!("{key_var} is not set; copilot will fall back to WAIT"));
    }
    if config.telegram.enabled && std::env::var("TELEGRAM_BOT_TOKEN").is_err() {
        output::warning("telegram is enabled but TELEGRAM_BOT_TOKEN is not set");
    }
    if !config.feed.path.exists() {
        output::warning(&format!("feed file {} does not exist yet", config.feed.path.display()));
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_invalid_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[fast]\np_min = 0.9\np_max = 0.2\n").unwrap();
        assert!(execute(&path).is_err());
    }

    #[test]
    fn accepts_valid_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "database = \"x.db\"\n").unwrap();
        assert_eq!(execute(&path).unwrap().database, "x.db");
    }
}
