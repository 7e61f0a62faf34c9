//! Handler for the `run` command.

use tokio::signal;
use tracing::{info, warn};

use super::command::RunArgs;
use super::output;
use crate::application::pipeline::scheduler::Scheduler;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;

/// Run scheduled passes until ctrl-c.
pub async fn execute(config: Config, args: &RunArgs) -> Result<()> {
    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Interval", format!("{}s", config.scheduler.interval_seconds));
    output::field("Users", config.users.len());
    output::field("Feed", config.feed.path.display());
    output::field("Database", &config.database);

    let listen = config.telegram.enabled && config.telegram.listen_callbacks && !args.no_callbacks;
    let app = bootstrap::build(config)?;
    let listener = if listen { spawn_listener(&app) } else { None };

    let handle = Scheduler::new(app.pass.clone()).start();
    output::success("scheduler started");

    if let Err(err) = signal::ctrl_c().await {
        warn!(error = %err, "ctrl-c handler failed, shutting down");
    }
    info!("shutdown signal received");
    handle.shutdown().await;
    if let Some(listener) = listener {
        listener.abort();
    }
    output::success("scheduler stopped");
    Ok(())
}

#[cfg(feature = "telegram")]
fn spawn_listener(app: &bootstrap::App) -> Option<tokio::task::JoinHandle<()>> {
    use crate::adapter::inbound::telegram::listener::CallbackListener;

    match CallbackListener::from_env(app.callbacks.clone(), app.directory.clone()) {
        Ok(listener) => Some(tokio::spawn(listener.run())),
        Err(err) => {
            output::warning(&format!("callback listener disabled: {err}"));
            None
        }
    }
}

#[cfg(not(feature = "telegram"))]
fn spawn_listener(_app: &bootstrap::App) -> Option<tokio::task::JoinHandle<()>> {
    output::warning("callback listener requires the telegram feature");
    None
}
