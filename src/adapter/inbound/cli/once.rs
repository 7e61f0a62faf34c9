//! Handler for the `once` command.

use chrono::Utc;

use super::output;
use crate::application::cancel::CancelToken;
use crate::application::pipeline::report::{PassReport, PassStatus};
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;

/// Run one pass and print the report.
pub async fn execute(config: Config) -> Result<PassReport> {
    let app = bootstrap::build(config)?;
    let report = app.pass.run_once(Utc::now(), &CancelToken::new()).await;
    print_report(&report)?;
    Ok(report)
}

fn print_report(report: &PassReport) -> Result<()> {
    let payload = serde_json::to_value(report)?;
    if output::is_json() {
        output::table::<output::KeyValueRow>("report", Vec::new(), payload);
        return Ok(());
    }
    output::section("Pass");
    output::field("Run", &report.run_id);
    output::field("Status", report.status.as_str());
    output::field(
        "Snapshots",
        format!("{} fetched, {} new", report.snapshots_fetched, report.snapshots_inserted),
    );
    output::field(
        "Alerts",
        format!(
            "{} detected, {} standard, {} fast",
            report.alerts_detected, report.alerts_inserted, report.fast_alerts_inserted
        ),
    );
    output::field("Expired", report.recommendations_expired);
    output::field(
        "Users",
        format!(
            "{}/{} succeeded",
            report.users_succeeded, report.users_expected
        ),
    );
    output::field("Digests", report.digests_sent);
    output::field("Copilot", report.recommendations_sent);
    match report.status {
        PassStatus::Completed => output::success("pass completed"),
        PassStatus::IngestLocked => output::warning("another pass holds the ingest lock"),
        PassStatus::Cancelled => output::warning("pass cancelled"),
        PassStatus::Failed => {
            output::error(report.error.as_deref().unwrap_or("pass failed"));
        }
    }
    Ok(())
}
