//! Interval loop driving [`ScheduledPass`].

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::pass::ScheduledPass;
use super::report::PassReport;
use crate::application::cancel::CancelToken;

/// Handle for stopping a running scheduler.
pub struct SchedulerHandle {
    shutdown_tx: mpsc::Sender<()>,
    reports: watch::Receiver<Option<PassReport>>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Latest finished pass, if any.
    #[must_use]
    pub fn reports(&self) -> watch::Receiver<Option<PassReport>> {
        self.reports.clone()
    }

    /// Cancel any running pass, wait for it to wind down and stop the loop.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Err(err) = self.task.await {
            debug!(error = %err, "scheduler task ended abnormally");
        }
    }
}

pub struct Scheduler {
    pass: Arc<ScheduledPass>,
}

impl Scheduler {
    pub fn new(pass: Arc<ScheduledPass>) -> Self {
        Self { pass }
    }

    /// Spawn the loop. The first pass runs immediately; overdue ticks are
    /// skipped rather than bunched up.
    pub fn start(self) -> SchedulerHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let (report_tx, reports) = watch::channel(None);
        let pass = self.pass;
        let period = pass.config().interval();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("scheduler shutting down");
                        break;
                    }
                    _ = ticker.tick() => {
                        let cancel = CancelToken::new();
                        let run = pass.run_once(Utc::now(), &cancel);
                        tokio::pin!(run);
                        let (report, stop) = tokio::select! {
                            report = &mut run => (report, false),
                            _ = shutdown_rx.recv() => {
                                info!("shutdown requested mid-pass, cancelling");
                                cancel.cancel();
                                (run.await, true)
                            }
                        };
                        report_tx.send_replace(Some(report));
                        if stop {
                            break;
                        }
                    }
                }
            }
        });

        SchedulerHandle {
            shutdown_tx,
            reports,
            task,
        }
    }
}
