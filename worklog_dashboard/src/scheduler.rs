//! Runs the worklog fetch once a day, and serializes it with runs requested by hand.
//!
//! The scheduler is either `Idle` or `Running`. A scheduled run which finds the
//! scheduler running is skipped, a manual run waits for the current run to finish.
use crate::date;
use crate::error::WorklogError;
use crate::operation::fetch::FetchReport;
use chrono::{DateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use log::{error, info, warn};
use serde::Serialize;
use std::future::Future;
use std::sync::RwLock;
use tokio::sync::{watch, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SchedulerState {
    Idle,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Trigger {
    Scheduled,
    Manual,
}

/// Snapshot of what the scheduler is doing and has done
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStatus {
    pub state: SchedulerState,
    pub trigger: Option<Trigger>,
    pub running_since: Option<DateTime<Utc>>,
    pub last_run_at: Option<DateTime<Utc>>,
    pub last_report: Option<FetchReport>,
    pub last_error: Option<String>,
    pub next_run: Option<DateTime<Utc>>,
}

impl Default for SchedulerStatus {
    fn default() -> Self {
        SchedulerStatus {
            state: SchedulerState::Idle,
            trigger: None,
            running_since: None,
            last_run_at: None,
            last_report: None,
            last_error: None,
            next_run: None,
        }
    }
}

pub struct Scheduler {
    /// Held for the duration of a run
    gate: Mutex<()>,
    status: RwLock<SchedulerStatus>,
    at: NaiveTime,
    time_zone: Tz,
}

impl Scheduler {
    #[must_use]
    pub fn new(at: NaiveTime, time_zone: Tz) -> Self {
        Scheduler {
            gate: Mutex::new(()),
            status: RwLock::new(SchedulerStatus::default()),
            at,
            time_zone,
        }
    }

    /// # Errors
    /// If the status lock has been poisoned
    pub fn status(&self) -> Result<SchedulerStatus, WorklogError> {
        self.status
            .read()
            .map(|s| s.clone())
            .map_err(|_| WorklogError::LockPoisoned)
    }

    /// The next point in time the daily run is due, strictly after `from`
    #[must_use]
    pub fn next_run_after(&self, from: DateTime<Utc>) -> DateTime<Utc> {
        date::next_daily_run(self.at, self.time_zone, from)
    }

    /// Runs `job` as soon as no other run is in progress
    ///
    /// # Errors
    /// Whatever the job fails with
    pub async fn run_manual<F, Fut>(&self, job: F) -> Result<FetchReport, WorklogError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<FetchReport, WorklogError>>,
    {
        let _guard = self.gate.lock().await;
        self.execute(Trigger::Manual, job).await
    }

    /// Runs `job` unless a run is already in progress, in which case `None` is returned
    pub async fn run_scheduled<F, Fut>(&self, job: F) -> Option<Result<FetchReport, WorklogError>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<FetchReport, WorklogError>>,
    {
        if let Ok(_guard) = self.gate.try_lock() {
            Some(self.execute(Trigger::Scheduled, job).await)
        } else {
            info!("Worklog fetch already running, skipping the scheduled run");
            None
        }
    }

    /// The daily run which was due at `due`. The next run is moved on before the
    /// job starts, so the status never shows an instant that has already fired.
    async fn run_due<F, Fut>(
        &self,
        due: DateTime<Utc>,
        job: F,
    ) -> Option<Result<FetchReport, WorklogError>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<FetchReport, WorklogError>>,
    {
        let next = self.next_run_after(due);
        self.update(|s| s.next_run = Some(next));
        self.run_scheduled(job).await
    }

    async fn execute<F, Fut>(&self, trigger: Trigger, job: F) -> Result<FetchReport, WorklogError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<FetchReport, WorklogError>>,
    {
        self.update(|s| {
            s.state = SchedulerState::Running;
            s.trigger = Some(trigger);
            s.running_since = Some(Utc::now());
        });

        let result = job().await;

        self.update(|s| {
            s.state = SchedulerState::Idle;
            s.trigger = None;
            s.running_since = None;
            s.last_run_at = Some(Utc::now());
            match &result {
                Ok(report) => {
                    s.last_report = Some(report.clone());
                    s.last_error = None;
                }
                Err(e) => s.last_error = Some(e.to_string()),
            }
        });
        result
    }

    fn update<F: FnOnce(&mut SchedulerStatus)>(&self, f: F) {
        match self.status.write() {
            Ok(mut status) => f(&mut status),
            Err(_) => warn!("Scheduler status lock poisoned, status not updated"),
        }
    }

    /// Runs `job` every day at the configured time until `shutdown` becomes `true`
    /// or its sender is dropped. A failing run is logged and the loop carries on.
    pub async fn run<F, Fut>(&self, job: F, mut shutdown: watch::Receiver<bool>)
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<FetchReport, WorklogError>>,
    {
        info!(
            "Worklog fetch scheduled daily at {} {}",
            self.at.format("%H:%M"),
            self.time_zone
        );
        loop {
            let now = Utc::now();
            let next = self.next_run_after(now);
            self.update(|s| s.next_run = Some(next));
            let wait = (next - now).to_std().unwrap_or_default();
            info!("Next worklog fetch at {next}");

            tokio::select! {
                () = tokio::time::sleep(wait) => {
                    match self.run_due(next, &job).await {
                        Some(Ok(report)) => info!("Scheduled worklog fetch completed: {report:?}"),
                        Some(Err(e)) => error!("Scheduled worklog fetch failed: {e}"),
                        None => {}
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Scheduler shutting down");
                        break;
                    }
                }
            }
        }
        self.update(|s| s.next_run = None);
    }
}
