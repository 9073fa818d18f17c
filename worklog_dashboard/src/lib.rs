//! Collects the work logged in Jira by a roster of assignees once a day, and
//! aggregates it into a per day dashboard.
use crate::config::AppConfiguration;
use crate::error::WorklogError;
use crate::operation::fetch::{Fetch, FetchReport};
use crate::repository::database_manager::{DatabaseConfig, DatabaseManager};
use crate::scheduler::Scheduler;
use crate::service::assignee_service::AssigneeService;
use crate::service::dashboard_service::{DashboardService, DashboardView};
use crate::service::worklog_service::WorklogService;
use crate::source::TaskSource;
use chrono::NaiveDate;
use chrono_tz::Tz;
use jira::models::user::User;
use log::info;
use std::sync::Arc;
use tokio::sync::watch;

pub mod config;
pub mod date;
pub mod error;
pub mod operation;
pub mod repository;
pub mod scheduler;
pub mod service;
pub mod source;
pub mod types;

/// Everything the application needs, created once at start up and shared
pub struct ApplicationRuntime {
    config: AppConfiguration,
    time_zone: Tz,
    assignee_service: AssigneeService,
    worklog_service: WorklogService,
    dashboard_service: DashboardService,
    task_source: Option<Arc<dyn TaskSource>>,
    scheduler: Scheduler,
}

impl ApplicationRuntime {
    #[must_use]
    pub fn config(&self) -> &AppConfiguration {
        &self.config
    }

    /// Time zone in which worklog dates and the schedule are evaluated
    #[must_use]
    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }

    #[must_use]
    pub fn assignee_service(&self) -> &AssigneeService {
        &self.assignee_service
    }

    #[must_use]
    pub fn worklog_service(&self) -> &WorklogService {
        &self.worklog_service
    }

    #[must_use]
    pub fn dashboard_service(&self) -> &DashboardService {
        &self.dashboard_service
    }

    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    #[must_use]
    pub fn is_jira_configured(&self) -> bool {
        self.task_source.is_some()
    }

    fn fetch(&self) -> Fetch<'_> {
        Fetch {
            source: self.task_source.as_deref(),
            assignees: &self.assignee_service,
            worklogs: &self.worklog_service,
            time_zone: self.time_zone,
        }
    }

    /// Fetches the worklogs for `date`, or the previous working day. Waits for a
    /// run in progress to complete first.
    ///
    /// # Errors
    /// * `WorklogError::JiraNotConfigured` if the Jira environment variables are missing
    /// * Errors from the stores
    pub async fn refresh(&self, date: Option<NaiveDate>) -> Result<FetchReport, WorklogError> {
        self.scheduler
            .run_manual(move || async move { self.fetch().execute(date).await })
            .await
    }

    /// Runs the daily schedule until `shutdown` is signalled
    pub async fn run_schedule(&self, shutdown: watch::Receiver<bool>) {
        if !self.config.schedule.enabled {
            info!("Daily worklog fetch is disabled");
            return;
        }
        self.scheduler
            .run(move || async move { self.fetch().execute(None).await }, shutdown)
            .await;
    }

    /// Dashboard for `date`, the previous working day if not given.
    ///
    /// # Errors
    /// * `WorklogError::BadInput` if the date is not `YYYY-MM-DD`
    /// * Errors from the stores
    pub fn dashboard(
        &self,
        date: Option<&str>,
        group: Option<&str>,
    ) -> Result<DashboardView, WorklogError> {
        let date = date::worklog_date_or_default(date, self.time_zone)?;
        self.dashboard_service.dashboard(date, group)
    }

    /// Verifies the Jira credentials, returning the user they belong to
    ///
    /// # Errors
    /// * `WorklogError::JiraNotConfigured` if the Jira environment variables are missing
    /// * `WorklogError::JiraError` if Jira rejects the credentials or can not be reached
    pub async fn test_connection(&self) -> Result<User, WorklogError> {
        let source = self
            .task_source
            .as_ref()
            .ok_or(WorklogError::JiraNotConfigured)?;
        Ok(source.test_connection().await?)
    }
}

/// Builds the `ApplicationRuntime`. Anything not supplied is taken from the
/// configuration file and the environment.
#[derive(Default)]
pub struct ApplicationRuntimeBuilder {
    config: Option<AppConfiguration>,
    database: Option<DatabaseConfig>,
    task_source: Option<Option<Arc<dyn TaskSource>>>,
}

impl ApplicationRuntimeBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(mut self, config: AppConfiguration) -> Self {
        self.config = Some(config);
        self
    }

    /// Keeps everything in plain memory, regardless of the configuration
    #[must_use]
    pub fn use_in_memory_db(mut self) -> Self {
        self.database = Some(DatabaseConfig::Memory);
        self
    }

    #[must_use]
    pub fn with_database(mut self, database: DatabaseConfig) -> Self {
        self.database = Some(database);
        self
    }

    /// Uses the supplied source instead of a Jira client created from the environment
    #[must_use]
    pub fn with_task_source(mut self, source: Arc<dyn TaskSource>) -> Self {
        self.task_source = Some(Some(source));
        self
    }

    /// Runs without any Jira client, as if the environment variables were missing
    #[must_use]
    pub fn without_task_source(mut self) -> Self {
        self.task_source = Some(None);
        self
    }

    /// Creates the runtime and seeds the pre-configured assignees
    ///
    /// # Errors
    /// If the configuration is invalid, the store can not be opened or the Jira
    /// client can not be created
    pub fn build(self) -> Result<ApplicationRuntime, WorklogError> {
        let config = match self.config {
            Some(config) => {
                config.validate()?;
                config
            }
            None => config::load(None)?,
        };
        let time_zone = config.schedule.time_zone()?;

        let database = match self.database {
            Some(database) => database,
            None => DatabaseConfig::from_storage_config(&config.storage)?,
        };
        let manager = DatabaseManager::new(&database)?;
        let assignee_repo = manager.create_assignee_repository();
        let worklog_repo = manager.create_worklog_entry_repository();

        let assignee_service = AssigneeService::new(assignee_repo.clone(), &config.assignees);
        assignee_service.seed(&config.assignees.preconfigured)?;

        let task_source = match self.task_source {
            Some(source) => source,
            None => source::jira_from_env(&config.jira)?,
        };

        Ok(ApplicationRuntime {
            time_zone,
            worklog_service: WorklogService::new(worklog_repo.clone()),
            dashboard_service: DashboardService::new(assignee_repo, worklog_repo),
            assignee_service,
            task_source,
            scheduler: Scheduler::new(config.schedule.time_of_day()?, time_zone),
            config,
        })
    }
}
