//! The remote source of tasks and worklogs, i.e. Jira.
//!
//! Everything which reads from Jira goes through [`TaskSource`], which allows the
//! fetch operation to be tested without a Jira instance.
use crate::config::JiraConfig;
use crate::error::WorklogError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use jira::builder::JiraBuilder;
use jira::config::JiraClientConfiguration;
use jira::models::issue::Issue;
use jira::models::user::User;
use jira::models::worklog::Worklog;
use jira::{Jira, JiraError};
use log::{info, warn};
use std::sync::Arc;

#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Tasks assigned to `assignee_id` having work logged on `date`
    async fn tasks_with_worklogs_on(
        &self,
        assignee_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Issue>, JiraError>;

    /// Every worklog of the task, optionally only those started after the supplied instant
    async fn worklogs_for(
        &self,
        task_key: &str,
        started_after: Option<DateTime<Utc>>,
    ) -> Result<Vec<Worklog>, JiraError>;

    async fn user_info(&self, assignee_id: &str) -> Result<User, JiraError>;

    /// Verifies the credentials by retrieving the current user
    async fn test_connection(&self) -> Result<User, JiraError>;
}

#[async_trait]
impl TaskSource for Jira {
    async fn tasks_with_worklogs_on(
        &self,
        assignee_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Issue>, JiraError> {
        self.search_issues_with_worklogs_on(assignee_id, date).await
    }

    async fn worklogs_for(
        &self,
        task_key: &str,
        started_after: Option<DateTime<Utc>>,
    ) -> Result<Vec<Worklog>, JiraError> {
        self.get_worklogs_for(task_key, started_after).await
    }

    async fn user_info(&self, assignee_id: &str) -> Result<User, JiraError> {
        self.get_user(assignee_id).await
    }

    async fn test_connection(&self) -> Result<User, JiraError> {
        self.get_current_user().await
    }
}

/// Creates the Jira client from the `JIRA_URL`, `JIRA_USER_EMAIL` and `JIRA_API_TOKEN`
/// environment variables. Returns `None` if any of them is missing.
///
/// # Errors
/// If the variables are present but the client can not be created, i.e. an invalid url
pub fn jira_from_env(cfg: &JiraConfig) -> Result<Option<Arc<dyn TaskSource>>, WorklogError> {
    match JiraClientConfiguration::from_env() {
        Some(client_cfg) => jira_from(&client_cfg, cfg).map(Some),
        None => {
            warn!("JIRA environment variables not configured, worklogs can not be fetched");
            Ok(None)
        }
    }
}

/// Creates the Jira client from the supplied connection parameters
///
/// # Errors
/// If the client can not be created
pub fn jira_from(
    client_cfg: &JiraClientConfiguration,
    cfg: &JiraConfig,
) -> Result<Arc<dyn TaskSource>, WorklogError> {
    let jira = JiraBuilder::new()
        .from_config(client_cfg)
        .api_version(cfg.api_version.clone())
        .timeout(cfg.timeout_secs)
        .build()?;
    info!("Using Jira at {}", client_cfg.jira_url);
    Ok(Arc::new(jira))
}
