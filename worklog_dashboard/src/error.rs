use std::{io, path::PathBuf};

use crate::date;
use jira::builder::JiraBuilderError;
use jira::JiraError;
use thiserror::Error;

#[allow(clippy::module_name_repetitions)]
#[derive(Error, Debug)]
pub enum WorklogError {
    #[error("Unable to load the application configuration file {path:?}")]
    ApplicationConfig { path: PathBuf, source: io::Error },
    #[error("Unable to parse contents of {path:?}")]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Unable to find configuration file {path:?}")]
    ConfigFileNotFound { path: PathBuf },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("JIRA environment variables not configured")]
    JiraNotConfigured,
    #[error("Jira error {0}")]
    JiraError(String),
    #[error("Unable to create the Jira client: {0}")]
    JiraClient(String),
    #[error("Could not make sense of input: {0}")]
    BadInput(String),
    #[error("Assignee already exists")]
    DuplicateAssignee(String),
    #[error("{message}")]
    AssigneeDenied { assignee_id: String, message: String },
    #[error("Assignee not found: {0}")]
    AssigneeNotFound(String),
    #[error("Unable to open DBMS in file {path}: {reason}")]
    OpenDbms { path: String, reason: String },
    #[error("SQL dbms error: {0}")]
    Sql(String),
    #[error("Directory creation failed")]
    CreateDir(#[from] io::Error),
    #[error("Mutex locking error")]
    LockPoisoned,
}

impl WorklogError {
    /// Errors caused by the caller supplying something we can not accept
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            WorklogError::BadInput(_)
                | WorklogError::DuplicateAssignee(_)
                | WorklogError::AssigneeDenied { .. }
                | WorklogError::JiraNotConfigured
        )
    }
}

impl From<rusqlite::Error> for WorklogError {
    fn from(err: rusqlite::Error) -> Self {
        WorklogError::Sql(format!("Sqlite error {err}"))
    }
}

impl From<JiraError> for WorklogError {
    fn from(err: JiraError) -> Self {
        WorklogError::JiraError(format!("{err}"))
    }
}

impl From<JiraBuilderError> for WorklogError {
    fn from(err: JiraBuilderError) -> Self {
        WorklogError::JiraClient(format!("{err}"))
    }
}

impl From<date::Error> for WorklogError {
    fn from(err: date::Error) -> Self {
        WorklogError::BadInput(format!("{err}"))
    }
}
