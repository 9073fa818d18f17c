use crate::error::WorklogError;
use crate::repository::SharedSqliteConnection;
use rusqlite::Connection;
use std::fs;
use std::path::Path;

pub(crate) mod sqlite_assignee_repo;
pub(crate) mod sqlite_worklog_entry_repo;

/// Creates the entire database schema by running schema creation functions for all entities.
#[allow(clippy::module_name_repetitions)]
pub(crate) fn create_schema(connection: &SharedSqliteConnection) -> Result<(), WorklogError> {
    sqlite_assignee_repo::create_assignee_table(connection)?;
    sqlite_worklog_entry_repo::create_worklog_entry_table(connection)?;
    Ok(())
}

pub(crate) fn create_connection(dbms_path: &Path) -> Result<Connection, WorklogError> {
    if let Some(parent) = dbms_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Connection::open(dbms_path).map_err(|e| WorklogError::OpenDbms {
        path: dbms_path.display().to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
pub(crate) mod tests;
