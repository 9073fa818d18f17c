use crate::config::{StorageConfig, StorageKind};
use crate::error::WorklogError;
use crate::repository::assignee_repository::AssigneeRepository;
use crate::repository::memory::memory_assignee_repo::MemoryAssigneeRepository;
use crate::repository::memory::memory_worklog_entry_repo::MemoryWorklogEntryRepository;
use crate::repository::sqlite;
use crate::repository::sqlite::sqlite_assignee_repo::SqliteAssigneeRepository;
use crate::repository::sqlite::sqlite_worklog_entry_repo::SqliteWorklogEntryRepository;
use crate::repository::worklog_entry_repository::WorklogEntryRepository;
use crate::repository::SharedSqliteConnection;
use log::info;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Represents parameters for initializing the stores
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseConfig {
    /// Plain process memory, nothing is persisted
    Memory,

    /// SQLite database that runs entirely in memory
    SqliteInMemory,

    /// SQLite database with a specific file path
    SqliteOnDisk { path: PathBuf },
}

impl DatabaseConfig {
    /// Selects the store from the `[storage]` section of the configuration
    ///
    /// # Errors
    /// If no location for the Sqlite database can be determined
    pub fn from_storage_config(cfg: &StorageConfig) -> Result<Self, WorklogError> {
        Ok(match cfg.kind {
            StorageKind::Memory => DatabaseConfig::Memory,
            StorageKind::Sqlite => DatabaseConfig::SqliteOnDisk {
                path: cfg.sqlite_path()?,
            },
        })
    }
}

enum Backend {
    Memory {
        assignees: Arc<MemoryAssigneeRepository>,
        worklog_entries: Arc<MemoryWorklogEntryRepository>,
    },
    Sqlite(SharedSqliteConnection),
}

pub struct DatabaseManager {
    backend: Backend,
}

impl DatabaseManager {
    /// Creates a new `DatabaseManager` based on the provided configuration.
    ///
    /// # Errors
    /// If the Sqlite database can not be opened or the schema can not be created
    pub fn new(config: &DatabaseConfig) -> Result<Self, WorklogError> {
        let backend = match config {
            DatabaseConfig::Memory => Backend::Memory {
                assignees: Arc::new(MemoryAssigneeRepository::new()),
                worklog_entries: Arc::new(MemoryWorklogEntryRepository::new()),
            },
            DatabaseConfig::SqliteInMemory => {
                Backend::Sqlite(Self::initialize_schema(Connection::open_in_memory()?)?)
            }
            DatabaseConfig::SqliteOnDisk { path } => {
                info!("Using Sqlite database {}", path.display());
                Backend::Sqlite(Self::initialize_schema(sqlite::create_connection(path)?)?)
            }
        };
        Ok(Self { backend })
    }

    fn initialize_schema(connection: Connection) -> Result<SharedSqliteConnection, WorklogError> {
        let connection = Arc::new(Mutex::new(connection));
        sqlite::create_schema(&connection)?;
        Ok(connection)
    }

    /// Provide access to the shared database connection, if any.
    pub(crate) fn sqlite_connection(&self) -> Option<SharedSqliteConnection> {
        match &self.backend {
            Backend::Sqlite(connection) => Some(connection.clone()),
            Backend::Memory { .. } => None,
        }
    }

    #[must_use]
    pub fn create_assignee_repository(&self) -> Arc<dyn AssigneeRepository> {
        match &self.backend {
            Backend::Memory { assignees, .. } => assignees.clone(),
            Backend::Sqlite(connection) => {
                Arc::new(SqliteAssigneeRepository::new(connection.clone()))
            }
        }
    }

    #[must_use]
    pub fn create_worklog_entry_repository(&self) -> Arc<dyn WorklogEntryRepository> {
        match &self.backend {
            Backend::Memory {
                worklog_entries, ..
            } => worklog_entries.clone(),
            Backend::Sqlite(connection) => {
                Arc::new(SqliteWorklogEntryRepository::new(connection.clone()))
            }
        }
    }
}
