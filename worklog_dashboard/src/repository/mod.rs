use rusqlite::Connection;
use std::sync::{Arc, Mutex};

// Repository traits, one per stored entity
pub mod assignee_repository;
pub mod worklog_entry_repository;

// Implementations and the manager selecting between them
pub mod database_manager;
pub(crate) mod memory;
pub(crate) mod sqlite;

/// A thread-safe, shared connection to an ``SQLite`` database,
/// used across multiple repository layers.
pub(crate) type SharedSqliteConnection = Arc<Mutex<Connection>>;
