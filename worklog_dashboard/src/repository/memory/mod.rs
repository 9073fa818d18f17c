//! Process resident stores. Nothing survives a restart.
pub(crate) mod memory_assignee_repo;
pub(crate) mod memory_worklog_entry_repo;

use crate::error::WorklogError;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

pub(crate) fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, WorklogError> {
    lock.read().map_err(|_| WorklogError::LockPoisoned)
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, WorklogError> {
    lock.write().map_err(|_| WorklogError::LockPoisoned)
}
