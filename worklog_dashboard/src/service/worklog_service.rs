use crate::error::WorklogError;
use crate::repository::worklog_entry_repository::WorklogEntryRepository;
use crate::types::{NewWorklogEntry, WorklogEntry};
use chrono::NaiveDate;
use log::info;
use std::sync::Arc;

pub struct WorklogService {
    repo: Arc<dyn WorklogEntryRepository>,
}

impl WorklogService {
    pub fn new(repo: Arc<dyn WorklogEntryRepository>) -> Self {
        Self { repo }
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn entries_for(&self, date: NaiveDate) -> Result<Vec<WorklogEntry>, WorklogError> {
        self.repo.find_by_date(Some(date))
    }

    /// Replaces everything stored for `date` with the supplied entries
    ///
    /// # Errors
    /// If an entry belongs to another date or the repository fails
    pub fn replace_for_date(
        &self,
        date: NaiveDate,
        entries: Vec<NewWorklogEntry>,
    ) -> Result<Vec<WorklogEntry>, WorklogError> {
        let saved = self.repo.replace_entries_for_date(date, entries)?;
        info!("Stored {} worklog entries for {date}", saved.len());
        Ok(saved)
    }
}
