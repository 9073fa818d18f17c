use crate::error::WorklogError;
use crate::types::{NewWorklogEntry, WorklogEntry};
use chrono::NaiveDate;

/// Storage of the aggregated worklog entries
pub trait WorklogEntryRepository: Send + Sync {
    /// Entries for the supplied date, or all entries if no date is given.
    /// Insertion order is retained.
    ///
    /// # Errors
    /// If the underlying store fails
    fn find_by_date(&self, date: Option<NaiveDate>) -> Result<Vec<WorklogEntry>, WorklogError>;

    /// Adds the entries, returns them with identifiers assigned
    ///
    /// # Errors
    /// If the underlying store fails
    fn add_entries(&self, entries: Vec<NewWorklogEntry>) -> Result<Vec<WorklogEntry>, WorklogError>;

    /// Removes every entry for the date, returns the number removed
    ///
    /// # Errors
    /// If the underlying store fails
    fn remove_entries_for_date(&self, date: NaiveDate) -> Result<usize, WorklogError>;

    /// Replaces every entry for `date` with `entries` as one atomic operation.
    /// A reader sees either the old or the new set, never an empty date in between.
    ///
    /// # Errors
    /// * `WorklogError::BadInput` if an entry belongs to another date
    fn replace_entries_for_date(
        &self,
        date: NaiveDate,
        entries: Vec<NewWorklogEntry>,
    ) -> Result<Vec<WorklogEntry>, WorklogError>;
}

/// Verifies that every entry belongs to `date`
pub(crate) fn check_same_date(
    date: NaiveDate,
    entries: &[NewWorklogEntry],
) -> Result<(), WorklogError> {
    match entries.iter().find(|e| e.worklog_date != date) {
        Some(e) => Err(WorklogError::BadInput(format!(
            "Entry for {} on {} does not belong to {date}",
            e.task_key, e.worklog_date
        ))),
        None => Ok(()),
    }
}
