use super::{read, write};
use crate::error::WorklogError;
use crate::repository::worklog_entry_repository::{check_same_date, WorklogEntryRepository};
use crate::types::{NewWorklogEntry, WorklogEntry};
use chrono::NaiveDate;
use std::sync::RwLock;

#[derive(Default)]
pub struct MemoryWorklogEntryRepository {
    entries: RwLock<Vec<WorklogEntry>>,
}

impl MemoryWorklogEntryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WorklogEntryRepository for MemoryWorklogEntryRepository {
    fn find_by_date(&self, date: Option<NaiveDate>) -> Result<Vec<WorklogEntry>, WorklogError> {
        Ok(read(&self.entries)?
            .iter()
            .filter(|e| date.map_or(true, |d| e.worklog_date == d))
            .cloned()
            .collect())
    }

    fn add_entries(&self, entries: Vec<NewWorklogEntry>) -> Result<Vec<WorklogEntry>, WorklogError> {
        let saved: Vec<WorklogEntry> = entries.into_iter().map(NewWorklogEntry::into_entry).collect();
        write(&self.entries)?.extend(saved.iter().cloned());
        Ok(saved)
    }

    fn remove_entries_for_date(&self, date: NaiveDate) -> Result<usize, WorklogError> {
        let mut entries = write(&self.entries)?;
        let before = entries.len();
        entries.retain(|e| e.worklog_date != date);
        Ok(before - entries.len())
    }

    fn replace_entries_for_date(
        &self,
        date: NaiveDate,
        entries: Vec<NewWorklogEntry>,
    ) -> Result<Vec<WorklogEntry>, WorklogError> {
        check_same_date(date, &entries)?;
        let saved: Vec<WorklogEntry> = entries.into_iter().map(NewWorklogEntry::into_entry).collect();

        // Both steps happen under the same write lock
        let mut stored = write(&self.entries)?;
        stored.retain(|e| e.worklog_date != date);
        stored.extend(saved.iter().cloned());
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Hours;

    fn entry(task: &str, date: NaiveDate) -> NewWorklogEntry {
        NewWorklogEntry {
            assignee_id: "a".to_string(),
            assignee_name: Some("Ada".to_string()),
            task_key: task.to_string(),
            task_summary: None,
            task_status: None,
            hours_logged: Hours::new(1.0),
            worklog_date: date,
        }
    }

    #[test]
    fn replace_only_touches_the_date() -> Result<(), WorklogError> {
        let d1 = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 1, 11).unwrap();
        let repo = MemoryWorklogEntryRepository::new();
        repo.add_entries(vec![entry("A-1", d1), entry("A-2", d1), entry("A-3", d2)])?;

        repo.replace_entries_for_date(d1, vec![entry("A-4", d1)])?;

        let keys: Vec<String> = repo.find_by_date(Some(d1))?.into_iter().map(|e| e.task_key).collect();
        assert_eq!(keys, vec!["A-4"]);
        assert_eq!(repo.find_by_date(Some(d2))?.len(), 1);
        assert_eq!(repo.find_by_date(None)?.len(), 2);
        Ok(())
    }

    #[test]
    fn replace_rejects_foreign_dates() {
        let d1 = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 1, 11).unwrap();
        let repo = MemoryWorklogEntryRepository::new();
        assert!(matches!(
            repo.replace_entries_for_date(d1, vec![entry("A-1", d2)]),
            Err(WorklogError::BadInput(_))
        ));
    }

    #[test]
    fn remove_reports_count() -> Result<(), WorklogError> {
        let d1 = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let repo = MemoryWorklogEntryRepository::new();
        repo.add_entries(vec![entry("A-1", d1), entry("A-2", d1)])?;
        assert_eq!(repo.remove_entries_for_date(d1)?, 2);
        assert!(repo.find_by_date(Some(d1))?.is_empty());
        Ok(())
    }
}
