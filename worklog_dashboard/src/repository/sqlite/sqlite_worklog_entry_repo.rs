use crate::error::WorklogError;
use crate::repository::worklog_entry_repository::{check_same_date, WorklogEntryRepository};
use crate::repository::SharedSqliteConnection;
use crate::types::{Hours, NewWorklogEntry, WorklogEntry};
use chrono::NaiveDate;
use log::debug;
use rusqlite::{named_params, params, Connection, Row};

pub struct SqliteWorklogEntryRepository {
    connection: SharedSqliteConnection,
}

impl SqliteWorklogEntryRepository {
    pub(crate) fn new(connection: SharedSqliteConnection) -> Self {
        Self { connection }
    }
}

/// SQL statement to create the `worklog_entry` table.
const CREATE_WORKLOG_ENTRY_TABLE_SQL: &str = r"
CREATE TABLE IF NOT EXISTS worklog_entry (
    seq integer primary key autoincrement,
    id varchar(64) NOT NULL unique,
    assignee_id varchar(128) NOT NULL,
    assignee_name varchar(512),
    task_key varchar(32) NOT NULL,
    task_summary varchar(1024),
    task_status varchar(128),
    hours_logged real NOT NULL,
    worklog_date date NOT NULL,
    created_at datetime NOT NULL
);
CREATE INDEX IF NOT EXISTS worklog_entry_date_idx ON worklog_entry(worklog_date);
";

const SELECT_COLUMNS: &str = "id, assignee_id, assignee_name, task_key, task_summary, task_status, hours_logged, worklog_date, created_at";

/// Creates the `worklog_entry` table in the database.
pub(crate) fn create_worklog_entry_table(
    connection: &SharedSqliteConnection,
) -> Result<(), WorklogError> {
    let conn = connection.lock().map_err(|_| WorklogError::LockPoisoned)?;
    conn.execute_batch(CREATE_WORKLOG_ENTRY_TABLE_SQL)?;
    Ok(())
}

fn map_row(row: &Row<'_>) -> Result<WorklogEntry, rusqlite::Error> {
    Ok(WorklogEntry {
        id: row.get(0)?,
        assignee_id: row.get(1)?,
        assignee_name: row.get(2)?,
        task_key: row.get(3)?,
        task_summary: row.get(4)?,
        task_status: row.get(5)?,
        hours_logged: Hours::new(row.get(6)?),
        worklog_date: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn insert(conn: &Connection, entry: &WorklogEntry) -> Result<(), WorklogError> {
    conn.execute(
        "INSERT INTO worklog_entry (id, assignee_id, assignee_name, task_key, task_summary, task_status, hours_logged, worklog_date, created_at)
         VALUES (:id, :assignee_id, :assignee_name, :task_key, :task_summary, :task_status, :hours_logged, :worklog_date, :created_at)",
        named_params! {
            ":id": entry.id,
            ":assignee_id": entry.assignee_id,
            ":assignee_name": entry.assignee_name,
            ":task_key": entry.task_key,
            ":task_summary": entry.task_summary,
            ":task_status": entry.task_status,
            ":hours_logged": entry.hours_logged.value(),
            ":worklog_date": entry.worklog_date,
            ":created_at": entry.created_at,
        },
    )
    .map_err(|e| WorklogError::Sql(format!("Unable to insert worklog entry {entry:?}: {e}")))?;
    Ok(())
}

impl WorklogEntryRepository for SqliteWorklogEntryRepository {
    fn find_by_date(&self, date: Option<NaiveDate>) -> Result<Vec<WorklogEntry>, WorklogError> {
        let conn = self
            .connection
            .lock()
            .map_err(|_| WorklogError::LockPoisoned)?;
        let entries = match date {
            Some(date) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {SELECT_COLUMNS} FROM worklog_entry WHERE worklog_date = ?1 ORDER BY seq"
                ))?;
                let entries = stmt
                    .query_map(params![date], map_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                entries
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {SELECT_COLUMNS} FROM worklog_entry ORDER BY seq"
                ))?;
                let entries = stmt
                    .query_map([], map_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                entries
            }
        };
        Ok(entries)
    }

    fn add_entries(&self, entries: Vec<NewWorklogEntry>) -> Result<Vec<WorklogEntry>, WorklogError> {
        let saved: Vec<WorklogEntry> = entries.into_iter().map(NewWorklogEntry::into_entry).collect();
        let mut conn = self
            .connection
            .lock()
            .map_err(|_| WorklogError::LockPoisoned)?;
        let tx = conn.transaction()?;
        for entry in &saved {
            insert(&tx, entry)?;
        }
        tx.commit()?;
        Ok(saved)
    }

    fn remove_entries_for_date(&self, date: NaiveDate) -> Result<usize, WorklogError> {
        let conn = self
            .connection
            .lock()
            .map_err(|_| WorklogError::LockPoisoned)?;
        Ok(conn.execute(
            "DELETE FROM worklog_entry WHERE worklog_date = ?1",
            params![date],
        )?)
    }

    fn replace_entries_for_date(
        &self,
        date: NaiveDate,
        entries: Vec<NewWorklogEntry>,
    ) -> Result<Vec<WorklogEntry>, WorklogError> {
        check_same_date(date, &entries)?;
        let saved: Vec<WorklogEntry> = entries.into_iter().map(NewWorklogEntry::into_entry).collect();

        let mut conn = self
            .connection
            .lock()
            .map_err(|_| WorklogError::LockPoisoned)?;
        let tx = conn.transaction()?;
        let removed = tx.execute(
            "DELETE FROM worklog_entry WHERE worklog_date = ?1",
            params![date],
        )?;
        for entry in &saved {
            insert(&tx, entry)?;
        }
        tx.commit()?;
        debug!("Replaced {removed} entries for {date} with {}", saved.len());
        Ok(saved)
    }
}
