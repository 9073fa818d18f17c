use crate::error::WorklogError;
use crate::repository::assignee_repository::AssigneeRepository;
use crate::repository::SharedSqliteConnection;
use crate::types::Assignee;
use log::debug;
use rusqlite::{named_params, params, OptionalExtension, Row};

pub struct SqliteAssigneeRepository {
    connection: SharedSqliteConnection,
}

impl SqliteAssigneeRepository {
    pub(crate) fn new(connection: SharedSqliteConnection) -> Self {
        Self { connection }
    }
}

/// SQL statement to create the `assignee` table.
/// `seq` keeps the insertion order.
const CREATE_ASSIGNEE_TABLE_SQL: &str = r"
CREATE TABLE IF NOT EXISTS assignee (
    seq integer primary key autoincrement,
    id varchar(64) NOT NULL unique,
    assignee_id varchar(128) NOT NULL unique,
    name varchar(512),
    email varchar(1024),
    assignee_group varchar(64),
    is_preconfigured integer NOT NULL default 0,
    is_active integer NOT NULL default 1,
    created_at datetime NOT NULL
);
";

const SELECT_COLUMNS: &str =
    "id, assignee_id, name, email, assignee_group, is_preconfigured, is_active, created_at";

/// Creates the `assignee` table in the database.
pub(crate) fn create_assignee_table(connection: &SharedSqliteConnection) -> Result<(), WorklogError> {
    let conn = connection.lock().map_err(|_| WorklogError::LockPoisoned)?;
    conn.execute(CREATE_ASSIGNEE_TABLE_SQL, [])?;
    Ok(())
}

fn map_row(row: &Row<'_>) -> Result<Assignee, rusqlite::Error> {
    Ok(Assignee {
        id: row.get(0)?,
        assignee_id: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        group: row.get(4)?,
        is_preconfigured: row.get(5)?,
        is_active: row.get(6)?,
        created_at: row.get(7)?,
    })
}

impl AssigneeRepository for SqliteAssigneeRepository {
    fn find_active(&self) -> Result<Vec<Assignee>, WorklogError> {
        let conn = self
            .connection
            .lock()
            .map_err(|_| WorklogError::LockPoisoned)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM assignee WHERE is_active = 1 ORDER BY seq"
        ))?;
        let assignees = stmt
            .query_map([], map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(assignees)
    }

    fn find_by_assignee_id(&self, assignee_id: &str) -> Result<Option<Assignee>, WorklogError> {
        let conn = self
            .connection
            .lock()
            .map_err(|_| WorklogError::LockPoisoned)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM assignee WHERE assignee_id = ?1"
        ))?;
        Ok(stmt.query_row(params![assignee_id], map_row).optional()?)
    }

    fn add(&self, assignee: &Assignee) -> Result<Assignee, WorklogError> {
        debug!("Adding {assignee:?} to DBMS");
        let mut conn = self
            .connection
            .lock()
            .map_err(|_| WorklogError::LockPoisoned)?;
        let tx = conn.transaction()?;

        let existing: Option<bool> = tx
            .query_row(
                "SELECT is_active FROM assignee WHERE assignee_id = ?1",
                params![assignee.assignee_id],
                |row| row.get(0),
            )
            .optional()?;

        let values = named_params! {
            ":id": assignee.id,
            ":assignee_id": assignee.assignee_id,
            ":name": assignee.name,
            ":email": assignee.email,
            ":group": assignee.group,
            ":is_preconfigured": assignee.is_preconfigured,
            ":is_active": assignee.is_active,
            ":created_at": assignee.created_at,
        };
        match existing {
            Some(true) => {
                return Err(WorklogError::DuplicateAssignee(assignee.assignee_id.clone()));
            }
            // Replaces the inactive record, keeping its position
            Some(false) => tx.execute(
                "UPDATE assignee SET id = :id, name = :name, email = :email, assignee_group = :group,
                    is_preconfigured = :is_preconfigured, is_active = :is_active, created_at = :created_at
                 WHERE assignee_id = :assignee_id",
                values,
            )?,
            None => tx.execute(
                "INSERT INTO assignee (id, assignee_id, name, email, assignee_group, is_preconfigured, is_active, created_at)
                 VALUES (:id, :assignee_id, :name, :email, :group, :is_preconfigured, :is_active, :created_at)",
                values,
            )?,
        };
        tx.commit()?;
        Ok(assignee.clone())
    }

    fn insert_if_absent(&self, assignee: &Assignee) -> Result<bool, WorklogError> {
        let conn = self
            .connection
            .lock()
            .map_err(|_| WorklogError::LockPoisoned)?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO assignee (id, assignee_id, name, email, assignee_group, is_preconfigured, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                assignee.id,
                assignee.assignee_id,
                assignee.name,
                assignee.email,
                assignee.group,
                assignee.is_preconfigured,
                assignee.is_active,
                assignee.created_at
            ],
        )?;
        Ok(inserted > 0)
    }

    fn soft_remove(&self, assignee_id: &str) -> Result<bool, WorklogError> {
        let conn = self
            .connection
            .lock()
            .map_err(|_| WorklogError::LockPoisoned)?;
        let changed = conn.execute(
            "UPDATE assignee SET is_active = 0
             WHERE assignee_id = ?1 AND is_preconfigured = 0 AND is_active = 1",
            params![assignee_id],
        )?;
        Ok(changed > 0)
    }

    fn update_info(
        &self,
        assignee_id: &str,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<Assignee, WorklogError> {
        {
            let conn = self
                .connection
                .lock()
                .map_err(|_| WorklogError::LockPoisoned)?;
            let changed = conn.execute(
                "UPDATE assignee SET name = ?1, email = ?2 WHERE assignee_id = ?3",
                params![name, email, assignee_id],
            )?;
            if changed == 0 {
                return Err(WorklogError::AssigneeNotFound(assignee_id.to_string()));
            }
        }
        self.find_by_assignee_id(assignee_id)?
            .ok_or_else(|| WorklogError::AssigneeNotFound(assignee_id.to_string()))
    }
}
