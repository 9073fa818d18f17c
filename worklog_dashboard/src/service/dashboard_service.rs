//! Builds the view model shown by the dashboard for a single day.
use crate::date;
use crate::error::WorklogError;
use crate::repository::assignee_repository::AssigneeRepository;
use crate::repository::worklog_entry_repository::WorklogEntryRepository;
use crate::types::{Assignee, Hours, WorklogEntry};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

const UNKNOWN_NAME: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AssigneeStatus {
    Active,
    Inactive,
}

/// Summary of the work one assignee has logged on the day
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssigneeWorklog {
    pub assignee_id: String,
    pub name: String,
    pub email: String,
    pub initials: String,
    pub tasks_count: usize,
    pub hours_logged: Hours,
    pub progress_percent: u8,
    pub status: AssigneeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub is_preconfigured: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRow {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub assignee: String,
    pub worklog_hours: Hours,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub total_hours: Hours,
    pub active_assignees: usize,
    pub tasks_worked: usize,
    /// The date formatted for display, i.e. `Wednesday, January 10, 2024`
    pub worklog_date: String,
    pub selected_group: Option<String>,
    pub assignee_worklogs: Vec<AssigneeWorklog>,
    pub tasks: Vec<TaskRow>,
}

/// First letter of at most the two first words, upper cased
#[must_use]
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}

pub struct DashboardService {
    assignees: Arc<dyn AssigneeRepository>,
    worklog_entries: Arc<dyn WorklogEntryRepository>,
}

impl DashboardService {
    pub fn new(
        assignees: Arc<dyn AssigneeRepository>,
        worklog_entries: Arc<dyn WorklogEntryRepository>,
    ) -> Self {
        Self {
            assignees,
            worklog_entries,
        }
    }

    /// Computes the dashboard for `date`, optionally restricted to the assignees
    /// belonging to `group`.
    ///
    /// # Errors
    /// If any of the stores fail
    pub fn dashboard(
        &self,
        date: NaiveDate,
        group: Option<&str>,
    ) -> Result<DashboardView, WorklogError> {
        let group = group.map(str::trim).filter(|g| !g.is_empty());
        let entries = self.worklog_entries.find_by_date(Some(date))?;
        let roster = self.assignees.find_active()?;

        // Entries may belong to assignees which have been removed since
        let mut known: HashMap<String, Assignee> = roster
            .iter()
            .map(|a| (a.assignee_id.clone(), a.clone()))
            .collect();
        for entry in &entries {
            if !known.contains_key(&entry.assignee_id) {
                if let Some(assignee) = self.assignees.find_by_assignee_id(&entry.assignee_id)? {
                    known.insert(assignee.assignee_id.clone(), assignee);
                }
            }
        }

        let in_group = |assignee_id: &str| match group {
            None => true,
            Some(g) => known
                .get(assignee_id)
                .and_then(|a| a.group.as_deref())
                .is_some_and(|ag| ag == g),
        };

        let included: Vec<&WorklogEntry> = entries
            .iter()
            .filter(|e| in_group(&e.assignee_id))
            .collect();

        let mut assignee_worklogs = rollup(&included, &known);

        for assignee in roster.iter().filter(|a| in_group(&a.assignee_id)) {
            if !assignee_worklogs
                .iter()
                .any(|row| row.assignee_id == assignee.assignee_id)
            {
                assignee_worklogs.push(inactive_row(assignee));
            }
        }

        let tasks: Vec<TaskRow> = included
            .iter()
            .map(|e| TaskRow {
                key: e.task_key.clone(),
                summary: e.task_summary.clone().unwrap_or_default(),
                status: e.task_status.clone().unwrap_or_default(),
                assignee: e
                    .assignee_name
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
                worklog_hours: e.hours_logged,
            })
            .collect();

        Ok(DashboardView {
            total_hours: included.iter().map(|e| e.hours_logged).sum(),
            active_assignees: assignee_worklogs
                .iter()
                .filter(|row| row.status == AssigneeStatus::Active)
                .count(),
            tasks_worked: tasks.len(),
            worklog_date: date::format_display_date(date),
            selected_group: group.map(ToString::to_string),
            assignee_worklogs,
            tasks,
        })
    }
}

/// One `Active` row per assignee having entries, in order of their first entry
fn rollup(entries: &[&WorklogEntry], known: &HashMap<String, Assignee>) -> Vec<AssigneeWorklog> {
    let mut rows: Vec<AssigneeWorklog> = Vec::new();
    for entry in entries {
        if let Some(row) = rows.iter_mut().find(|r| r.assignee_id == entry.assignee_id) {
            row.tasks_count += 1;
            row.hours_logged = row.hours_logged + entry.hours_logged;
            continue;
        }
        let assignee = known.get(&entry.assignee_id);
        let name = entry
            .assignee_name
            .clone()
            .or_else(|| assignee.and_then(|a| a.name.clone()))
            .unwrap_or_else(|| UNKNOWN_NAME.to_string());
        rows.push(AssigneeWorklog {
            assignee_id: entry.assignee_id.clone(),
            initials: initials(&name),
            name,
            email: assignee.and_then(|a| a.email.clone()).unwrap_or_default(),
            tasks_count: 1,
            hours_logged: entry.hours_logged,
            progress_percent: 0,
            status: AssigneeStatus::Active,
            group: assignee.and_then(|a| a.group.clone()),
            is_preconfigured: assignee.is_some_and(|a| a.is_preconfigured),
        });
    }
    for row in &mut rows {
        row.progress_percent = row.hours_logged.progress_percent();
    }
    rows
}

fn inactive_row(assignee: &Assignee) -> AssigneeWorklog {
    let name = assignee
        .name
        .clone()
        .unwrap_or_else(|| UNKNOWN_NAME.to_string());
    AssigneeWorklog {
        assignee_id: assignee.assignee_id.clone(),
        initials: initials(&name),
        name,
        email: assignee.email.clone().unwrap_or_default(),
        tasks_count: 0,
        hours_logged: Hours::ZERO,
        progress_percent: 0,
        status: AssigneeStatus::Inactive,
        group: assignee.group.clone(),
        is_preconfigured: assignee.is_preconfigured,
    }
}
