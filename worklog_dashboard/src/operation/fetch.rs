//! Fetches the work logged in Jira on a single day by every active assignee and
//! stores the hours per assignee and task.
//!
//! Failures for a single assignee or a single task are logged and skipped, the
//! rest of the run carries on. The entries for the day are replaced in one
//! operation once everything has been fetched.
use crate::date;
use crate::error::WorklogError;
use crate::service::assignee_service::AssigneeService;
use crate::service::worklog_service::WorklogService;
use crate::source::TaskSource;
use crate::types::{Assignee, Hours, NewWorklogEntry};
use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;
use log::{debug, info, warn};
use serde::Serialize;

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchReport {
    pub worklog_date: NaiveDate,
    pub assignees_processed: usize,
    pub assignees_failed: usize,
    pub entries_saved: usize,
}

impl FetchReport {
    fn empty(worklog_date: NaiveDate) -> Self {
        FetchReport {
            worklog_date,
            assignees_processed: 0,
            assignees_failed: 0,
            entries_saved: 0,
        }
    }
}

/// Everything a run needs
pub struct Fetch<'a> {
    pub source: Option<&'a dyn TaskSource>,
    pub assignees: &'a AssigneeService,
    pub worklogs: &'a WorklogService,
    pub time_zone: Tz,
}

impl Fetch<'_> {
    /// Runs the fetch for `date`, the previous working day if none is given.
    ///
    /// # Errors
    /// * `WorklogError::JiraNotConfigured` if there is no Jira client, nothing is touched
    /// * Errors from the stores
    pub async fn execute(&self, date: Option<NaiveDate>) -> Result<FetchReport, WorklogError> {
        let source = self.source.ok_or(WorklogError::JiraNotConfigured)?;
        let date = date.unwrap_or_else(|| date::default_worklog_date(self.time_zone));
        info!("Fetching worklogs for {date}");

        let roster = self.assignees.find_active()?;
        if roster.is_empty() {
            info!("No active assignees, nothing to fetch for {date}");
            return Ok(FetchReport::empty(date));
        }

        let mut report = FetchReport::empty(date);
        let mut entries = Vec::new();
        for assignee in &roster {
            match self.entries_for_assignee(source, assignee, date).await {
                Ok(mut assignee_entries) => {
                    debug!(
                        "{} entries for {} on {date}",
                        assignee_entries.len(),
                        assignee.assignee_id
                    );
                    report.assignees_processed += 1;
                    entries.append(&mut assignee_entries);
                }
                Err(e) => {
                    warn!("Unable to fetch worklogs for {}: {e}", assignee.assignee_id);
                    report.assignees_failed += 1;
                }
            }
        }

        report.entries_saved = self.worklogs.replace_for_date(date, entries)?.len();
        info!(
            "Fetch for {} completed: {} assignees processed, {} failed, {} entries saved",
            report.worklog_date,
            report.assignees_processed,
            report.assignees_failed,
            report.entries_saved
        );
        Ok(report)
    }

    async fn entries_for_assignee(
        &self,
        source: &dyn TaskSource,
        assignee: &Assignee,
        date: NaiveDate,
    ) -> Result<Vec<NewWorklogEntry>, WorklogError> {
        let name = self.resolve_name(source, assignee).await;

        let tasks = source
            .tasks_with_worklogs_on(&assignee.assignee_id, date)
            .await?;

        // Jira wants worklogs started after a point in time, hence the second less
        let started_after = date::start_of_day(date, self.time_zone) - Duration::seconds(1);

        let mut entries = Vec::new();
        for task in tasks {
            let task_key = task.key.as_str();
            let worklogs = match source.worklogs_for(task_key, Some(started_after)).await {
                Ok(worklogs) => worklogs,
                Err(e) => {
                    warn!("Skipping {task_key}, unable to retrieve its worklogs: {e}");
                    continue;
                }
            };

            let on_date: Vec<_> = worklogs
                .iter()
                .filter(|wl| date::is_on_date(wl.started, date, self.time_zone))
                .collect();
            if on_date.is_empty() {
                continue;
            }
            let seconds: i64 = on_date.iter().map(|wl| wl.time_spent_seconds).sum();

            entries.push(NewWorklogEntry {
                assignee_id: assignee.assignee_id.clone(),
                assignee_name: Some(
                    name.clone()
                        .or_else(|| task.fields.assignee_display_name().map(ToString::to_string))
                        .unwrap_or_else(|| "Unknown".to_string()),
                ),
                task_key: task_key.to_string(),
                task_summary: Some(task.fields.summary.clone()).filter(|s| !s.is_empty()),
                task_status: task.fields.status_name().map(ToString::to_string),
                hours_logged: Hours::from_seconds(seconds),
                worklog_date: date,
            });
        }
        Ok(entries)
    }

    /// Looks up name and email if either is missing and stores what was found.
    /// A failing lookup is logged and falls back to the stored name.
    async fn resolve_name(&self, source: &dyn TaskSource, assignee: &Assignee) -> Option<String> {
        if assignee.name.is_some() && assignee.email.is_some() {
            return assignee.name.clone();
        }
        match source.user_info(&assignee.assignee_id).await {
            Ok(user) => {
                let name = Some(user.display_name)
                    .filter(|n| !n.trim().is_empty())
                    .or_else(|| assignee.name.clone());
                let email = user.email_address.or_else(|| assignee.email.clone());
                if let Err(e) =
                    self.assignees
                        .update_info(&assignee.assignee_id, name.as_deref(), email.as_deref())
                {
                    warn!("Unable to store user info for {}: {e}", assignee.assignee_id);
                }
                name
            }
            Err(e) => {
                warn!("Unable to look up user {}: {e}", assignee.assignee_id);
                assignee.name.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AssigneesConfig;
    use crate::repository::database_manager::{DatabaseConfig, DatabaseManager};
    use crate::source::tests::{
        create_test_issue, create_test_user, create_test_worklog, MockTaskSourceImpl,
    };
    use crate::types::NewAssignee;
    use jira::builder::JiraBuilder;
    use jira::JiraError;
    use mockall::predicate::*;

    struct Stores {
        assignees: AssigneeService,
        worklogs: WorklogService,
    }

    fn stores(ids: &[&str]) -> Stores {
        let manager = DatabaseManager::new(&DatabaseConfig::Memory).unwrap();
        let assignees = AssigneeService::new(
            manager.create_assignee_repository(),
            &AssigneesConfig::default(),
        );
        for id in ids {
            assignees.add(&NewAssignee::with_id(id)).unwrap();
        }
        Stores {
            assignees,
            worklogs: WorklogService::new(manager.create_worklog_entry_repository()),
        }
    }

    fn fetch<'a>(source: &'a MockTaskSourceImpl, stores: &'a Stores) -> Fetch<'a> {
        Fetch {
            source: Some(source),
            assignees: &stores.assignees,
            worklogs: &stores.worklogs,
            time_zone: chrono_tz::UTC,
        }
    }

    fn target_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    fn expect_user(source: &mut MockTaskSourceImpl, id: &'static str, name: &'static str) {
        source
            .expect_user_info()
            .with(eq(id))
            .returning(move |_| Ok(create_test_user(id, name, Some("someone@norn.com"))));
    }

    /// One assignee with two tasks, 2.5h and 1h, plus a worklog from the day before
    fn two_task_source() -> MockTaskSourceImpl {
        let mut source = MockTaskSourceImpl::new();
        expect_user(&mut source, "a", "Ada Lovelace");
        source
            .expect_tasks_with_worklogs_on()
            .with(eq("a"), eq(target_date()))
            .returning(|_, _| {
                Ok(vec![
                    create_test_issue("NOR-1", "First task", "In Progress", "Ada Lovelace"),
                    create_test_issue("NOR-2", "Second task", "Done", "Ada Lovelace"),
                ])
            });
        source
            .expect_worklogs_for()
            .with(eq("NOR-1"), always())
            .returning(|_, _| {
                Ok(vec![
                    create_test_worklog("2024-01-10T08:00:00Z", 5400),
                    create_test_worklog("2024-01-10T13:00:00Z", 3600),
                    create_test_worklog("2024-01-09T13:00:00Z", 7200),
                ])
            });
        source
            .expect_worklogs_for()
            .with(eq("NOR-2"), always())
            .returning(|_, _| Ok(vec![create_test_worklog("2024-01-10T15:00:00Z", 3600)]));
        source
    }

    #[tokio::test]
    async fn test_hours_are_summed_per_task() -> Result<(), WorklogError> {
        let source = two_task_source();
        let stores = stores(&["a"]);

        let report = fetch(&source, &stores).execute(Some(target_date())).await?;
        assert_eq!(report.assignees_processed, 1);
        assert_eq!(report.assignees_failed, 0);
        assert_eq!(report.entries_saved, 2);

        let entries = stores.worklogs.entries_for(target_date())?;
        assert_eq!(entries[0].task_key, "NOR-1");
        assert_eq!(entries[0].hours_logged.to_string(), "2.5h");
        assert_eq!(entries[0].task_status.as_deref(), Some("In Progress"));
        assert_eq!(entries[1].hours_logged.to_string(), "1h");
        assert_eq!(entries[1].assignee_name.as_deref(), Some("Ada Lovelace"));

        // The looked up name is stored
        let stored = stores.assignees.find("a")?.unwrap();
        assert_eq!(stored.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(stored.email.as_deref(), Some("someone@norn.com"));
        Ok(())
    }

    #[tokio::test]
    async fn test_rerun_replaces_entries() -> Result<(), WorklogError> {
        let source = two_task_source();
        let stores = stores(&["a"]);

        fetch(&source, &stores).execute(Some(target_date())).await?;
        fetch(&source, &stores).execute(Some(target_date())).await?;
        assert_eq!(stores.worklogs.entries_for(target_date())?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_failing_assignee_is_skipped() -> Result<(), WorklogError> {
        let mut source = MockTaskSourceImpl::new();
        expect_user(&mut source, "a", "Ada Lovelace");
        expect_user(&mut source, "b", "Bea Arthur");
        source
            .expect_tasks_with_worklogs_on()
            .with(eq("a"), always())
            .returning(|_, _| Err(JiraError::Unauthorized));
        source
            .expect_tasks_with_worklogs_on()
            .with(eq("b"), always())
            .returning(|_, _| Ok(vec![create_test_issue("NOR-7", "Other", "Done", "Bea Arthur")]));
        source
            .expect_worklogs_for()
            .returning(|_, _| Ok(vec![create_test_worklog("2024-01-10T09:00:00Z", 1800)]));
        let stores = stores(&["a", "b"]);

        let report = fetch(&source, &stores).execute(Some(target_date())).await?;
        assert_eq!(report.assignees_processed, 1);
        assert_eq!(report.assignees_failed, 1);
        assert_eq!(report.entries_saved, 1);
        assert_eq!(
            stores.worklogs.entries_for(target_date())?[0].hours_logged,
            Hours::new(0.5)
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_failing_task_is_skipped_and_empty_task_gives_no_entry() -> Result<(), WorklogError>
    {
        let mut source = MockTaskSourceImpl::new();
        // Lookup fails, the name of the task assignee is used
        source
            .expect_user_info()
            .returning(|_| Err(JiraError::NotFound("user".to_string())));
        source.expect_tasks_with_worklogs_on().returning(|_, _| {
            Ok(vec![
                create_test_issue("NOR-1", "Broken", "Open", "Carl Sagan"),
                create_test_issue("NOR-2", "Other day", "Open", "Carl Sagan"),
                create_test_issue("NOR-3", "Good", "Open", "Carl Sagan"),
            ])
        });
        source
            .expect_worklogs_for()
            .with(eq("NOR-1"), always())
            .returning(|_, _| Err(JiraError::NotFound("issue".to_string())));
        source
            .expect_worklogs_for()
            .with(eq("NOR-2"), always())
            .returning(|_, _| Ok(vec![create_test_worklog("2024-01-11T09:00:00Z", 3600)]));
        source
            .expect_worklogs_for()
            .with(eq("NOR-3"), always())
            .returning(|_, _| Ok(vec![create_test_worklog("2024-01-10T09:00:00Z", 3600)]));
        let stores = stores(&["c"]);

        let report = fetch(&source, &stores).execute(Some(target_date())).await?;
        assert_eq!(report.assignees_processed, 1);
        assert_eq!(report.entries_saved, 1);
        let entries = stores.worklogs.entries_for(target_date())?;
        assert_eq!(entries[0].task_key, "NOR-3");
        assert_eq!(entries[0].assignee_name.as_deref(), Some("Carl Sagan"));
        assert_eq!(stores.assignees.find("c")?.unwrap().name, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_other_dates_are_left_alone() -> Result<(), WorklogError> {
        let source = two_task_source();
        let stores = stores(&["a"]);
        let other_date = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        stores.worklogs.replace_for_date(
            other_date,
            vec![NewWorklogEntry {
                assignee_id: "a".to_string(),
                assignee_name: None,
                task_key: "NOR-0".to_string(),
                task_summary: None,
                task_status: None,
                hours_logged: Hours::new(1.0),
                worklog_date: other_date,
            }],
        )?;

        fetch(&source, &stores).execute(Some(target_date())).await?;
        assert_eq!(stores.worklogs.entries_for(other_date)?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_source_touches_nothing() -> Result<(), WorklogError> {
        let stores = stores(&["a"]);
        let fetch = Fetch {
            source: None,
            assignees: &stores.assignees,
            worklogs: &stores.worklogs,
            time_zone: chrono_tz::UTC,
        };
        let result = fetch.execute(Some(target_date())).await;
        assert!(matches!(result, Err(WorklogError::JiraNotConfigured)));
        Ok(())
    }

    #[tokio::test]
    async fn test_no_active_assignees() -> Result<(), WorklogError> {
        let source = MockTaskSourceImpl::new();
        let stores = stores(&[]);
        let report = fetch(&source, &stores).execute(Some(target_date())).await?;
        assert_eq!(report, FetchReport::empty(target_date()));
        Ok(())
    }

    #[tokio::test]
    async fn test_worklog_date_follows_time_zone() -> Result<(), WorklogError> {
        let mut source = MockTaskSourceImpl::new();
        expect_user(&mut source, "a", "Ada Lovelace");
        source
            .expect_tasks_with_worklogs_on()
            .returning(|_, _| Ok(vec![create_test_issue("NOR-1", "Late", "Open", "Ada")]));
        // 23:30 UTC on the 9th is 00:30 on the 10th in Oslo
        source
            .expect_worklogs_for()
            .returning(|_, _| Ok(vec![create_test_worklog("2024-01-09T23:30:00Z", 3600)]));
        let stores = stores(&["a"]);
        let fetch = Fetch {
            time_zone: chrono_tz::Europe::Oslo,
            ..fetch(&source, &stores)
        };
        let report = fetch.execute(Some(target_date())).await?;
        assert_eq!(report.entries_saved, 1);
        Ok(())
    }

    /// The error Jira gives when the request times out, from a listener which never replies
    async fn timed_out_request() -> JiraError {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut open = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                open.push(socket);
            }
        });
        let jira = JiraBuilder::new()
            .host(format!("http://{addr}"))
            .basic_auth("someone@norn.com", "token")
            .timeout(1)
            .build()
            .unwrap();
        jira.search_issues_with_worklogs_on("a", target_date())
            .await
            .unwrap_err()
    }

    #[tokio::test]
    async fn test_timed_out_assignee_is_skipped() -> Result<(), WorklogError> {
        let timeout = timed_out_request().await;
        assert!(matches!(&timeout, JiraError::RequestError(e) if e.is_timeout()));

        let mut source = MockTaskSourceImpl::new();
        expect_user(&mut source, "a", "Ada Lovelace");
        expect_user(&mut source, "b", "Bea Arthur");
        source
            .expect_tasks_with_worklogs_on()
            .with(eq("a"), always())
            .return_once(move |_, _| Err(timeout));
        source
            .expect_tasks_with_worklogs_on()
            .with(eq("b"), always())
            .returning(|_, _| Ok(vec![create_test_issue("NOR-7", "Other", "Done", "Bea Arthur")]));
        source
            .expect_worklogs_for()
            .returning(|_, _| Ok(vec![create_test_worklog("2024-01-10T09:00:00Z", 3600)]));
        let stores = stores(&["a", "b"]);

        let report = fetch(&source, &stores).execute(Some(target_date())).await?;
        assert_eq!(report.assignees_processed, 1);
        assert_eq!(report.assignees_failed, 1);

        let entries = stores.worklogs.entries_for(target_date())?;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].assignee_id, "b");
        assert_eq!(entries[0].task_key, "NOR-7");
        Ok(())
    }
}
