use super::fixtures::{create_test_issue, create_test_user, create_test_worklog, PJ_ASSIGNEE};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use jira::models::issue::Issue;
use jira::models::user::User;
use jira::models::worklog::Worklog;
use jira::JiraError;
use mockall::mock;
use mockall::predicate::*;
use worklog_dashboard::source::TaskSource;

mock! {
    pub TaskSourceImpl {}

    #[async_trait]
    impl TaskSource for TaskSourceImpl {
        async fn tasks_with_worklogs_on(
            &self,
            assignee_id: &str,
            date: NaiveDate,
        ) -> Result<Vec<Issue>, JiraError>;
        async fn worklogs_for(
            &self,
            task_key: &str,
            started_after: Option<DateTime<Utc>>,
        ) -> Result<Vec<Worklog>, JiraError>;
        async fn user_info(&self, assignee_id: &str) -> Result<User, JiraError>;
        async fn test_connection(&self) -> Result<User, JiraError>;
    }
}

/// A source where only `PJ_ASSIGNEE` has worked, 2.5h on NOR-1 and 1h on NOR-2.
/// Every other assignee has no tasks.
pub fn source_with_one_busy_assignee() -> MockTaskSourceImpl {
    let mut source = MockTaskSourceImpl::new();
    source
        .expect_user_info()
        .with(eq(PJ_ASSIGNEE))
        .returning(|id| Ok(create_test_user(id, "Ada Lovelace")));
    source
        .expect_user_info()
        .returning(|id| Ok(create_test_user(id, "")));
    source
        .expect_tasks_with_worklogs_on()
        .with(eq(PJ_ASSIGNEE), always())
        .returning(|_, _| {
            Ok(vec![
                create_test_issue("NOR-1", "Write the report"),
                create_test_issue("NOR-2", "Review the report"),
            ])
        });
    source
        .expect_tasks_with_worklogs_on()
        .returning(|_, _| Ok(vec![]));
    source
        .expect_worklogs_for()
        .with(eq("NOR-1"), always())
        .returning(|_, _| {
            Ok(vec![
                create_test_worklog("2024-01-10T08:00:00Z", 7200),
                create_test_worklog("2024-01-10T12:00:00Z", 1800),
            ])
        });
    source
        .expect_worklogs_for()
        .with(eq("NOR-2"), always())
        .returning(|_, _| Ok(vec![create_test_worklog("2024-01-10T14:00:00Z", 3600)]));
    source
        .expect_test_connection()
        .returning(|| Ok(create_test_user(PJ_ASSIGNEE, "Ada Lovelace")));
    source
}
