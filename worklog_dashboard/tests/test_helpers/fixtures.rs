use chrono::{DateTime, NaiveDate, Utc};
use jira::models::core::{Author, Fields, IssueKey, Status};
use jira::models::issue::Issue;
use jira::models::user::User;
use jira::models::worklog::Worklog;

/// Pre-configured assignee in group PJ
pub const PJ_ASSIGNEE: &str = "6310531bea661fd37d4f042a";
/// Pre-configured assignee in group AG
pub const AG_ASSIGNEE: &str = "5fcde79ffee793007501bfd0";
/// The identifier which is denied by default
pub const DENIED_ASSIGNEE: &str = "712020:021cc494-3a62-45a8-bd3d-db7e0a9dd057";

/// Wednesday, January 10, 2024
pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
}

pub fn create_test_issue(key: &str, summary: &str) -> Issue {
    Issue {
        id: "10001".to_string(),
        key: IssueKey::from(key),
        fields: Fields {
            summary: summary.to_string(),
            status: Some(Status {
                name: "In Progress".to_string(),
            }),
            assignee: None,
        },
        ..Default::default()
    }
}

pub fn create_test_worklog(started: &str, time_spent_seconds: i64) -> Worklog {
    Worklog {
        id: "20001".to_string(),
        author: Author {
            accountId: PJ_ASSIGNEE.to_string(),
            emailAddress: None,
            displayName: "Ada Lovelace".to_string(),
        },
        started: DateTime::parse_from_rfc3339(started)
            .unwrap()
            .with_timezone(&Utc),
        time_spent_seconds,
        issue_id: "10001".to_string(),
    }
}

pub fn create_test_user(account_id: &str, name: &str) -> User {
    User {
        self_url: String::new(),
        account_id: account_id.to_string(),
        email_address: None,
        display_name: name.to_string(),
        time_zone: None,
    }
}
