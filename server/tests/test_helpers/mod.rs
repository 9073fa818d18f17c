use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{DateTime, NaiveDate, Utc};
use dashboard_server::build_router;
use http_body_util::BodyExt;
use jira::models::core::{Author, Fields, IssueKey, Status};
use jira::models::issue::Issue;
use jira::models::user::User;
use jira::models::worklog::Worklog;
use jira::JiraError;
use mockall::mock;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use worklog_dashboard::config::AppConfiguration;
use worklog_dashboard::source::TaskSource;
use worklog_dashboard::ApplicationRuntimeBuilder;

/// Pre-configured assignee in group PJ
pub const PJ_ASSIGNEE: &str = "6310531bea661fd37d4f042a";
/// The identifier which is denied by default
pub const DENIED_ASSIGNEE: &str = "712020:021cc494-3a62-45a8-bd3d-db7e0a9dd057";

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

pub fn create_test_user(account_id: &str, name: &str) -> User {
    User {
        self_url: String::new(),
        account_id: account_id.to_string(),
        email_address: None,
        display_name: name.to_string(),
        time_zone: None,
    }
}

pub fn create_test_issue(key: &str, summary: &str) -> Issue {
    Issue {
        id: "10001".to_string(),
        key: IssueKey::from(key),
        fields: Fields {
            summary: summary.to_string(),
            status: Some(Status {
                name: "Done".to_string(),
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

/// Router backed by an in-memory runtime with the default roster and the supplied source
pub fn app_with(source: MockTaskSourceImpl) -> Router {
    let _ = env_logger::builder().is_test(true).try_init();
    let runtime = ApplicationRuntimeBuilder::new()
        .with_config(AppConfiguration::default())
        .use_in_memory_db()
        .with_task_source(Arc::new(source))
        .build()
        .unwrap();
    build_router(Arc::new(runtime))
}

/// Router whose runtime has no Jira client
pub fn unconfigured_app() -> Router {
    let _ = env_logger::builder().is_test(true).try_init();
    let runtime = ApplicationRuntimeBuilder::new()
        .with_config(AppConfiguration::default())
        .use_in_memory_db()
        .without_task_source()
        .build()
        .unwrap();
    build_router(Arc::new(runtime))
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}
