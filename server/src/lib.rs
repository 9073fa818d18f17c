//! HTTP API of the worklog dashboard.
use crate::error::ApiError;
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use worklog_dashboard::date;
use worklog_dashboard::error::WorklogError;
use worklog_dashboard::operation::fetch::FetchReport;
use worklog_dashboard::scheduler::SchedulerStatus;
use worklog_dashboard::service::dashboard_service::DashboardView;
use worklog_dashboard::types::{Assignee, NewAssignee};
use worklog_dashboard::ApplicationRuntime;

pub mod error;

type AppState = Arc<ApplicationRuntime>;

/// Creates the router serving the `/api` endpoints
pub fn build_router(runtime: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/assignees", get(list_assignees).post(add_assignee))
        .route("/api/assignees/{assignee_id}", delete(remove_assignee))
        .route("/api/dashboard", get(dashboard))
        .route("/api/refresh", post(refresh))
        .route("/api/test-connection", post(test_connection))
        .route("/api/status", get(status))
        .layer(cors)
        .with_state(runtime)
}

async fn list_assignees(State(runtime): State<AppState>) -> Result<Json<Vec<Assignee>>, ApiError> {
    runtime
        .assignee_service()
        .find_active()
        .map(Json)
        .map_err(ApiError::from_worklog("Failed to get assignees"))
}

async fn add_assignee(
    State(runtime): State<AppState>,
    payload: Result<Json<NewAssignee>, JsonRejection>,
) -> Result<Json<Assignee>, ApiError> {
    let Json(new) = payload.map_err(|e| {
        warn!("Rejected assignee data: {e}");
        ApiError::InvalidRequest("Invalid assignee data".to_string())
    })?;
    runtime
        .assignee_service()
        .add(&new)
        .map(Json)
        .map_err(ApiError::from_worklog("Failed to add assignee"))
}

async fn remove_assignee(
    State(runtime): State<AppState>,
    Path(assignee_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    runtime
        .assignee_service()
        .remove(&assignee_id)
        .map_err(ApiError::from_worklog("Failed to remove assignee"))?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
struct DashboardQuery {
    date: Option<String>,
    group: Option<String>,
}

async fn dashboard(
    State(runtime): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardView>, ApiError> {
    runtime
        .dashboard(query.date.as_deref(), query.group.as_deref())
        .map(Json)
        .map_err(ApiError::from_worklog("Failed to get dashboard data"))
}

#[derive(Debug, Default, Deserialize)]
struct RefreshRequest {
    date: Option<String>,
}

#[derive(Debug, Serialize)]
struct RefreshResponse {
    success: bool,
    message: &'static str,
    report: FetchReport,
}

/// The body is optional, an empty body refreshes the previous working day
async fn refresh(
    State(runtime): State<AppState>,
    body: Bytes,
) -> Result<Json<RefreshResponse>, ApiError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        RefreshRequest::default()
    } else {
        serde_json::from_slice::<RefreshRequest>(&body)
            .map_err(|_| ApiError::InvalidRequest("Invalid refresh request".to_string()))?
    };
    let date = request
        .date
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(date::parse_worklog_date)
        .transpose()
        .map_err(|e| ApiError::InvalidRequest(WorklogError::from(e).to_string()))?;

    match runtime.refresh(date).await {
        Ok(report) => Ok(Json(RefreshResponse {
            success: true,
            message: "Worklog data refreshed successfully",
            report,
        })),
        Err(e) if e.is_client_error() => Err(ApiError::InvalidRequest(e.to_string())),
        Err(e) => Err(ApiError::Internal {
            message: e.to_string(),
            source: e,
        }),
    }
}

async fn test_connection(State(runtime): State<AppState>) -> Result<Json<Value>, ApiError> {
    match runtime.test_connection().await {
        Ok(user) => {
            info!("Connected to Jira as {}", user.display_name);
            Ok(Json(json!({
                "success": true,
                "message": "Successfully connected to JIRA"
            })))
        }
        Err(WorklogError::JiraNotConfigured) => Err(ApiError::InvalidRequest(
            WorklogError::JiraNotConfigured.to_string(),
        )),
        Err(WorklogError::JiraError(reason)) => {
            warn!("Jira connection test failed: {reason}");
            Err(ApiError::InvalidRequest(
                "Failed to connect to JIRA".to_string(),
            ))
        }
        Err(source) => Err(ApiError::Internal {
            message: "Connection test failed".to_string(),
            source,
        }),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    #[serde(flatten)]
    scheduler: SchedulerStatus,
    jira_configured: bool,
    schedule_enabled: bool,
    schedule_time: String,
    schedule_timezone: String,
}

async fn status(State(runtime): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    let scheduler = runtime
        .scheduler()
        .status()
        .map_err(ApiError::from_worklog("Failed to get status"))?;
    let schedule = &runtime.config().schedule;
    Ok(Json(StatusResponse {
        scheduler,
        jira_configured: runtime.is_jira_configured(),
        schedule_enabled: schedule.enabled,
        schedule_time: schedule.time.clone(),
        schedule_timezone: schedule.timezone.clone(),
    }))
}
