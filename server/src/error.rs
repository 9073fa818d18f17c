//! Maps failures onto HTTP responses shaped `{"success": false, "message": "..."}`.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use serde_json::json;
use worklog_dashboard::error::WorklogError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request can not be served as given, the message is returned to the caller
    #[error("{0}")]
    InvalidRequest(String),

    /// Something failed on our side. Only `message` is returned to the caller,
    /// the source is logged.
    #[error("{message}: {source}")]
    Internal {
        message: String,
        source: WorklogError,
    },
}

impl ApiError {
    /// Classifies a `WorklogError`. Errors caused by the caller keep their own message,
    /// anything else is reported with the supplied generic message.
    pub fn from_worklog(message: &str) -> impl FnOnce(WorklogError) -> ApiError + '_ {
        move |source| {
            if source.is_client_error() {
                ApiError::InvalidRequest(source.to_string())
            } else {
                ApiError::Internal {
                    message: message.to_string(),
                    source,
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InvalidRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Internal { message, source } => {
                error!("{message}: {source}");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };
        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}
