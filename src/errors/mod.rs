//! Error handling module for the scheduler backend.
//!
//! Provides centralized error types with mapping to HTTP status codes and response envelopes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::models::{RequestStatus, TeamId};

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const NOT_AUTHORIZED: &str = "NOT_AUTHORIZED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const ALREADY_ASSIGNED_ELSEWHERE: &str = "ALREADY_ASSIGNED_ELSEWHERE";
    pub const INVALID_STATE: &str = "INVALID_STATE";
    pub const INVALID_SELECTION: &str = "INVALID_SELECTION";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Missing or invalid credentials / session
    Unauthorized(String),
    /// Leader or member acting outside what they own
    NotAuthorized(String),
    /// Resource not found
    NotFound(String),
    /// Member already holds an assignment for the date
    AlreadyAssignedElsewhere {
        team: TeamId,
        leader_name: String,
    },
    /// Operation on a request that is no longer pending
    InvalidState {
        message: String,
        status: RequestStatus,
    },
    /// Availability selection violates the team selection rules
    InvalidSelection(String),
    /// Validation error
    Validation(String),
    /// Database error
    Database(String),
    /// Internal server error
    Internal(String),
    /// Bad request
    BadRequest(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotAuthorized(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyAssignedElsewhere { .. } => StatusCode::CONFLICT,
            AppError::InvalidState { .. } => StatusCode::CONFLICT,
            AppError::InvalidSelection(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::NotAuthorized(_) => codes::NOT_AUTHORIZED,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::AlreadyAssignedElsewhere { .. } => codes::ALREADY_ASSIGNED_ELSEWHERE,
            AppError::InvalidState { .. } => codes::INVALID_STATE,
            AppError::InvalidSelection(_) => codes::INVALID_SELECTION,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::Database(_) => codes::DATABASE_ERROR,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::AlreadyAssignedElsewhere { team, leader_name } => format!(
                "This member is already assigned to {} by {}. Use a transfer request to ask for them.",
                team, leader_name
            ),
            AppError::InvalidState { message, .. } => message.clone(),
            AppError::Unauthorized(msg)
            | AppError::NotAuthorized(msg)
            | AppError::NotFound(msg)
            | AppError::InvalidSelection(msg)
            | AppError::Validation(msg)
            | AppError::Database(msg)
            | AppError::Internal(msg)
            | AppError::BadRequest(msg) => msg.clone(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::AlreadyAssignedElsewhere { team, leader_name } => {
                Some(serde_json::json!({ "team": team, "leaderName": leader_name }))
            }
            AppError::InvalidState { status, .. } => Some(serde_json::json!({ "status": status })),
            _ => None,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AppError::Database(format!("Database error: {}", err))
    }
}

/// Error details in the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
    pub revision_id: i64,
}

impl ErrorResponse {
    pub fn new(error: &AppError, revision_id: i64) -> Self {
        Self {
            success: false,
            error: ErrorDetails {
                code: error.error_code().to_string(),
                message: error.message(),
                details: error.details(),
            },
            revision_id,
        }
    }
}

/// Wrapper type for errors that carry revision_id context.
pub struct AppErrorWithRevision {
    pub error: AppError,
    pub revision_id: i64,
}

impl IntoResponse for AppErrorWithRevision {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        let body = ErrorResponse::new(&self.error, self.revision_id);
        (status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        AppErrorWithRevision {
            error: self,
            revision_id: 0,
        }
        .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_assigned_carries_team_and_leader() {
        let err = AppError::AlreadyAssignedElsewhere {
            team: TeamId::Greeter,
            leader_name: "Will Johnson".to_string(),
        };
        let body = ErrorResponse::new(&err, 4);
        assert_eq!(body.error.code, "ALREADY_ASSIGNED_ELSEWHERE");
        assert!(body.error.message.contains("greeter"));
        assert!(body.error.message.contains("Will Johnson"));
        let details = body.error.details.unwrap();
        assert_eq!(details["team"], "greeter");
        assert_eq!(details["leaderName"], "Will Johnson");
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn status_codes_per_variant() {
        assert_eq!(
            AppError::NotAuthorized(String::new()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::InvalidSelection(String::new()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        let invalid = AppError::InvalidState {
            message: "done".to_string(),
            status: RequestStatus::Denied,
        };
        assert_eq!(invalid.status_code(), StatusCode::CONFLICT);
        assert_eq!(ErrorResponse::new(&invalid, 0).error.details.unwrap()["status"], "denied");
    }
}
