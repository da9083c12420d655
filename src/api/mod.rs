//! REST API module.
//!
//! Contains all API handlers. Each one resolves the acting [`crate::auth::Session`] where it
//! needs one and answers with the `{ success, data, revisionId }` envelope.

mod availability;
mod datastore;
mod members;
mod requests;
mod schedule;
mod session;
mod teams;

pub use availability::*;
pub use datastore::*;
pub use members::*;
pub use requests::*;
pub use schedule::*;
pub use session::*;
pub use teams::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Success response envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub revision_id: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T, revision_id: i64) -> Self {
        Self {
            success: true,
            data,
            revision_id,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, crate::errors::AppErrorWithRevision>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T, revision_id: i64) -> ApiResult<T> {
    Ok(ApiResponse::new(data, revision_id))
}

/// Create an error API response.
pub fn error<T: Serialize>(err: crate::errors::AppError, revision_id: i64) -> ApiResult<T> {
    Err(crate::errors::AppErrorWithRevision {
        error: err,
        revision_id,
    })
}

/// Answer a write: on success report the revision the write produced.
pub async fn written<T: Serialize>(
    repo: &crate::db::Repository,
    result: Result<T, crate::errors::AppError>,
    revision_id: i64,
) -> ApiResult<T> {
    match result {
        Ok(data) => {
            let new_revision = repo.get_revision_id().await.unwrap_or(revision_id);
            success(data, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
