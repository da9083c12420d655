//! Session endpoint.

use axum::extract::State;

use super::{success, ApiResult};
use crate::auth::Session;
use crate::models::Principal;
use crate::AppState;

/// GET /api/session - The principal resolved from the session headers.
pub async fn get_session(State(state): State<AppState>, session: Session) -> ApiResult<Principal> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    success(session.0, revision_id)
}
