//! Datastore snapshot endpoints.

use axum::extract::State;

use super::{error, success, ApiResult};
use crate::models::{Datastore, RevisionInfo};
use crate::AppState;

/// GET /api/datastore - The persisted scheduling document in one payload.
pub async fn get_datastore(State(state): State<AppState>) -> ApiResult<Datastore> {
    match state.repo.get_datastore().await {
        Ok(datastore) => {
            let revision_id = datastore.revision_id;
            success(datastore, revision_id)
        }
        Err(e) => error(e, 0),
    }
}

/// GET /api/datastore/revision - Cheap change detection for polling clients.
pub async fn get_revision(State(state): State<AppState>) -> ApiResult<RevisionInfo> {
    match state.repo.get_revision_info().await {
        Ok(info) => {
            let revision_id = info.revision_id;
            success(info, revision_id)
        }
        Err(e) => error(e, 0),
    }
}
