//! Transfer request and general request endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{error, success, written, ApiResult};
use crate::auth::Session;
use crate::errors::AppError;
use crate::models::{GeneralRequest, PostGeneralRequest, ProposeTransferRequest, TransferRequest};
use crate::AppState;

/// GET /api/requests - Requests the acting leader made into their team.
pub async fn list_outgoing_requests(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Vec<TransferRequest>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let team = match session.leader() {
        Ok(leader) => leader.team,
        Err(e) => return error(e, revision_id),
    };

    match state.repo.outgoing_transfers(team).await {
        Ok(requests) => success(requests, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/requests/incoming - Pending requests for members of the acting leader's team.
pub async fn list_incoming_requests(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Vec<TransferRequest>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let team = match session.leader() {
        Ok(leader) => leader.team,
        Err(e) => return error(e, revision_id),
    };

    match state.repo.incoming_transfers(team).await {
        Ok(requests) => success(requests, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/requests - Ask another team's leader for one of their assigned members.
pub async fn propose_transfer(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<ProposeTransferRequest>,
) -> ApiResult<TransferRequest> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let leader = match session.leader() {
        Ok(leader) => leader,
        Err(e) => return error(e, revision_id),
    };

    let result = state.repo.propose_transfer(leader, &request).await;
    written(&state.repo, result, revision_id).await
}

/// POST /api/requests/:id/approve
pub async fn approve_transfer(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> ApiResult<TransferRequest> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let leader_id = match session.leader() {
        Ok(leader) => leader.id,
        Err(e) => return error(e, revision_id),
    };

    let result = state.repo.approve_transfer(&id, leader_id).await;
    written(&state.repo, result, revision_id).await
}

/// POST /api/requests/:id/deny
pub async fn deny_transfer(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> ApiResult<TransferRequest> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let leader_id = match session.leader() {
        Ok(leader) => leader.id,
        Err(e) => return error(e, revision_id),
    };

    let result = state.repo.deny_transfer(&id, leader_id).await;
    written(&state.repo, result, revision_id).await
}

/// GET /api/general-requests
pub async fn list_general_requests(State(state): State<AppState>) -> ApiResult<Vec<GeneralRequest>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_general_requests().await {
        Ok(requests) => success(requests, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/general-requests - Broadcast a need for more volunteers.
pub async fn post_general_request(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<PostGeneralRequest>,
) -> ApiResult<GeneralRequest> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let leader = match session.leader() {
        Ok(leader) => leader,
        Err(e) => return error(e, revision_id),
    };
    if request.message.trim().is_empty() {
        return error(
            AppError::Validation("Message is required".to_string()),
            revision_id,
        );
    }

    let result = state.repo.post_general_request(leader, &request.message).await;
    written(&state.repo, result, revision_id).await
}
