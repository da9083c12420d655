//! Member registry endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{error, success, written, ApiResult};
use crate::auth::Session;
use crate::errors::AppError;
use crate::models::{Member, RegisterMemberRequest, UpdateTeamsRequest};
use crate::schedule::selection::validate_affiliations;
use crate::AppState;

/// GET /api/members - List all members.
pub async fn list_members(State(state): State<AppState>) -> ApiResult<Vec<Member>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_members().await {
        Ok(members) => success(members, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/members/:id - Get a single member.
pub async fn get_member(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Member> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_member(id).await {
        Ok(Some(member)) => success(member, revision_id),
        Ok(None) => error(
            AppError::NotFound(format!("Member {} not found", id)),
            revision_id,
        ),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/members - Sign up a new member.
pub async fn register_member(
    State(state): State<AppState>,
    Json(request): Json<RegisterMemberRequest>,
) -> ApiResult<Member> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.first_name.trim().is_empty() || request.last_name.trim().is_empty() {
        return error(
            AppError::Validation("First and last name are required".to_string()),
            revision_id,
        );
    }
    if !request.email.contains('@') {
        return error(
            AppError::Validation("A valid email is required".to_string()),
            revision_id,
        );
    }
    if let Err(e) = validate_affiliations(&request.primary_teams, &request.secondary_teams) {
        return error(e, revision_id);
    }

    let result = state.repo.register_member(&request).await;
    written(&state.repo, result, revision_id).await
}

/// PUT /api/members/:id - A member replaces their own team affiliations.
pub async fn update_member_teams(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
    Json(request): Json<UpdateTeamsRequest>,
) -> ApiResult<Member> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let acting = match session.member() {
        Ok(member) => member,
        Err(e) => return error(e, revision_id),
    };
    if acting.id != id {
        return error(
            AppError::NotAuthorized("Members can only change their own teams".to_string()),
            revision_id,
        );
    }
    if let Err(e) = validate_affiliations(&request.primary_teams, &request.secondary_teams) {
        return error(e, revision_id);
    }

    let result = state.repo.update_member_teams(id, &request).await;
    written(&state.repo, result, revision_id).await
}
