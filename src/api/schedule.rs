//! Assignment store endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use super::{error, success, written, ApiResult};
use crate::auth::Session;
use crate::errors::AppError;
use crate::models::{team, AssignRequest, AssignmentLookup, Candidate, DaySchedule, TeamId};
use crate::schedule::calendar;
use crate::AppState;

/// Upper bound on the Sunday listing.
const MAX_SUNDAYS: usize = 104;

/// Query parameters for the upcoming-Sundays listing.
#[derive(Debug, Deserialize)]
pub struct SundaysQuery {
    /// Start date (default: today)
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub count: Option<usize>,
}

/// GET /api/schedule/sundays - The next Sundays to schedule.
pub async fn upcoming_sundays(
    State(state): State<AppState>,
    Query(query): Query<SundaysQuery>,
) -> ApiResult<Vec<NaiveDate>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    let from = query.from.unwrap_or_else(|| Utc::now().date_naive());
    let count = query
        .count
        .unwrap_or(state.config.upcoming_sundays)
        .min(MAX_SUNDAYS);

    success(calendar::upcoming_sundays(from, count), revision_id)
}

/// GET /api/schedule/:date - Assignments for every team on a date.
pub async fn get_day_schedule(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
) -> ApiResult<DaySchedule> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.day_schedule(date).await {
        Ok(schedule) => success(schedule, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/schedule/:date/lookup/:member_id - Where a member sits on a date.
pub async fn lookup_assignment(
    State(state): State<AppState>,
    Path((date, member_id)): Path<(NaiveDate, i64)>,
) -> ApiResult<Option<AssignmentLookup>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.lookup(member_id, date).await {
        Ok(found) => success(found, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/schedule/:date/candidates/:team - Opted-in members still free on a date.
pub async fn list_candidates(
    State(state): State<AppState>,
    Path((date, team)): Path<(NaiveDate, TeamId)>,
) -> ApiResult<Vec<Candidate>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.candidates(team, date).await {
        Ok(candidates) => success(candidates, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/schedule/:date/:team - The team's leader assigns a member.
pub async fn assign_member(
    State(state): State<AppState>,
    session: Session,
    Path((date, team)): Path<(NaiveDate, TeamId)>,
    Json(request): Json<AssignRequest>,
) -> ApiResult<DaySchedule> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let leader = match session.leader() {
        Ok(leader) => leader,
        Err(e) => return error(e, revision_id),
    };
    if !team::leads(leader.id, team) {
        return error(
            AppError::NotAuthorized("You can only assign members to your own team".to_string()),
            revision_id,
        );
    }

    let result = state.repo.assign(request.member_id, team, date).await;
    written(&state.repo, result, revision_id).await
}

/// DELETE /api/schedule/:date/:team/:member_id - The team's leader removes a member.
pub async fn remove_member(
    State(state): State<AppState>,
    session: Session,
    Path((date, team, member_id)): Path<(NaiveDate, TeamId, i64)>,
) -> ApiResult<DaySchedule> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let leader_id = match session.leader() {
        Ok(leader) => leader.id,
        Err(e) => return error(e, revision_id),
    };

    let result = state.repo.remove(member_id, team, date, leader_id).await;
    written(&state.repo, result, revision_id).await
}
