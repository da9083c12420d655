//! Availability endpoints. A member only ever reads and writes their own declarations.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::NaiveDate;

use super::{error, success, written, ApiResult};
use crate::auth::Session;
use crate::errors::AppError;
use crate::models::{Availability, MonthKey, SetAvailabilityRequest};
use crate::schedule::calendar;
use crate::AppState;

fn parse_month(month: &str) -> Result<MonthKey, AppError> {
    MonthKey::parse(month)
        .ok_or_else(|| AppError::Validation(format!("Month {} must look like 6-2024", month)))
}

/// Resolve the acting member and the month key together.
fn member_and_month(session: &Session, month: &str) -> Result<(i64, MonthKey), AppError> {
    let member_id = session.member()?.id;
    Ok((member_id, parse_month(month)?))
}

/// GET /api/availability/:month
pub async fn list_availability(
    State(state): State<AppState>,
    session: Session,
    Path(month): Path<String>,
) -> ApiResult<Vec<Availability>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let (member_id, month) = match member_and_month(&session, &month) {
        Ok(resolved) => resolved,
        Err(e) => return error(e, revision_id),
    };

    match state.repo.list_availability(member_id, month).await {
        Ok(declarations) => success(declarations, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/availability/:month/sundays - The dates a declaration can be made for.
pub async fn month_sundays(
    State(state): State<AppState>,
    Path(month): Path<String>,
) -> ApiResult<Vec<NaiveDate>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match parse_month(&month) {
        Ok(month) => success(calendar::sundays_in_month(month), revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/availability/:month/:date
pub async fn set_availability(
    State(state): State<AppState>,
    session: Session,
    Path((month, date)): Path<(String, NaiveDate)>,
    Json(request): Json<SetAvailabilityRequest>,
) -> ApiResult<Availability> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let (member_id, month) = match member_and_month(&session, &month) {
        Ok(resolved) => resolved,
        Err(e) => return error(e, revision_id),
    };

    let result = state
        .repo
        .set_availability(
            member_id,
            month,
            date,
            &request.primary_teams,
            &request.secondary_teams,
        )
        .await;
    written(&state.repo, result, revision_id).await
}

/// DELETE /api/availability/:month/:date
pub async fn clear_availability(
    State(state): State<AppState>,
    session: Session,
    Path((month, date)): Path<(String, NaiveDate)>,
) -> ApiResult<Availability> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let (member_id, month) = match member_and_month(&session, &month) {
        Ok(resolved) => resolved,
        Err(e) => return error(e, revision_id),
    };

    let result = state.repo.clear_availability(member_id, month, date).await;
    written(&state.repo, result, revision_id).await
}
