//! Team directory endpoints.

use axum::extract::{Path, State};

use super::{error, success, ApiResult};
use crate::models::{RosterEntry, TeamId, TeamOverview};
use crate::AppState;

/// GET /api/teams - Every team with its leader and member counts.
pub async fn list_teams(State(state): State<AppState>) -> ApiResult<Vec<TeamOverview>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.team_overviews().await {
        Ok(teams) => success(teams, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/teams/:team/members - Members who opted into a team.
pub async fn get_team_roster(
    State(state): State<AppState>,
    Path(team): Path<TeamId>,
) -> ApiResult<Vec<RosterEntry>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.team_roster(team).await {
        Ok(roster) => success(roster, revision_id),
        Err(e) => error(e, revision_id),
    }
}
