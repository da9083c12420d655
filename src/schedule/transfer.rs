//! Transfer request state machine and proposal eligibility.

use crate::errors::AppError;
use crate::models::{Member, RequestStatus, TeamId};

/// What a leader does to a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Approve,
    Deny,
}

impl Resolution {
    pub fn target(&self) -> RequestStatus {
        match self {
            Resolution::Approve => RequestStatus::Approved,
            Resolution::Deny => RequestStatus::Denied,
        }
    }
}

/// Compute the next status. Only `Pending` may move; terminal states are immutable.
pub fn transition(current: RequestStatus, resolution: Resolution) -> Result<RequestStatus, AppError> {
    if current.is_terminal() {
        return Err(AppError::InvalidState {
            message: format!("Request is already {}", current.as_str()),
            status: current,
        });
    }
    Ok(resolution.target())
}

/// Check that `member`, currently on `assigned_team` for the date, may be requested from
/// `from_team` into `to_team`.
pub fn check_eligibility(
    member: &Member,
    assigned_team: Option<TeamId>,
    from_team: TeamId,
    to_team: TeamId,
) -> Result<(), AppError> {
    if from_team == to_team {
        return Err(AppError::Validation(
            "Cannot request a member from your own team".to_string(),
        ));
    }
    if assigned_team != Some(from_team) {
        return Err(AppError::Validation(format!(
            "{} is not assigned to {} on that date",
            member.full_name(),
            from_team
        )));
    }
    if !member.is_affiliated(to_team) {
        return Err(AppError::Validation(format!(
            "{} has not opted into {}",
            member.full_name(),
            to_team
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MemberStatus;

    fn member(primary: Vec<TeamId>, secondary: Vec<TeamId>) -> Member {
        Member {
            id: 1,
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: "john.doe@test.com".to_string(),
            primary_teams: primary,
            secondary_teams: secondary,
            status: MemberStatus::Active,
            created_at: String::new(),
        }
    }

    #[test]
    fn pending_moves_to_either_terminal_state() {
        assert_eq!(
            transition(RequestStatus::Pending, Resolution::Approve).unwrap(),
            RequestStatus::Approved
        );
        assert_eq!(
            transition(RequestStatus::Pending, Resolution::Deny).unwrap(),
            RequestStatus::Denied
        );
    }

    #[test]
    fn terminal_states_do_not_move() {
        for status in [RequestStatus::Approved, RequestStatus::Denied] {
            for resolution in [Resolution::Approve, Resolution::Deny] {
                let err = transition(status, resolution).unwrap_err();
                assert_eq!(err.error_code(), "INVALID_STATE");
            }
        }
    }

    #[test]
    fn eligible_when_assigned_and_opted_in() {
        let m = member(vec![TeamId::Usher, TeamId::Greeter], vec![TeamId::Prayer]);
        assert!(check_eligibility(&m, Some(TeamId::Greeter), TeamId::Greeter, TeamId::Usher).is_ok());
        assert!(check_eligibility(&m, Some(TeamId::Greeter), TeamId::Greeter, TeamId::Prayer).is_ok());
    }

    #[test]
    fn not_eligible_for_unchosen_team() {
        let m = member(vec![TeamId::Greeter], vec![]);
        let err = check_eligibility(&m, Some(TeamId::Greeter), TeamId::Greeter, TeamId::Music)
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn not_eligible_when_not_on_from_team() {
        let m = member(vec![TeamId::Greeter, TeamId::Usher], vec![]);
        assert!(check_eligibility(&m, None, TeamId::Greeter, TeamId::Usher).is_err());
        assert!(check_eligibility(&m, Some(TeamId::Music), TeamId::Greeter, TeamId::Usher).is_err());
    }

    #[test]
    fn not_eligible_into_same_team() {
        let m = member(vec![TeamId::Greeter], vec![]);
        assert!(check_eligibility(&m, Some(TeamId::Greeter), TeamId::Greeter, TeamId::Greeter).is_err());
    }
}
