//! Member registry model.

use serde::{Deserialize, Serialize};

use super::TeamId;

/// Lifecycle status of a member record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Active,
    Inactive,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Active => "active",
            MemberStatus::Inactive => "inactive",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(MemberStatus::Active),
            "inactive" => Some(MemberStatus::Inactive),
            _ => None,
        }
    }
}

/// A registered volunteer and their declared team affiliations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub primary_teams: Vec<TeamId>,
    pub secondary_teams: Vec<TeamId>,
    pub status: MemberStatus,
    pub created_at: String,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Whether the member opted into `team` at either tier.
    pub fn is_affiliated(&self, team: TeamId) -> bool {
        self.primary_teams.contains(&team) || self.secondary_teams.contains(&team)
    }
}

/// Request body for signing up.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterMemberRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub primary_teams: Vec<TeamId>,
    #[serde(default)]
    pub secondary_teams: Vec<TeamId>,
}

/// Request body for a member changing their own affiliations.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeamsRequest {
    pub primary_teams: Vec<TeamId>,
    pub secondary_teams: Vec<TeamId>,
}
