//! Transfer and general request models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::TeamId;

/// Lifecycle of a transfer request. `Approved` and `Denied` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Denied,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Denied => "denied",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(RequestStatus::Pending),
            "approved" => Some(RequestStatus::Approved),
            "denied" => Some(RequestStatus::Denied),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

/// A leader-to-leader request to move an assigned member between teams for one date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub id: String,
    pub member_id: i64,
    pub member_name: String,
    pub from_team: TeamId,
    pub to_team: TeamId,
    /// Leader of `from_team` at the time the request was made
    pub from_leader_name: String,
    pub requesting_leader_id: i64,
    pub to_leader_name: String,
    pub date: NaiveDate,
    pub message: String,
    pub status: RequestStatus,
    pub created_at: String,
}

/// Request body for proposing a transfer into the caller's own team.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposeTransferRequest {
    pub member_id: i64,
    pub from_team: TeamId,
    pub date: NaiveDate,
    #[serde(default)]
    pub message: String,
}

/// Broadcast "need more volunteers" notice. Purely informational.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralRequest {
    pub id: String,
    pub team: TeamId,
    pub requesting_leader_name: String,
    pub message: String,
    pub created_at: String,
}

/// Request body for posting a general request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostGeneralRequest {
    pub message: String,
}
