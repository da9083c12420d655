//! Assignment store model.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::TeamId;

/// Assigned member ids per team for a single date, in insertion order.
pub type DaySchedule = BTreeMap<TeamId, Vec<i64>>;

/// The whole schedule keyed by ISO date, as persisted in the datastore document.
pub type AssignmentMap = BTreeMap<NaiveDate, DaySchedule>;

/// Where a member currently sits on a given date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentLookup {
    pub team: TeamId,
    pub leader_name: String,
}

/// Request body for assigning a member to a team on a date.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    pub member_id: i64,
}

/// A member who may be assigned to a team on a date.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub member_id: i64,
    pub name: String,
    pub affiliation: super::Affiliation,
}
