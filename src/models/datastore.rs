//! Datastore snapshot: the persisted scheduling document as one payload.

use serde::{Deserialize, Serialize};

use super::{AssignmentMap, GeneralRequest, TransferRequest};

/// The root document containing the shared scheduling state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Datastore {
    pub schema_version: i32,
    pub generated_at: String,
    pub revision_id: i64,
    pub assignments: AssignmentMap,
    pub requests: Vec<TransferRequest>,
    pub general_requests: Vec<GeneralRequest>,
}

/// Revision information for change detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionInfo {
    pub revision_id: i64,
    pub generated_at: String,
}
