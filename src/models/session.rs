//! The acting principal of a request.

use serde::Serialize;

use super::{Member, TeamLeader};

/// Who is acting: a team leader (`admin`) or a registered member (`user`).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Principal {
    Admin(TeamLeader),
    User(Member),
}

impl Principal {
    pub fn as_leader(&self) -> Option<&TeamLeader> {
        match self {
            Principal::Admin(leader) => Some(leader),
            Principal::User(_) => None,
        }
    }

    pub fn as_member(&self) -> Option<&Member> {
        match self {
            Principal::User(member) => Some(member),
            Principal::Admin(_) => None,
        }
    }
}
