//! Team directory: the fixed set of teams and the leader assigned to each.

use serde::{Deserialize, Serialize};

/// A named volunteer function. The set is closed; there is no runtime mutation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TeamId {
    Usher,
    Greeter,
    Prayer,
    Music,
    Security,
    Strike,
    Hospitality,
}

impl TeamId {
    pub const ALL: [TeamId; 7] = [
        TeamId::Usher,
        TeamId::Greeter,
        TeamId::Prayer,
        TeamId::Music,
        TeamId::Security,
        TeamId::Strike,
        TeamId::Hospitality,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TeamId::Usher => "usher",
            TeamId::Greeter => "greeter",
            TeamId::Prayer => "prayer",
            TeamId::Music => "music",
            TeamId::Security => "security",
            TeamId::Strike => "strike",
            TeamId::Hospitality => "hospitality",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "usher" => Some(TeamId::Usher),
            "greeter" => Some(TeamId::Greeter),
            "prayer" => Some(TeamId::Prayer),
            "music" => Some(TeamId::Music),
            "security" => Some(TeamId::Security),
            "strike" => Some(TeamId::Strike),
            "hospitality" => Some(TeamId::Hospitality),
            _ => None,
        }
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single administrator authorized to mutate a team's assignments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TeamLeader {
    pub id: i64,
    pub name: String,
    pub team: TeamId,
    pub email: String,
}

struct LeaderEntry {
    id: i64,
    name: &'static str,
    team: TeamId,
    email: &'static str,
}

const LEADERS: [LeaderEntry; 7] = [
    LeaderEntry { id: 999, name: "Will Johnson", team: TeamId::Greeter, email: "admin@scc.com" },
    LeaderEntry { id: 998, name: "Music Leader", team: TeamId::Music, email: "music@scc.com" },
    LeaderEntry { id: 997, name: "Security Chief", team: TeamId::Security, email: "security@scc.com" },
    LeaderEntry { id: 996, name: "Hospitality Lead", team: TeamId::Hospitality, email: "hospitality@scc.com" },
    LeaderEntry { id: 995, name: "Usher Captain", team: TeamId::Usher, email: "usher@scc.com" },
    LeaderEntry { id: 994, name: "Prayer Coordinator", team: TeamId::Prayer, email: "prayer@scc.com" },
    LeaderEntry { id: 993, name: "Strike Team Lead", team: TeamId::Strike, email: "strike@scc.com" },
];

impl LeaderEntry {
    fn to_leader(&self) -> TeamLeader {
        TeamLeader {
            id: self.id,
            name: self.name.to_string(),
            team: self.team,
            email: self.email.to_string(),
        }
    }
}

/// The leader of `team`. Every team has exactly one.
pub fn leader_of(team: TeamId) -> TeamLeader {
    LEADERS
        .iter()
        .find(|entry| entry.team == team)
        .map(LeaderEntry::to_leader)
        .unwrap_or_else(|| TeamLeader {
            id: 0,
            name: "Unknown".to_string(),
            team,
            email: String::new(),
        })
}

/// Look up a leader by id.
pub fn leader_by_id(id: i64) -> Option<TeamLeader> {
    LEADERS
        .iter()
        .find(|entry| entry.id == id)
        .map(LeaderEntry::to_leader)
}

/// Whether `leader_id` leads `team`.
pub fn leads(leader_id: i64, team: TeamId) -> bool {
    LEADERS
        .iter()
        .any(|entry| entry.id == leader_id && entry.team == team)
}

/// How a member is affiliated with a team.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Affiliation {
    Primary,
    Secondary,
}

/// Per-team overview card.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamOverview {
    pub team: TeamId,
    pub leader: TeamLeader,
    pub primary_count: usize,
    pub secondary_count: usize,
}

/// A member as seen from one team's roster.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub member_id: i64,
    pub name: String,
    pub email: String,
    pub affiliation: Affiliation,
    pub other_teams: Vec<TeamId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_team_has_exactly_one_leader() {
        for team in TeamId::ALL {
            let count = LEADERS.iter().filter(|entry| entry.team == team).count();
            assert_eq!(count, 1, "team {team} should have one leader");
        }
    }

    #[test]
    fn leads_checks_team_membership() {
        assert!(leads(999, TeamId::Greeter));
        assert!(!leads(999, TeamId::Usher));
        assert!(!leads(12345, TeamId::Greeter));
    }

    #[test]
    fn leader_lookup() {
        assert_eq!(leader_of(TeamId::Usher).name, "Usher Captain");
        assert_eq!(leader_by_id(998).map(|l| l.team), Some(TeamId::Music));
        assert!(leader_by_id(1).is_none());
    }

    #[test]
    fn team_id_round_trips_through_str() {
        for team in TeamId::ALL {
            assert_eq!(TeamId::from_str(team.as_str()), Some(team));
        }
        assert_eq!(TeamId::from_str("choir"), None);
        assert_eq!(serde_json::to_string(&TeamId::Hospitality).unwrap(), "\"hospitality\"");
    }
}
