//! Data models for the volunteer scheduler.
//!
//! Wire names are camelCase to match the persisted document consumed by the dashboard.

mod availability;
mod datastore;
mod member;
mod request;
mod schedule;
mod session;
pub mod team;

pub use availability::*;
pub use datastore::*;
pub use member::*;
pub use request::*;
pub use schedule::*;
pub use session::*;
pub use team::{Affiliation, RosterEntry, TeamId, TeamLeader, TeamOverview};
