//! Team selection rules for availability declarations and member affiliations.

use std::collections::HashSet;

use crate::errors::AppError;
use crate::models::TeamId;

/// Most primary teams a member may declare for one date.
pub const MAX_PRIMARY_TEAMS: usize = 2;

/// Validate an availability declaration.
///
/// Legal shapes are 0-2 primary teams with no secondary teams, or at most one primary team
/// with any number of secondary teams. A team may not appear on both tiers.
pub fn validate_availability(primary: &[TeamId], secondary: &[TeamId]) -> Result<(), AppError> {
    if primary.len() > MAX_PRIMARY_TEAMS {
        return Err(AppError::InvalidSelection(format!(
            "At most {} primary teams may be selected",
            MAX_PRIMARY_TEAMS
        )));
    }
    if primary.len() > 1 && !secondary.is_empty() {
        return Err(AppError::InvalidSelection(
            "Select up to 2 primary teams, or 1 primary team plus secondary teams".to_string(),
        ));
    }
    if let Some(team) = overlap(primary, secondary) {
        return Err(AppError::InvalidSelection(format!(
            "Team {} cannot be both primary and secondary",
            team
        )));
    }
    Ok(())
}

/// Validate a member's registered affiliations.
pub fn validate_affiliations(primary: &[TeamId], secondary: &[TeamId]) -> Result<(), AppError> {
    match overlap(primary, secondary) {
        Some(team) => Err(AppError::Validation(format!(
            "Team {} cannot be both primary and secondary",
            team
        ))),
        None => Ok(()),
    }
}

/// Drop repeated teams while keeping first-seen order.
pub fn dedup(teams: &[TeamId]) -> Vec<TeamId> {
    let mut seen = HashSet::new();
    teams.iter().copied().filter(|t| seen.insert(*t)).collect()
}

fn overlap(primary: &[TeamId], secondary: &[TeamId]) -> Option<TeamId> {
    primary.iter().copied().find(|t| secondary.contains(t))
}
