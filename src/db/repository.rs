//! Database repository for the scheduling store.
//!
//! Every mutation runs in one transaction and bumps the revision inside it. Writes that
//! guard an invariant are issued first in their transaction so SQLite takes the write lock
//! before any dependent read.

use chrono::{NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::team::{self, leads};
use crate::models::{
    Affiliation, AssignmentLookup, AssignmentMap, Availability, Candidate, Datastore, DaySchedule,
    GeneralRequest, Member, MemberStatus, MonthKey, ProposeTransferRequest, RegisterMemberRequest,
    RequestStatus, RevisionInfo, RosterEntry, TeamId, TeamLeader, TeamOverview, TransferRequest,
    UpdateTeamsRequest,
};
use crate::schedule::selection::{dedup, validate_availability};
use crate::schedule::transfer::{check_eligibility, transition, Resolution};

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the current revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }

    /// Get revision info.
    pub async fn get_revision_info(&self) -> Result<RevisionInfo, AppError> {
        let row = sqlx::query("SELECT revision_id, generated_at FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(RevisionInfo {
            revision_id: row.get("revision_id"),
            generated_at: row.get("generated_at"),
        })
    }

    /// Get the full datastore.
    pub async fn get_datastore(&self) -> Result<Datastore, AppError> {
        let meta =
            sqlx::query("SELECT schema_version, revision_id, generated_at FROM meta WHERE id = 1")
                .fetch_one(&self.pool)
                .await?;

        let assignments = self.all_assignments().await?;
        let requests = self.list_transfers().await?;
        let general_requests = self.list_general_requests().await?;

        Ok(Datastore {
            schema_version: meta.get("schema_version"),
            revision_id: meta.get("revision_id"),
            generated_at: meta.get("generated_at"),
            assignments,
            requests,
            general_requests,
        })
    }

    // ==================== MEMBER OPERATIONS ====================

    /// List all members.
    pub async fn list_members(&self) -> Result<Vec<Member>, AppError> {
        let rows = sqlx::query(
            "SELECT id, first_name, last_name, email, primary_teams, secondary_teams, status, created_at FROM members ORDER BY id"
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(member_from_row).collect()
    }

    /// Get a member by ID.
    pub async fn get_member(&self, id: i64) -> Result<Option<Member>, AppError> {
        let row = sqlx::query(
            "SELECT id, first_name, last_name, email, primary_teams, secondary_teams, status, created_at FROM members WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(member_from_row).transpose()
    }

    async fn require_member(&self, id: i64) -> Result<Member, AppError> {
        self.get_member(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member {} not found", id)))
    }

    /// Register a new member.
    pub async fn register_member(&self, request: &RegisterMemberRequest) -> Result<Member, AppError> {
        let now = Utc::now().to_rfc3339();
        let primary_teams = dedup(&request.primary_teams);
        let secondary_teams = dedup(&request.secondary_teams);
        let email = request.email.trim().to_string();

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO members (first_name, last_name, email, primary_teams, secondary_teams, status, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(request.first_name.trim())
        .bind(request.last_name.trim())
        .bind(&email)
        .bind(teams_json(&primary_teams))
        .bind(teams_json(&secondary_teams))
        .bind(MemberStatus::Active.as_str())
        .bind(&now)
        .execute(&mut *tx)
        .await;

        let result = match result {
            Ok(result) => result,
            Err(err) if is_unique_violation(&err) => {
                return Err(AppError::Validation(format!(
                    "Email {} is already registered",
                    email
                )));
            }
            Err(err) => return Err(err.into()),
        };

        bump_revision(&mut tx).await?;
        tx.commit().await?;

        let id = result.last_insert_rowid();
        tracing::info!(member_id = id, "Member registered");

        Ok(Member {
            id,
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            email,
            primary_teams,
            secondary_teams,
            status: MemberStatus::Active,
            created_at: now,
        })
    }

    /// Replace a member's declared affiliations.
    pub async fn update_member_teams(
        &self,
        id: i64,
        request: &UpdateTeamsRequest,
    ) -> Result<Member, AppError> {
        let existing = self.require_member(id).await?;
        let primary_teams = dedup(&request.primary_teams);
        let secondary_teams = dedup(&request.secondary_teams);

        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE members SET primary_teams = ?, secondary_teams = ? WHERE id = ?")
            .bind(teams_json(&primary_teams))
            .bind(teams_json(&secondary_teams))
            .bind(id)
            .execute(&mut *tx)
            .await?;
        bump_revision(&mut tx).await?;
        tx.commit().await?;

        tracing::info!(member_id = id, "Member teams updated");

        Ok(Member {
            primary_teams,
            secondary_teams,
            ..existing
        })
    }

    /// Per-team overview with primary and secondary member counts.
    pub async fn team_overviews(&self) -> Result<Vec<TeamOverview>, AppError> {
        let members = self.list_members().await?;
        Ok(TeamId::ALL
            .iter()
            .map(|&team| TeamOverview {
                team,
                leader: team::leader_of(team),
                primary_count: members
                    .iter()
                    .filter(|m| m.primary_teams.contains(&team))
                    .count(),
                secondary_count: members
                    .iter()
                    .filter(|m| m.secondary_teams.contains(&team))
                    .count(),
            })
            .collect())
    }

    /// Members affiliated with `team`.
    pub async fn team_roster(&self, team: TeamId) -> Result<Vec<RosterEntry>, AppError> {
        let members = self.list_members().await?;
        Ok(members
            .into_iter()
            .filter(|m| m.is_affiliated(team))
            .map(|m| RosterEntry {
                member_id: m.id,
                name: m.full_name(),
                affiliation: affiliation_of(&m, team),
                other_teams: m
                    .primary_teams
                    .iter()
                    .chain(m.secondary_teams.iter())
                    .copied()
                    .filter(|t| *t != team)
                    .collect(),
                email: m.email,
            })
            .collect())
    }

    // ==================== ASSIGNMENT OPERATIONS ====================

    /// Find the team a member is assigned to on `date`, if any.
    pub async fn lookup(
        &self,
        member_id: i64,
        date: NaiveDate,
    ) -> Result<Option<AssignmentLookup>, AppError> {
        let mut conn = self.pool.acquire().await?;
        lookup_on(&mut conn, member_id, date).await
    }

    /// Assign a member to `team` for `date`.
    ///
    /// Fails with `AlreadyAssignedElsewhere` when the member already holds any assignment
    /// on that date, including one on `team` itself.
    pub async fn assign(
        &self,
        member_id: i64,
        team: TeamId,
        date: NaiveDate,
    ) -> Result<DaySchedule, AppError> {
        self.require_member(member_id).await?;

        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query("INSERT INTO assignments (date, team, member_id) VALUES (?, ?, ?)")
            .bind(date)
            .bind(team.as_str())
            .bind(member_id)
            .execute(&mut *tx)
            .await;

        if let Err(err) = inserted {
            if !is_unique_violation(&err) {
                return Err(err.into());
            }
            let existing = lookup_on(&mut tx, member_id, date).await?;
            tracing::debug!(member_id, %team, %date, "Assignment rejected: already assigned");
            return Err(match existing {
                Some(found) => AppError::AlreadyAssignedElsewhere {
                    team: found.team,
                    leader_name: found.leader_name,
                },
                None => AppError::Internal("Assignment conflict without a holder".to_string()),
            });
        }

        bump_revision(&mut tx).await?;
        tx.commit().await?;

        tracing::info!(member_id, %team, %date, "Member assigned");
        self.day_schedule(date).await
    }

    /// Remove a member from `team` on `date`. Only the team's leader may do this.
    pub async fn remove(
        &self,
        member_id: i64,
        team: TeamId,
        date: NaiveDate,
        requesting_leader_id: i64,
    ) -> Result<DaySchedule, AppError> {
        if !leads(requesting_leader_id, team) {
            tracing::debug!(requesting_leader_id, %team, "Removal rejected: not the team leader");
            return Err(AppError::NotAuthorized(
                "You can only remove members from your own team".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;
        let result =
            sqlx::query("DELETE FROM assignments WHERE date = ? AND team = ? AND member_id = ?")
                .bind(date)
                .bind(team.as_str())
                .bind(member_id)
                .execute(&mut *tx)
                .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            bump_revision(&mut tx).await?;
        }
        tx.commit().await?;

        if removed {
            tracing::info!(member_id, %team, %date, "Member removed");
        } else {
            tracing::debug!(member_id, %team, %date, "Removal skipped: member not on the list");
        }
        self.day_schedule(date).await
    }

    /// Assigned member ids per team for `date`.
    pub async fn day_schedule(&self, date: NaiveDate) -> Result<DaySchedule, AppError> {
        let rows = sqlx::query("SELECT team, member_id FROM assignments WHERE date = ? ORDER BY seq")
            .bind(date)
            .fetch_all(&self.pool)
            .await?;

        let mut schedule = DaySchedule::new();
        for row in &rows {
            let team = team_column(row, "team")?;
            schedule.entry(team).or_default().push(row.get("member_id"));
        }
        Ok(schedule)
    }

    /// The whole schedule, keyed by date then team.
    pub async fn all_assignments(&self) -> Result<AssignmentMap, AppError> {
        let rows = sqlx::query("SELECT date, team, member_id FROM assignments ORDER BY seq")
            .fetch_all(&self.pool)
            .await?;

        let mut map = AssignmentMap::new();
        for row in &rows {
            let date: NaiveDate = row.try_get("date")?;
            let team = team_column(row, "team")?;
            map.entry(date)
                .or_default()
                .entry(team)
                .or_default()
                .push(row.get("member_id"));
        }
        Ok(map)
    }

    /// Members who opted into `team` and are still free on `date`.
    pub async fn candidates(
        &self,
        team: TeamId,
        date: NaiveDate,
    ) -> Result<Vec<Candidate>, AppError> {
        let rows = sqlx::query(
            r#"SELECT id, first_name, last_name, email, primary_teams, secondary_teams, status, created_at
               FROM members
               WHERE status = 'active'
                 AND id NOT IN (SELECT member_id FROM assignments WHERE date = ?)
               ORDER BY id"#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        let mut candidates = Vec::new();
        for row in &rows {
            let member = member_from_row(row)?;
            if member.is_affiliated(team) {
                candidates.push(Candidate {
                    member_id: member.id,
                    name: member.full_name(),
                    affiliation: affiliation_of(&member, team),
                });
            }
        }
        Ok(candidates)
    }

    // ==================== TRANSFER REQUEST OPERATIONS ====================

    /// List every transfer request, oldest first.
    pub async fn list_transfers(&self) -> Result<Vec<TransferRequest>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM transfer_requests ORDER BY created_at, rowid",
            TRANSFER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(transfer_from_row).collect()
    }

    /// Get a transfer request by ID.
    pub async fn get_transfer(&self, id: &str) -> Result<Option<TransferRequest>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM transfer_requests WHERE id = ?",
            TRANSFER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(transfer_from_row).transpose()
    }

    /// Pending requests asking for members of `team`.
    pub async fn incoming_transfers(&self, team: TeamId) -> Result<Vec<TransferRequest>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM transfer_requests WHERE from_team = ? AND status = 'pending' ORDER BY created_at, rowid",
            TRANSFER_COLUMNS
        ))
        .bind(team.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(transfer_from_row).collect()
    }

    /// Every request made into `team`, newest first.
    pub async fn outgoing_transfers(&self, team: TeamId) -> Result<Vec<TransferRequest>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM transfer_requests WHERE to_team = ? ORDER BY created_at DESC, rowid DESC",
            TRANSFER_COLUMNS
        ))
        .bind(team.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(transfer_from_row).collect()
    }

    /// Propose moving a member from `from_team` into the requesting leader's team.
    pub async fn propose_transfer(
        &self,
        leader: &TeamLeader,
        request: &ProposeTransferRequest,
    ) -> Result<TransferRequest, AppError> {
        let member = self.require_member(request.member_id).await?;
        let assigned = self.lookup(member.id, request.date).await?;
        check_eligibility(
            &member,
            assigned.map(|found| found.team),
            request.from_team,
            leader.team,
        )?;

        let transfer = TransferRequest {
            id: uuid::Uuid::new_v4().to_string(),
            member_id: member.id,
            member_name: member.full_name(),
            from_team: request.from_team,
            to_team: leader.team,
            from_leader_name: team::leader_of(request.from_team).name,
            requesting_leader_id: leader.id,
            to_leader_name: leader.name.clone(),
            date: request.date,
            message: request.message.trim().to_string(),
            status: RequestStatus::Pending,
            created_at: Utc::now().to_rfc3339(),
        };

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"INSERT INTO transfer_requests (
                id, member_id, member_name, from_team, to_team, from_leader_name,
                requesting_leader_id, to_leader_name, date, message, status, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&transfer.id)
        .bind(transfer.member_id)
        .bind(&transfer.member_name)
        .bind(transfer.from_team.as_str())
        .bind(transfer.to_team.as_str())
        .bind(&transfer.from_leader_name)
        .bind(transfer.requesting_leader_id)
        .bind(&transfer.to_leader_name)
        .bind(transfer.date)
        .bind(&transfer.message)
        .bind(transfer.status.as_str())
        .bind(&transfer.created_at)
        .execute(&mut *tx)
        .await?;
        bump_revision(&mut tx).await?;
        tx.commit().await?;

        tracing::info!(
            request_id = %transfer.id,
            member_id = transfer.member_id,
            from_team = %transfer.from_team,
            to_team = %transfer.to_team,
            date = %transfer.date,
            "Transfer proposed"
        );

        Ok(transfer)
    }

    /// Approve a pending request and move the member in the same transaction.
    pub async fn approve_transfer(
        &self,
        id: &str,
        approving_leader_id: i64,
    ) -> Result<TransferRequest, AppError> {
        self.resolve_transfer(id, approving_leader_id, Resolution::Approve)
            .await
    }

    /// Deny a pending request. The schedule is untouched.
    pub async fn deny_transfer(
        &self,
        id: &str,
        denying_leader_id: i64,
    ) -> Result<TransferRequest, AppError> {
        self.resolve_transfer(id, denying_leader_id, Resolution::Deny)
            .await
    }

    async fn resolve_transfer(
        &self,
        id: &str,
        leader_id: i64,
        resolution: Resolution,
    ) -> Result<TransferRequest, AppError> {
        let existing = self
            .get_transfer(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Request {} not found", id)))?;

        if !leads(leader_id, existing.from_team) {
            tracing::debug!(request_id = id, leader_id, "Resolution rejected: not the owning leader");
            return Err(AppError::NotAuthorized(
                "Only the leader of the member's current team can resolve this request"
                    .to_string(),
            ));
        }
        let target = transition(existing.status, resolution)?;

        let mut tx = self.pool.begin().await?;

        // Conditional flip first: of two concurrent resolutions only one sees a pending row.
        let flipped =
            sqlx::query("UPDATE transfer_requests SET status = ? WHERE id = ? AND status = 'pending'")
                .bind(target.as_str())
                .bind(id)
                .execute(&mut *tx)
                .await?;

        if flipped.rows_affected() == 0 {
            let current: String = sqlx::query("SELECT status FROM transfer_requests WHERE id = ?")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?
                .get("status");
            let status = RequestStatus::from_str(&current).unwrap_or(target);
            return Err(AppError::InvalidState {
                message: format!("Request is already {}", status.as_str()),
                status,
            });
        }

        if resolution == Resolution::Approve {
            move_member(&mut tx, &existing).await?;
        }

        bump_revision(&mut tx).await?;
        tx.commit().await?;

        tracing::info!(
            request_id = id,
            member_id = existing.member_id,
            status = target.as_str(),
            "Transfer resolved"
        );

        Ok(TransferRequest {
            status: target,
            ..existing
        })
    }

    // ==================== GENERAL REQUEST OPERATIONS ====================

    /// List general requests, newest first.
    pub async fn list_general_requests(&self) -> Result<Vec<GeneralRequest>, AppError> {
        let rows = sqlx::query(
            "SELECT id, team, requesting_leader_name, message, created_at FROM general_requests ORDER BY created_at DESC, rowid DESC"
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<GeneralRequest, AppError> {
                Ok(GeneralRequest {
                    id: row.get("id"),
                    team: team_column(row, "team")?,
                    requesting_leader_name: row.get("requesting_leader_name"),
                    message: row.get("message"),
                    created_at: row.get("created_at"),
                })
            })
            .collect()
    }

    /// Broadcast a need for volunteers on the leader's team.
    pub async fn post_general_request(
        &self,
        leader: &TeamLeader,
        message: &str,
    ) -> Result<GeneralRequest, AppError> {
        let general = GeneralRequest {
            id: uuid::Uuid::new_v4().to_string(),
            team: leader.team,
            requesting_leader_name: leader.name.clone(),
            message: message.trim().to_string(),
            created_at: Utc::now().to_rfc3339(),
        };

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO general_requests (id, team, requesting_leader_name, message, created_at) VALUES (?, ?, ?, ?, ?)"
        )
        .bind(&general.id)
        .bind(general.team.as_str())
        .bind(&general.requesting_leader_name)
        .bind(&general.message)
        .bind(&general.created_at)
        .execute(&mut *tx)
        .await?;
        bump_revision(&mut tx).await?;
        tx.commit().await?;

        tracing::info!(request_id = %general.id, team = %general.team, "General request posted");
        Ok(general)
    }

    // ==================== AVAILABILITY OPERATIONS ====================

    /// Overwrite a member's declaration for `date`.
    pub async fn set_availability(
        &self,
        member_id: i64,
        month: MonthKey,
        date: NaiveDate,
        primary_teams: &[TeamId],
        secondary_teams: &[TeamId],
    ) -> Result<Availability, AppError> {
        let primary_teams = dedup(primary_teams);
        let secondary_teams = dedup(secondary_teams);
        validate_availability(&primary_teams, &secondary_teams)?;
        if !month.contains(date) {
            return Err(AppError::Validation(format!(
                "Date {} is not in month {}",
                date, month
            )));
        }

        let availability = Availability {
            member_id,
            month: month.to_string(),
            date,
            primary_teams,
            secondary_teams,
            updated_at: Utc::now().to_rfc3339(),
        };

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"INSERT INTO availability (member_id, month, date, primary_teams, secondary_teams, updated_at)
               VALUES (?, ?, ?, ?, ?, ?)
               ON CONFLICT (member_id, date) DO UPDATE SET
                   month = excluded.month,
                   primary_teams = excluded.primary_teams,
                   secondary_teams = excluded.secondary_teams,
                   updated_at = excluded.updated_at"#,
        )
        .bind(availability.member_id)
        .bind(&availability.month)
        .bind(availability.date)
        .bind(teams_json(&availability.primary_teams))
        .bind(teams_json(&availability.secondary_teams))
        .bind(&availability.updated_at)
        .execute(&mut *tx)
        .await?;
        bump_revision(&mut tx).await?;
        tx.commit().await?;

        tracing::info!(member_id, %date, "Availability set");
        Ok(availability)
    }

    /// Reset a member's declaration for `date` to no teams.
    pub async fn clear_availability(
        &self,
        member_id: i64,
        month: MonthKey,
        date: NaiveDate,
    ) -> Result<Availability, AppError> {
        self.set_availability(member_id, month, date, &[], &[]).await
    }

    /// A member's declarations within `month`, by date.
    pub async fn list_availability(
        &self,
        member_id: i64,
        month: MonthKey,
    ) -> Result<Vec<Availability>, AppError> {
        let rows = sqlx::query(
            "SELECT member_id, month, date, primary_teams, secondary_teams, updated_at FROM availability WHERE member_id = ? AND month = ? ORDER BY date"
        )
        .bind(member_id)
        .bind(month.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<Availability, AppError> {
                Ok(Availability {
                    member_id: row.get("member_id"),
                    month: row.get("month"),
                    date: row.try_get("date")?,
                    primary_teams: parse_teams(row.get("primary_teams")),
                    secondary_teams: parse_teams(row.get("secondary_teams")),
                    updated_at: row.get("updated_at"),
                })
            })
            .collect()
    }
}

const TRANSFER_COLUMNS: &str = "id, member_id, member_name, from_team, to_team, from_leader_name, requesting_leader_id, to_leader_name, date, message, status, created_at";

/// Apply an approved transfer to the schedule.
///
/// Fails with `AlreadyAssignedElsewhere` if, once off `from_team`, the member still holds a
/// slot on some team other than `to_team` for that date.
async fn move_member(
    conn: &mut SqliteConnection,
    transfer: &TransferRequest,
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM assignments WHERE date = ? AND team = ? AND member_id = ?")
        .bind(transfer.date)
        .bind(transfer.from_team.as_str())
        .bind(transfer.member_id)
        .execute(&mut *conn)
        .await?;

    match lookup_on(conn, transfer.member_id, transfer.date).await? {
        Some(found) if found.team == transfer.to_team => Ok(()),
        Some(found) => {
            tracing::debug!(
                request_id = %transfer.id,
                team = %found.team,
                "Approval rejected: member reassigned since proposal"
            );
            Err(AppError::AlreadyAssignedElsewhere {
                team: found.team,
                leader_name: found.leader_name,
            })
        }
        None => {
            sqlx::query("INSERT INTO assignments (date, team, member_id) VALUES (?, ?, ?)")
                .bind(transfer.date)
                .bind(transfer.to_team.as_str())
                .bind(transfer.member_id)
                .execute(&mut *conn)
                .await?;
            Ok(())
        }
    }
}

async fn lookup_on(
    conn: &mut SqliteConnection,
    member_id: i64,
    date: NaiveDate,
) -> Result<Option<AssignmentLookup>, AppError> {
    let row = sqlx::query("SELECT team FROM assignments WHERE date = ? AND member_id = ? ORDER BY seq LIMIT 1")
        .bind(date)
        .bind(member_id)
        .fetch_optional(&mut *conn)
        .await?;

    row.as_ref()
        .map(|row| -> Result<AssignmentLookup, AppError> {
            let team = team_column(row, "team")?;
            Ok(AssignmentLookup {
                team,
                leader_name: team::leader_of(team).name,
            })
        })
        .transpose()
}

async fn bump_revision(conn: &mut SqliteConnection) -> Result<(), AppError> {
    let now = Utc::now().to_rfc3339();
    sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
        .bind(&now)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

fn affiliation_of(member: &Member, team: TeamId) -> Affiliation {
    if member.primary_teams.contains(&team) {
        Affiliation::Primary
    } else {
        Affiliation::Secondary
    }
}

// Helper functions for row conversion

fn member_from_row(row: &SqliteRow) -> Result<Member, AppError> {
    let status: String = row.get("status");
    Ok(Member {
        id: row.get("id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
        primary_teams: parse_teams(row.get("primary_teams")),
        secondary_teams: parse_teams(row.get("secondary_teams")),
        status: MemberStatus::from_str(&status)
            .ok_or_else(|| AppError::Internal(format!("Unknown member status {}", status)))?,
        created_at: row.get("created_at"),
    })
}

fn transfer_from_row(row: &SqliteRow) -> Result<TransferRequest, AppError> {
    let status: String = row.get("status");
    Ok(TransferRequest {
        id: row.get("id"),
        member_id: row.get("member_id"),
        member_name: row.get("member_name"),
        from_team: team_column(row, "from_team")?,
        to_team: team_column(row, "to_team")?,
        from_leader_name: row.get("from_leader_name"),
        requesting_leader_id: row.get("requesting_leader_id"),
        to_leader_name: row.get("to_leader_name"),
        date: row.try_get("date")?,
        message: row.get("message"),
        status: RequestStatus::from_str(&status)
            .ok_or_else(|| AppError::Internal(format!("Unknown request status {}", status)))?,
        created_at: row.get("created_at"),
    })
}

fn team_column(row: &SqliteRow, column: &str) -> Result<TeamId, AppError> {
    let value: String = row.try_get(column)?;
    TeamId::from_str(&value).ok_or_else(|| AppError::Internal(format!("Unknown team {}", value)))
}

fn teams_json(teams: &[TeamId]) -> String {
    serde_json::to_string(teams).unwrap_or_else(|_| "[]".to_string())
}

fn parse_teams(s: &str) -> Vec<TeamId> {
    serde_json::from_str(s).unwrap_or_default()
}
