//! Review session database operations
//!
//! Two tables back a review:
//! - `review_lifecycle`: Active/Ended state of started sessions
//! - `review_sessions`: append-only archive of ended transcripts
//!
//! Archiving is the single place a concept's progress status is written.

use chrono::{DateTime, Utc};
use feynman_common::db::{AudienceLevel, ProgressStatus, ReviewSessionRecord};
use feynman_common::{time, uuid_utils, Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::{ReviewLifecycle, SessionState};

/// Outcome of an archive attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveOutcome {
    /// Record stored, concept updated, lifecycle ended
    Archived,
    /// Lifecycle was not Active (already ended or gone); nothing written
    NotActive,
}

/// Outcome of reserving a turn against the per-session ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnClaim {
    /// Counter incremented; the caller may serve the turn
    Claimed,
    /// Session is Active but already served `max_turns` turns
    LimitReached,
    /// Lifecycle is missing or no longer Active
    NotActive,
}

fn lifecycle_from_row(row: &SqliteRow) -> Result<ReviewLifecycle> {
    let id: String = row.get("id");
    let concept_id: String = row.get("concept_id");
    let audience_level: String = row.get("audience_level");
    let state: String = row.get("state");
    let started_at: String = row.get("started_at");

    Ok(ReviewLifecycle {
        session_id: uuid_utils::from_db("review_lifecycle.id", &id)?,
        concept_id: uuid_utils::from_db("review_lifecycle.concept_id", &concept_id)?,
        audience_level: audience_level.parse::<AudienceLevel>()?,
        state: state.parse::<SessionState>()?,
        turns: row.get("turns"),
        started_at: time::from_db("review_lifecycle.started_at", &started_at)?,
        ended_at: time::from_db_opt("review_lifecycle.ended_at", row.get("ended_at"))?,
    })
}

fn record_from_row(row: &SqliteRow) -> Result<ReviewSessionRecord> {
    let id: String = row.get("id");
    let concept_id: String = row.get("concept_id");
    let audience_level: String = row.get("audience_level");
    let transcript: String = row.get("transcript");
    let feedback: Option<String> = row.get("feedback");
    let created_at: String = row.get("created_at");

    Ok(ReviewSessionRecord {
        id: uuid_utils::from_db("review_sessions.id", &id)?,
        concept_id: uuid_utils::from_db("review_sessions.concept_id", &concept_id)?,
        audience_level: audience_level.parse::<AudienceLevel>()?,
        transcript: serde_json::from_str(&transcript)?,
        feedback: feedback.map(|f| serde_json::from_str(&f)).transpose()?,
        created_at: time::from_db("review_sessions.created_at", &created_at)?,
    })
}

/// Store the lifecycle of a freshly started session
pub async fn insert_lifecycle(pool: &SqlitePool, lifecycle: &ReviewLifecycle) -> Result<()> {
    if !SessionState::NotStarted.can_transition_to(lifecycle.state) {
        return Err(Error::Internal(format!(
            "Refusing to store lifecycle in state {}",
            lifecycle.state
        )));
    }

    sqlx::query(
        r#"
        INSERT INTO review_lifecycle (id, concept_id, audience_level, state, started_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(lifecycle.session_id.to_string())
    .bind(lifecycle.concept_id.to_string())
    .bind(lifecycle.audience_level.as_str())
    .bind(lifecycle.state.as_str())
    .bind(time::to_db(&lifecycle.started_at))
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_lifecycle(pool: &SqlitePool, session_id: Uuid) -> Result<Option<ReviewLifecycle>> {
    let row = sqlx::query(
        r#"
        SELECT id, concept_id, audience_level, state, turns, started_at, ended_at
        FROM review_lifecycle
        WHERE id = ?
        "#,
    )
    .bind(session_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(lifecycle_from_row).transpose()
}

/// Reserve one turn of an Active session
///
/// The check and the increment are a single guarded `UPDATE`, so concurrent
/// callers can never push `turns` past `max_turns`. `None` means unlimited.
pub async fn claim_turn(
    pool: &SqlitePool,
    session_id: Uuid,
    max_turns: Option<usize>,
) -> Result<TurnClaim> {
    let limit = max_turns
        .map(|n| i64::try_from(n).unwrap_or(i64::MAX))
        .unwrap_or(i64::MAX);

    let claimed = sqlx::query(
        "UPDATE review_lifecycle SET turns = turns + 1 WHERE id = ? AND state = ? AND turns < ?",
    )
    .bind(session_id.to_string())
    .bind(SessionState::Active.as_str())
    .bind(limit)
    .execute(pool)
    .await?
    .rows_affected();

    if claimed > 0 {
        return Ok(TurnClaim::Claimed);
    }

    let state: Option<String> = sqlx::query_scalar("SELECT state FROM review_lifecycle WHERE id = ?")
        .bind(session_id.to_string())
        .fetch_optional(pool)
        .await?;

    match state.map(|s| s.parse::<SessionState>()).transpose()? {
        Some(SessionState::Active) => Ok(TurnClaim::LimitReached),
        _ => Ok(TurnClaim::NotActive),
    }
}

/// Give back a turn reserved by [`claim_turn`] that was never served
pub async fn release_turn(pool: &SqlitePool, session_id: Uuid) -> Result<()> {
    sqlx::query("UPDATE review_lifecycle SET turns = turns - 1 WHERE id = ? AND turns > 0")
        .bind(session_id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

/// Archive an ended session and apply its progress decision
///
/// One transaction:
/// 1. Flip the lifecycle Active → Ended (guarded on `state = 'Active'`)
/// 2. Insert the transcript + feedback record under the session id
/// 3. Write the concept's status and `last_reviewed_at`
///
/// When step 1 matches no row the transaction is rolled back and
/// `NotActive` is returned, so a session is archived at most once.
pub async fn archive_session(
    pool: &SqlitePool,
    record: &ReviewSessionRecord,
    status: ProgressStatus,
) -> Result<ArchiveOutcome> {
    let transcript = serde_json::to_string(&record.transcript)?;
    let feedback = record.feedback.as_ref().map(serde_json::to_string).transpose()?;
    let ended_at = time::to_db(&record.created_at);
    let session_id = record.id.to_string();
    let concept_id = record.concept_id.to_string();

    let mut tx = pool.begin().await?;

    let flipped = sqlx::query(
        "UPDATE review_lifecycle SET state = ?, ended_at = ? WHERE id = ? AND state = ?",
    )
    .bind(SessionState::Ended.as_str())
    .bind(&ended_at)
    .bind(&session_id)
    .bind(SessionState::Active.as_str())
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if flipped == 0 {
        tx.rollback().await?;
        return Ok(ArchiveOutcome::NotActive);
    }

    sqlx::query(
        r#"
        INSERT INTO review_sessions (id, concept_id, audience_level, transcript, feedback, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&session_id)
    .bind(&concept_id)
    .bind(record.audience_level.as_str())
    .bind(&transcript)
    .bind(&feedback)
    .bind(&ended_at)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE concepts SET status = ?, last_reviewed_at = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(&ended_at)
        .bind(&concept_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(ArchiveOutcome::Archived)
}

pub async fn get_session(pool: &SqlitePool, id: Uuid) -> Result<Option<ReviewSessionRecord>> {
    let row = sqlx::query(
        r#"
        SELECT id, concept_id, audience_level, transcript, feedback, created_at
        FROM review_sessions
        WHERE id = ?
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(record_from_row).transpose()
}

/// Archived sessions of a concept, oldest first
pub async fn list_sessions_for_concept(
    pool: &SqlitePool,
    concept_id: Uuid,
) -> Result<Vec<ReviewSessionRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT id, concept_id, audience_level, transcript, feedback, created_at
        FROM review_sessions
        WHERE concept_id = ?
        ORDER BY created_at
        "#,
    )
    .bind(concept_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(record_from_row).collect()
}

/// Drop lifecycles that were started but never ended before `cutoff`
///
/// Abandoned sessions hold no transcript, so removing them only frees rows.
pub async fn prune_abandoned(pool: &SqlitePool, cutoff: DateTime<Utc>) -> Result<u64> {
    let result = sqlx::query("DELETE FROM review_lifecycle WHERE state = ? AND started_at < ?")
        .bind(SessionState::Active.as_str())
        .bind(time::to_db(&cutoff))
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
