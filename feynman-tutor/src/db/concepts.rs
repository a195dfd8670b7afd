//! Concept database operations
//!
//! Concepts are inserted as a batch right after their lecture, in
//! decomposition order. Their progress status is changed only when a review
//! session is archived (see [`crate::db::review_sessions::archive_session`]).

use feynman_common::db::{Concept, ProgressStatus};
use feynman_common::{time, uuid_utils, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

const CONCEPT_COLUMNS: &str =
    "id, lecture_id, name, description, status, position, last_reviewed_at, created_at";

fn concept_from_row(row: &SqliteRow) -> Result<Concept> {
    let id: String = row.get("id");
    let lecture_id: String = row.get("lecture_id");
    let status: String = row.get("status");
    let created_at: String = row.get("created_at");

    Ok(Concept {
        id: uuid_utils::from_db("concepts.id", &id)?,
        lecture_id: uuid_utils::from_db("concepts.lecture_id", &lecture_id)?,
        name: row.get("name"),
        description: row.get("description"),
        status: status.parse::<ProgressStatus>()?,
        position: row.get("position"),
        last_reviewed_at: time::from_db_opt(
            "concepts.last_reviewed_at",
            row.get("last_reviewed_at"),
        )?,
        created_at: time::from_db("concepts.created_at", &created_at)?,
    })
}

/// Insert a validated batch of `(name, description)` pairs for a lecture
///
/// All-or-nothing: the batch is written in one transaction. Every concept
/// starts at `NotStarted`.
pub async fn insert_concepts(
    pool: &SqlitePool,
    lecture_id: Uuid,
    batch: &[(String, String)],
) -> Result<Vec<Concept>> {
    let created_at = time::now();
    let mut concepts = Vec::with_capacity(batch.len());

    let mut tx = pool.begin().await?;

    for (position, (name, description)) in batch.iter().enumerate() {
        let concept = Concept {
            id: uuid_utils::generate(),
            lecture_id,
            name: name.clone(),
            description: description.clone(),
            status: ProgressStatus::NotStarted,
            position: position as i64,
            last_reviewed_at: None,
            created_at,
        };

        sqlx::query(
            r#"
            INSERT INTO concepts (id, lecture_id, name, description, status, position, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(concept.id.to_string())
        .bind(lecture_id.to_string())
        .bind(&concept.name)
        .bind(&concept.description)
        .bind(concept.status.as_str())
        .bind(concept.position)
        .bind(time::to_db(&concept.created_at))
        .execute(&mut *tx)
        .await?;

        concepts.push(concept);
    }

    tx.commit().await?;

    Ok(concepts)
}

pub async fn get_concept(pool: &SqlitePool, id: Uuid) -> Result<Option<Concept>> {
    let row = sqlx::query(&format!("SELECT {} FROM concepts WHERE id = ?", CONCEPT_COLUMNS))
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(concept_from_row).transpose()
}

/// Concepts of a lecture in decomposition order
pub async fn list_concepts(pool: &SqlitePool, lecture_id: Uuid) -> Result<Vec<Concept>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM concepts WHERE lecture_id = ? ORDER BY position",
        CONCEPT_COLUMNS
    ))
    .bind(lecture_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(concept_from_row).collect()
}

/// Delete a single concept; its review sessions cascade
pub async fn delete_concept(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM concepts WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
