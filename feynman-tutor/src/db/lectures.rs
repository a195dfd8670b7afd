//! Lecture database operations
//!
//! Lectures are immutable once stored; the only mutation is deletion.

use feynman_common::db::Lecture;
use feynman_common::{time, uuid_utils, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

fn lecture_from_row(row: &SqliteRow) -> Result<Lecture> {
    let id: String = row.get("id");
    let course_id: String = row.get("course_id");
    let created_at: String = row.get("created_at");

    Ok(Lecture {
        id: uuid_utils::from_db("lectures.id", &id)?,
        course_id: uuid_utils::from_db("lectures.course_id", &course_id)?,
        name: row.get("name"),
        raw_text: row.get("raw_text"),
        created_at: time::from_db("lectures.created_at", &created_at)?,
    })
}

pub async fn insert_lecture(pool: &SqlitePool, lecture: &Lecture) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO lectures (id, course_id, name, raw_text, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(lecture.id.to_string())
    .bind(lecture.course_id.to_string())
    .bind(&lecture.name)
    .bind(&lecture.raw_text)
    .bind(time::to_db(&lecture.created_at))
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_lecture(pool: &SqlitePool, id: Uuid) -> Result<Option<Lecture>> {
    let row = sqlx::query(
        "SELECT id, course_id, name, raw_text, created_at FROM lectures WHERE id = ?",
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(lecture_from_row).transpose()
}

pub async fn list_lectures(pool: &SqlitePool, course_id: Uuid) -> Result<Vec<Lecture>> {
    let rows = sqlx::query(
        r#"
        SELECT id, course_id, name, raw_text, created_at
        FROM lectures
        WHERE course_id = ?
        ORDER BY created_at
        "#,
    )
    .bind(course_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(lecture_from_row).collect()
}

/// Delete a lecture; concepts and their sessions cascade
pub async fn delete_lecture(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM lectures WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
