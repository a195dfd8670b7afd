//! Course database operations

use feynman_common::db::Course;
use feynman_common::{time, uuid_utils, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

fn course_from_row(row: &SqliteRow) -> Result<Course> {
    let id: String = row.get("id");
    let created_at: String = row.get("created_at");

    Ok(Course {
        id: uuid_utils::from_db("courses.id", &id)?,
        name: row.get("name"),
        description: row.get("description"),
        created_at: time::from_db("courses.created_at", &created_at)?,
    })
}

/// Insert a new course
pub async fn create_course(pool: &SqlitePool, name: &str, description: Option<&str>) -> Result<Course> {
    let course = Course {
        id: uuid_utils::generate(),
        name: name.to_string(),
        description: description.map(str::to_string),
        created_at: time::now(),
    };

    sqlx::query("INSERT INTO courses (id, name, description, created_at) VALUES (?, ?, ?, ?)")
        .bind(course.id.to_string())
        .bind(&course.name)
        .bind(&course.description)
        .bind(time::to_db(&course.created_at))
        .execute(pool)
        .await?;

    Ok(course)
}

pub async fn get_course(pool: &SqlitePool, id: Uuid) -> Result<Option<Course>> {
    let row = sqlx::query("SELECT id, name, description, created_at FROM courses WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(course_from_row).transpose()
}

pub async fn list_courses(pool: &SqlitePool) -> Result<Vec<Course>> {
    let rows = sqlx::query("SELECT id, name, description, created_at FROM courses ORDER BY created_at")
        .fetch_all(pool)
        .await?;

    rows.iter().map(course_from_row).collect()
}

/// Delete a course and, by cascade, its lectures, concepts and sessions
///
/// Returns false when no such course existed.
pub async fn delete_course(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM courses WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
