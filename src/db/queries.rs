//! Database queries for travel programs

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::Program;

/// Get a program by id
pub async fn get_program(pool: &PgPool, program_id: Uuid) -> Result<Program> {
    let program = sqlx::query_as::<_, Program>(
        r#"
        SELECT
            id,
            name,
            destination_city,
            start_date,
            end_date,
            active,
            created_at
        FROM programs
        WHERE id = $1
        "#,
    )
    .bind(program_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)?;

    Ok(program)
}

/// Get all active programs, soonest departure first
pub async fn get_active_programs(pool: &PgPool) -> Result<Vec<Program>> {
    let programs = sqlx::query_as::<_, Program>(
        r#"
        SELECT
            id,
            name,
            destination_city,
            start_date,
            end_date,
            active,
            created_at
        FROM programs
        WHERE active = true
        ORDER BY start_date ASC NULLS LAST, name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(programs)
}
