//! Database schema for students, courses, and enrollments

use sqlx::PgPool;

use super::DbError;

/// Create all tables and indexes (idempotent)
pub async fn run(pool: &PgPool) -> Result<(), DbError> {
    tracing::info!("Running campus migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS students (
            id BIGSERIAL PRIMARY KEY,
            cedula VARCHAR(20) NOT NULL,
            name VARCHAR(100) NOT NULL,
            email VARCHAR(100) NOT NULL,
            semester INT NOT NULL CHECK (semester BETWEEN 1 AND 12),
            CONSTRAINT students_cedula_key UNIQUE (cedula)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS courses (
            id BIGSERIAL PRIMARY KEY,
            code VARCHAR(20) NOT NULL,
            name VARCHAR(100) NOT NULL,
            credits INT NOT NULL CHECK (credits BETWEEN 1 AND 10),
            schedule VARCHAR(50) NOT NULL DEFAULT '',
            CONSTRAINT courses_code_key UNIQUE (code)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS enrollments (
            id BIGSERIAL PRIMARY KEY,
            student_id BIGINT NOT NULL REFERENCES students(id),
            course_id BIGINT NOT NULL REFERENCES courses(id),
            enrolled_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            CONSTRAINT enrollments_student_course_key UNIQUE (student_id, course_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // The composite key already covers lookups by student_id
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_enrollments_course ON enrollments(course_id)")
        .execute(pool)
        .await?;

    tracing::info!("Campus migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, COURSES_CODE_KEY, ENROLLMENTS_PAIR_KEY, STUDENTS_CEDULA_KEY};

    #[tokio::test]
    #[ignore = "requires database"]
    async fn migrations_are_idempotent() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.expect("pool creation failed");

        run(&pool).await.expect("first run failed");
        run(&pool).await.expect("second run failed");

        let names: Vec<(String,)> = sqlx::query_as(
            "SELECT conname::TEXT FROM pg_constraint WHERE contype = 'u' ORDER BY conname",
        )
        .fetch_all(&pool)
        .await
        .expect("query failed");
        let names: Vec<String> = names.into_iter().map(|(n,)| n).collect();

        for expected in [STUDENTS_CEDULA_KEY, COURSES_CODE_KEY, ENROLLMENTS_PAIR_KEY] {
            assert!(names.iter().any(|n| n == expected), "missing {expected}");
        }
    }
}
