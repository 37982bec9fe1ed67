//! Enrollment association between a student and a course

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Persisted enrollment record. The (student_id, course_id) pair is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Enrollment {
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub enrolled_at: DateTime<Utc>,
}

/// Query parameters for `POST /enrollments`
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct EnrollmentKey {
    pub student_id: i64,
    pub course_id: i64,
}
