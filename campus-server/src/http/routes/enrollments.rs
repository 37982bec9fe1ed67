//! Enrollment endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{delete, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::MessageResponse;
use crate::db::ENROLLMENTS_PAIR_KEY;
use crate::http::error::ApiError;
use crate::http::extractors::{IdPath, ValidQuery};
use crate::http::server::AppState;
use crate::models::EnrollmentKey;

/// Enrollment confirmation naming both sides
#[derive(Debug, Serialize)]
pub struct EnrollmentResponse {
    pub message: String,
    pub enrollment_id: i64,
    pub student: String,
    pub course: String,
    pub enrolled_at: DateTime<Utc>,
}

/// POST /enrollments?student_id=&course_id=
async fn enroll(
    State(state): State<Arc<AppState>>,
    ValidQuery(key): ValidQuery<EnrollmentKey>,
) -> Result<Json<EnrollmentResponse>, ApiError> {
    let EnrollmentKey {
        student_id,
        course_id,
    } = key;
    let duplicate = || ApiError::DuplicateAssociation {
        student_id,
        course_id,
    };

    let mut session = state.store.begin().await?;

    if session.find_enrollment(student_id, course_id).await?.is_some() {
        return Err(duplicate());
    }

    let student = session
        .get_student(student_id)
        .await?
        .ok_or_else(|| ApiError::not_found("student", student_id))?;
    let course = session
        .get_course(course_id)
        .await?
        .ok_or_else(|| ApiError::not_found("course", course_id))?;

    let enrollment = session
        .insert_enrollment(student_id, course_id)
        .await
        .map_err(|e| ApiError::unique_or(e, ENROLLMENTS_PAIR_KEY, duplicate))?;
    session.commit().await?;

    tracing::info!(student_id, course_id, enrollment_id = enrollment.id, "student enrolled");
    Ok(Json(EnrollmentResponse {
        message: format!("{} enrolled in {}", student.name, course.name),
        enrollment_id: enrollment.id,
        student: student.name,
        course: course.name,
        enrolled_at: enrollment.enrolled_at,
    }))
}

/// DELETE /enrollments/{student_id}/{course_id}
async fn unenroll(
    State(state): State<Arc<AppState>>,
    IdPath((student_id, course_id)): IdPath<(i64, i64)>,
) -> Result<Json<MessageResponse>, ApiError> {
    let mut session = state.store.begin().await?;

    let enrollment = session
        .find_enrollment(student_id, course_id)
        .await?
        .ok_or_else(|| ApiError::not_found("enrollment", format!("{}/{}", student_id, course_id)))?;

    session.delete_enrollment(enrollment.id).await?;
    session.commit().await?;

    tracing::info!(student_id, course_id, "student unenrolled");
    Ok(Json(MessageResponse {
        message: format!("student {} unenrolled from course {}", student_id, course_id),
    }))
}

/// Enrollment routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/enrollments", post(enroll))
        .route("/enrollments/{student_id}/{course_id}", delete(unenroll))
}
