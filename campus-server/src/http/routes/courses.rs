//! Course endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::DeleteResponse;
use crate::db::COURSES_CODE_KEY;
use crate::http::error::ApiError;
use crate::http::extractors::{IdPath, JsonBody, ValidQuery};
use crate::http::server::AppState;
use crate::models::{Course, CourseFilter, CourseInput, CourseRequest, Student};

/// Course with its enrolled students
#[derive(Debug, Serialize)]
pub struct CourseStudentsResponse {
    pub course: Course,
    pub students: Vec<Student>,
    pub total: usize,
}

/// POST /courses - create a new course
async fn create_course(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<CourseRequest>,
) -> Result<(StatusCode, Json<Course>), ApiError> {
    let input = CourseInput::new(req)?;
    let mut session = state.store.begin().await?;

    if session.find_course_by_code(&input.code).await?.is_some() {
        return Err(ApiError::duplicate_code(&input.code));
    }

    let course = session
        .insert_course(&input)
        .await
        .map_err(|e| ApiError::unique_or(e, COURSES_CODE_KEY, || ApiError::duplicate_code(&input.code)))?;
    session.commit().await?;

    tracing::info!(course_id = course.id, code = %course.code, "course created");
    Ok((StatusCode::CREATED, Json(course)))
}

/// GET /courses?credits=&code= - list courses with optional filters
async fn list_courses(
    State(state): State<Arc<AppState>>,
    ValidQuery(filter): ValidQuery<CourseFilter>,
) -> Result<Json<Vec<Course>>, ApiError> {
    let mut session = state.store.begin().await?;
    let courses = session.list_courses(&filter.normalized()).await?;
    session.commit().await?;
    Ok(Json(courses))
}

/// GET /courses/{id}
async fn get_course(
    State(state): State<Arc<AppState>>,
    IdPath(id): IdPath<i64>,
) -> Result<Json<Course>, ApiError> {
    let mut session = state.store.begin().await?;
    let course = session
        .get_course(id)
        .await?
        .ok_or_else(|| ApiError::not_found("course", id))?;
    session.commit().await?;
    Ok(Json(course))
}

/// PUT /courses/{id}
async fn update_course(
    State(state): State<Arc<AppState>>,
    IdPath(id): IdPath<i64>,
    JsonBody(req): JsonBody<CourseRequest>,
) -> Result<Json<Course>, ApiError> {
    let input = CourseInput::new(req)?;
    let mut session = state.store.begin().await?;

    let mut course = session
        .get_course(id)
        .await?
        .ok_or_else(|| ApiError::not_found("course", id))?;

    if input.code != course.code {
        if let Some(existing) = session.find_course_by_code(&input.code).await? {
            if existing.id != id {
                return Err(ApiError::duplicate_code(&input.code));
            }
        }
    }

    course.apply(input);
    session
        .update_course(&course)
        .await
        .map_err(|e| ApiError::unique_or(e, COURSES_CODE_KEY, || ApiError::duplicate_code(&course.code)))?;
    session.commit().await?;

    tracing::info!(course_id = id, "course updated");
    Ok(Json(course))
}

/// DELETE /courses/{id} - remove the course and its enrollments
async fn delete_course(
    State(state): State<Arc<AppState>>,
    IdPath(id): IdPath<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let mut session = state.store.begin().await?;

    if session.get_course(id).await?.is_none() {
        return Err(ApiError::not_found("course", id));
    }

    let enrollments = session.enrollments_for_course(id).await?;
    for enrollment in &enrollments {
        session.delete_enrollment(enrollment.id).await?;
    }
    session.delete_course(id).await?;
    session.commit().await?;

    tracing::info!(
        course_id = id,
        removed_enrollments = enrollments.len(),
        "course deleted"
    );
    Ok(Json(DeleteResponse {
        message: format!("course {} deleted", id),
        removed_enrollments: enrollments.len(),
    }))
}

/// GET /courses/{id}/students - students enrolled in the course
async fn course_students(
    State(state): State<Arc<AppState>>,
    IdPath(id): IdPath<i64>,
) -> Result<Json<CourseStudentsResponse>, ApiError> {
    let mut session = state.store.begin().await?;

    let course = session
        .get_course(id)
        .await?
        .ok_or_else(|| ApiError::not_found("course", id))?;

    let enrollments = session.enrollments_for_course(id).await?;
    let mut students = Vec::with_capacity(enrollments.len());
    for enrollment in enrollments {
        match session.get_student(enrollment.student_id).await? {
            Some(student) => students.push(student),
            None => tracing::warn!(
                enrollment_id = enrollment.id,
                student_id = enrollment.student_id,
                "skipping enrollment with missing student"
            ),
        }
    }
    session.commit().await?;

    Ok(Json(CourseStudentsResponse {
        total: students.len(),
        course,
        students,
    }))
}

/// Course routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/courses", get(list_courses).post(create_course))
        .route(
            "/courses/{id}",
            get(get_course).put(update_course).delete(delete_course),
        )
        .route("/courses/{id}/students", get(course_students))
}
