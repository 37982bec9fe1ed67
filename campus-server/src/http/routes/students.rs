//! Student endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::DeleteResponse;
use crate::db::STUDENTS_CEDULA_KEY;
use crate::http::error::ApiError;
use crate::http::extractors::{IdPath, JsonBody, ValidQuery};
use crate::http::server::AppState;
use crate::models::{Course, Student, StudentFilter, StudentInput, StudentRequest};

/// Student with the courses they are enrolled in
#[derive(Debug, Serialize)]
pub struct StudentCoursesResponse {
    pub student: Student,
    pub courses: Vec<Course>,
    pub total: usize,
}

/// POST /students - create a new student
async fn create_student(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<StudentRequest>,
) -> Result<(StatusCode, Json<Student>), ApiError> {
    let input = StudentInput::new(req)?;
    let mut session = state.store.begin().await?;

    if session.find_student_by_cedula(&input.cedula).await?.is_some() {
        return Err(ApiError::duplicate_cedula(&input.cedula));
    }

    let student = session.insert_student(&input).await.map_err(|e| {
        ApiError::unique_or(e, STUDENTS_CEDULA_KEY, || {
            ApiError::duplicate_cedula(&input.cedula)
        })
    })?;
    session.commit().await?;

    tracing::info!(student_id = student.id, cedula = %student.cedula, "student created");
    Ok((StatusCode::CREATED, Json(student)))
}

/// GET /students?semester= - list students, optionally by semester
async fn list_students(
    State(state): State<Arc<AppState>>,
    ValidQuery(filter): ValidQuery<StudentFilter>,
) -> Result<Json<Vec<Student>>, ApiError> {
    let mut session = state.store.begin().await?;
    let students = session.list_students(&filter.normalized()).await?;
    session.commit().await?;
    Ok(Json(students))
}

/// GET /students/{id}
async fn get_student(
    State(state): State<Arc<AppState>>,
    IdPath(id): IdPath<i64>,
) -> Result<Json<Student>, ApiError> {
    let mut session = state.store.begin().await?;
    let student = session
        .get_student(id)
        .await?
        .ok_or_else(|| ApiError::not_found("student", id))?;
    session.commit().await?;
    Ok(Json(student))
}

/// PUT /students/{id} - overwrite every field
async fn update_student(
    State(state): State<Arc<AppState>>,
    IdPath(id): IdPath<i64>,
    JsonBody(req): JsonBody<StudentRequest>,
) -> Result<Json<Student>, ApiError> {
    let input = StudentInput::new(req)?;
    let mut session = state.store.begin().await?;

    let mut student = session
        .get_student(id)
        .await?
        .ok_or_else(|| ApiError::not_found("student", id))?;

    if input.cedula != student.cedula {
        if let Some(existing) = session.find_student_by_cedula(&input.cedula).await? {
            if existing.id != id {
                return Err(ApiError::duplicate_cedula(&input.cedula));
            }
        }
    }

    student.apply(input);
    session.update_student(&student).await.map_err(|e| {
        ApiError::unique_or(e, STUDENTS_CEDULA_KEY, || {
            ApiError::duplicate_cedula(&student.cedula)
        })
    })?;
    session.commit().await?;

    tracing::info!(student_id = id, "student updated");
    Ok(Json(student))
}

/// DELETE /students/{id} - remove the student and their enrollments
async fn delete_student(
    State(state): State<Arc<AppState>>,
    IdPath(id): IdPath<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let mut session = state.store.begin().await?;

    if session.get_student(id).await?.is_none() {
        return Err(ApiError::not_found("student", id));
    }

    let enrollments = session.enrollments_for_student(id).await?;
    for enrollment in &enrollments {
        session.delete_enrollment(enrollment.id).await?;
    }
    session.delete_student(id).await?;
    session.commit().await?;

    tracing::info!(
        student_id = id,
        removed_enrollments = enrollments.len(),
        "student deleted"
    );
    Ok(Json(DeleteResponse {
        message: format!("student {} deleted", id),
        removed_enrollments: enrollments.len(),
    }))
}

/// GET /students/{id}/courses - courses the student is enrolled in
async fn student_courses(
    State(state): State<Arc<AppState>>,
    IdPath(id): IdPath<i64>,
) -> Result<Json<StudentCoursesResponse>, ApiError> {
    let mut session = state.store.begin().await?;

    let student = session
        .get_student(id)
        .await?
        .ok_or_else(|| ApiError::not_found("student", id))?;

    let enrollments = session.enrollments_for_student(id).await?;
    let mut courses = Vec::with_capacity(enrollments.len());
    for enrollment in enrollments {
        match session.get_course(enrollment.course_id).await? {
            Some(course) => courses.push(course),
            None => tracing::warn!(
                enrollment_id = enrollment.id,
                course_id = enrollment.course_id,
                "skipping enrollment with missing course"
            ),
        }
    }
    session.commit().await?;

    Ok(Json(StudentCoursesResponse {
        total: courses.len(),
        student,
        courses,
    }))
}

/// Student routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/students", get(list_students).post(create_student))
        .route(
            "/students/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route("/students/{id}/courses", get(student_courses))
}
