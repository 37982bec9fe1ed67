//! API error types with IntoResponse
//!
//! Errors are converted to JSON responses with appropriate status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::DbError;
use crate::models::ValidationError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation(ValidationError),

    /// Unique field already taken by another record (400)
    DuplicateKey {
        resource: &'static str,
        field: &'static str,
        value: String,
    },

    /// Student already enrolled in the course (400)
    DuplicateAssociation { student_id: i64, course_id: i64 },

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Database error (500, logged)
    Database(DbError),
}

impl ApiError {
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub fn duplicate_cedula(cedula: &str) -> Self {
        Self::DuplicateKey {
            resource: "student",
            field: "cedula",
            value: cedula.to_owned(),
        }
    }

    pub fn duplicate_code(code: &str) -> Self {
        Self::DuplicateKey {
            resource: "course",
            field: "code",
            value: code.to_owned(),
        }
    }

    /// Map a unique violation on `constraint` to `conflict`, anything else to `Database`.
    pub fn unique_or(err: DbError, constraint: &str, conflict: impl FnOnce() -> Self) -> Self {
        if err.is_unique(constraint) {
            conflict()
        } else {
            Self::from(err)
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::DuplicateKey { .. } | Self::DuplicateAssociation { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Validation(e) => json!({
                "error": "validation_error",
                "message": e.to_string()
            }),
            Self::DuplicateKey {
                resource,
                field,
                value,
            } => json!({
                "error": "duplicate_key",
                "message": format!("{} with {} '{}' already exists", resource, field, value)
            }),
            Self::DuplicateAssociation {
                student_id,
                course_id,
            } => json!({
                "error": "duplicate_association",
                "message": format!(
                    "student {} is already enrolled in course {}",
                    student_id, course_id
                )
            }),
            Self::NotFound { resource, id } => json!({
                "error": "not_found",
                "message": format!("{} '{}' not found", resource, id)
            }),
            Self::Database(e) => {
                // Log the actual error, return generic message
                tracing::error!("Database error: {}", e);
                json!({
                    "error": "internal_error",
                    "message": "an internal error occurred"
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        Self::Database(e)
    }
}
