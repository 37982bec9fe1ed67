//! Student records and input validation

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::validation::{in_range, text};
use super::ValidationError;

pub const MAX_CEDULA_LEN: usize = 20;
pub const MAX_NAME_LEN: usize = 100;
pub const MAX_EMAIL_LEN: usize = 100;
pub const MIN_SEMESTER: i32 = 1;
pub const MAX_SEMESTER: i32 = 12;

/// Loose shape check: one `@` with something on each side. `ana@localhost` passes.
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("invalid email regex"));

/// Persisted student record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: i64,
    pub cedula: String,
    pub name: String,
    pub email: String,
    pub semester: i32,
}

impl Student {
    /// Overwrite every mutable field from validated input.
    pub fn apply(&mut self, input: StudentInput) {
        self.cedula = input.cedula;
        self.name = input.name;
        self.email = input.email;
        self.semester = input.semester;
    }
}

/// Raw request body for create and update
#[derive(Debug, Clone, Deserialize)]
pub struct StudentRequest {
    pub cedula: String,
    pub name: String,
    pub email: String,
    /// Wider than the stored column so oversized numbers reach the range check
    pub semester: i64,
}

/// Validated student fields, ready to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentInput {
    pub cedula: String,
    pub name: String,
    pub email: String,
    pub semester: i32,
}

impl StudentInput {
    /// Validate a request body.
    ///
    /// # Example
    /// ```
    /// use campus_server::models::{StudentInput, StudentRequest};
    ///
    /// let req = StudentRequest {
    ///     cedula: "123".into(),
    ///     name: "Ana".into(),
    ///     email: "ana@uni.edu".into(),
    ///     semester: 13,
    /// };
    /// assert!(StudentInput::new(req).is_err());
    /// ```
    pub fn new(req: StudentRequest) -> Result<Self, ValidationError> {
        let cedula = text("cedula", &req.cedula, MAX_CEDULA_LEN)?;
        let name = text("name", &req.name, MAX_NAME_LEN)?;
        let email = text("email", &req.email, MAX_EMAIL_LEN)?;
        if !EMAIL_RE.is_match(&email) {
            return Err(ValidationError::InvalidFormat {
                field: "email",
                reason: "must look like user@host",
            });
        }
        let semester = in_range("semester", req.semester, MIN_SEMESTER, MAX_SEMESTER)?;

        Ok(Self {
            cedula,
            name,
            email,
            semester,
        })
    }
}

impl TryFrom<StudentRequest> for StudentInput {
    type Error = ValidationError;

    fn try_from(req: StudentRequest) -> Result<Self, Self::Error> {
        Self::new(req)
    }
}

/// List filter for students
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct StudentFilter {
    pub semester: Option<i32>,
}

impl StudentFilter {
    /// Treat `semester=0` as no filter.
    pub fn normalized(self) -> Self {
        Self {
            semester: self.semester.filter(|s| *s != 0),
        }
    }

    pub fn matches(&self, student: &Student) -> bool {
        self.semester.map_or(true, |s| student.semester == s)
    }
}
