//! Database layer - stores, sessions, and schema
//!
//! # Design Principles
//!
//! - One `Session` per request, wrapping exactly one transaction
//! - `commit()` consumes the session; dropping it rolls back
//! - Handlers check uniqueness first, DB constraints catch the races

pub mod error;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod postgres;
pub mod session;

pub use error::DbError;
pub use memory::MemoryStore;
pub use pool::{create_pool, create_pool_with_options};
pub use postgres::PgStore;
pub use session::{Session, Store};

/// Unique constraint on `students.cedula`
pub const STUDENTS_CEDULA_KEY: &str = "students_cedula_key";

/// Unique constraint on `courses.code`
pub const COURSES_CODE_KEY: &str = "courses_code_key";

/// Composite unique constraint on `enrollments (student_id, course_id)`
pub const ENROLLMENTS_PAIR_KEY: &str = "enrollments_student_course_key";
