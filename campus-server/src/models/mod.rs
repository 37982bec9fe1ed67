//! Domain models with validation at construction
//!
//! Request bodies are validated into `*Input` types before any
//! store access. Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod student;
pub mod course;
pub mod enrollment;

pub use validation::ValidationError;
pub use student::{Student, StudentFilter, StudentInput, StudentRequest};
pub use course::{Course, CourseFilter, CourseInput, CourseRequest};
pub use enrollment::{Enrollment, EnrollmentKey};
