//! Unit-of-work traits shared by every store backend

use async_trait::async_trait;

use super::DbError;
use crate::models::{
    Course, CourseFilter, CourseInput, Enrollment, Student, StudentFilter, StudentInput,
};

/// A transactional store that hands out sessions.
#[async_trait]
pub trait Store: Send + Sync {
    /// Open a new transaction.
    async fn begin(&self) -> Result<Box<dyn Session>, DbError>;
}

/// One open transaction.
///
/// Writes are only visible to other sessions after [`Session::commit`].
/// Dropping a session without committing discards everything it wrote.
#[async_trait]
pub trait Session: Send {
    async fn get_student(&mut self, id: i64) -> Result<Option<Student>, DbError>;
    async fn find_student_by_cedula(&mut self, cedula: &str) -> Result<Option<Student>, DbError>;
    async fn list_students(&mut self, filter: &StudentFilter) -> Result<Vec<Student>, DbError>;
    async fn insert_student(&mut self, input: &StudentInput) -> Result<Student, DbError>;
    async fn update_student(&mut self, student: &Student) -> Result<(), DbError>;
    async fn delete_student(&mut self, id: i64) -> Result<(), DbError>;

    async fn get_course(&mut self, id: i64) -> Result<Option<Course>, DbError>;
    async fn find_course_by_code(&mut self, code: &str) -> Result<Option<Course>, DbError>;
    async fn list_courses(&mut self, filter: &CourseFilter) -> Result<Vec<Course>, DbError>;
    async fn insert_course(&mut self, input: &CourseInput) -> Result<Course, DbError>;
    async fn update_course(&mut self, course: &Course) -> Result<(), DbError>;
    async fn delete_course(&mut self, id: i64) -> Result<(), DbError>;

    async fn find_enrollment(
        &mut self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Option<Enrollment>, DbError>;
    async fn enrollments_for_student(&mut self, student_id: i64)
        -> Result<Vec<Enrollment>, DbError>;
    async fn enrollments_for_course(&mut self, course_id: i64) -> Result<Vec<Enrollment>, DbError>;
    async fn insert_enrollment(
        &mut self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Enrollment, DbError>;
    async fn delete_enrollment(&mut self, id: i64) -> Result<(), DbError>;

    /// Make every write in this session visible atomically.
    async fn commit(self: Box<Self>) -> Result<(), DbError>;
}
