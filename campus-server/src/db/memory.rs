//! In-process store for tests and `serve --in-memory`
//!
//! Sessions are serialized through one async mutex. A session edits a
//! copy of the tables and publishes it on commit; dropping the session
//! leaves the shared tables untouched.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{DbError, Session, Store, COURSES_CODE_KEY, ENROLLMENTS_PAIR_KEY, STUDENTS_CEDULA_KEY};
use crate::models::{
    Course, CourseFilter, CourseInput, Enrollment, Student, StudentFilter, StudentInput,
};

#[derive(Debug, Clone, Default)]
struct Tables {
    students: BTreeMap<i64, Student>,
    courses: BTreeMap<i64, Course>,
    enrollments: BTreeMap<i64, Enrollment>,
    next_student_id: i64,
    next_course_id: i64,
    next_enrollment_id: i64,
}

impl Tables {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }
}

/// Store that keeps every table in memory
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn Session>, DbError> {
        let guard = Arc::clone(&self.tables).lock_owned().await;
        let work = Tables::clone(&guard);
        Ok(Box::new(MemorySession { guard, work }))
    }
}

/// Session holding the store lock and a working copy
pub struct MemorySession {
    guard: OwnedMutexGuard<Tables>,
    work: Tables,
}

fn unique(constraint: &str) -> DbError {
    DbError::UniqueViolation {
        constraint: constraint.to_owned(),
    }
}

#[async_trait]
impl Session for MemorySession {
    async fn get_student(&mut self, id: i64) -> Result<Option<Student>, DbError> {
        Ok(self.work.students.get(&id).cloned())
    }

    async fn find_student_by_cedula(&mut self, cedula: &str) -> Result<Option<Student>, DbError> {
        Ok(self
            .work
            .students
            .values()
            .find(|s| s.cedula == cedula)
            .cloned())
    }

    async fn list_students(&mut self, filter: &StudentFilter) -> Result<Vec<Student>, DbError> {
        Ok(self
            .work
            .students
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect())
    }

    async fn insert_student(&mut self, input: &StudentInput) -> Result<Student, DbError> {
        if self.work.students.values().any(|s| s.cedula == input.cedula) {
            return Err(unique(STUDENTS_CEDULA_KEY));
        }
        let student = Student {
            id: Tables::next_id(&mut self.work.next_student_id),
            cedula: input.cedula.clone(),
            name: input.name.clone(),
            email: input.email.clone(),
            semester: input.semester,
        };
        self.work.students.insert(student.id, student.clone());
        Ok(student)
    }

    async fn update_student(&mut self, student: &Student) -> Result<(), DbError> {
        if self
            .work
            .students
            .values()
            .any(|s| s.id != student.id && s.cedula == student.cedula)
        {
            return Err(unique(STUDENTS_CEDULA_KEY));
        }
        if let Some(row) = self.work.students.get_mut(&student.id) {
            *row = student.clone();
        }
        Ok(())
    }

    async fn delete_student(&mut self, id: i64) -> Result<(), DbError> {
        self.work.students.remove(&id);
        Ok(())
    }

    async fn get_course(&mut self, id: i64) -> Result<Option<Course>, DbError> {
        Ok(self.work.courses.get(&id).cloned())
    }

    async fn find_course_by_code(&mut self, code: &str) -> Result<Option<Course>, DbError> {
        Ok(self.work.courses.values().find(|c| c.code == code).cloned())
    }

    async fn list_courses(&mut self, filter: &CourseFilter) -> Result<Vec<Course>, DbError> {
        Ok(self
            .work
            .courses
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect())
    }

    async fn insert_course(&mut self, input: &CourseInput) -> Result<Course, DbError> {
        if self.work.courses.values().any(|c| c.code == input.code) {
            return Err(unique(COURSES_CODE_KEY));
        }
        let course = Course {
            id: Tables::next_id(&mut self.work.next_course_id),
            code: input.code.clone(),
            name: input.name.clone(),
            credits: input.credits,
            schedule: input.schedule.clone(),
        };
        self.work.courses.insert(course.id, course.clone());
        Ok(course)
    }

    async fn update_course(&mut self, course: &Course) -> Result<(), DbError> {
        if self
            .work
            .courses
            .values()
            .any(|c| c.id != course.id && c.code == course.code)
        {
            return Err(unique(COURSES_CODE_KEY));
        }
        if let Some(row) = self.work.courses.get_mut(&course.id) {
            *row = course.clone();
        }
        Ok(())
    }

    async fn delete_course(&mut self, id: i64) -> Result<(), DbError> {
        self.work.courses.remove(&id);
        Ok(())
    }

    async fn find_enrollment(
        &mut self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Option<Enrollment>, DbError> {
        Ok(self
            .work
            .enrollments
            .values()
            .find(|e| e.student_id == student_id && e.course_id == course_id)
            .cloned())
    }

    async fn enrollments_for_student(
        &mut self,
        student_id: i64,
    ) -> Result<Vec<Enrollment>, DbError> {
        Ok(self
            .work
            .enrollments
            .values()
            .filter(|e| e.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn enrollments_for_course(&mut self, course_id: i64) -> Result<Vec<Enrollment>, DbError> {
        Ok(self
            .work
            .enrollments
            .values()
            .filter(|e| e.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn insert_enrollment(
        &mut self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Enrollment, DbError> {
        if self.find_enrollment(student_id, course_id).await?.is_some() {
            return Err(unique(ENROLLMENTS_PAIR_KEY));
        }
        let enrollment = Enrollment {
            id: Tables::next_id(&mut self.work.next_enrollment_id),
            student_id,
            course_id,
            enrolled_at: Utc::now(),
        };
        self.work.enrollments.insert(enrollment.id, enrollment.clone());
        Ok(enrollment)
    }

    async fn delete_enrollment(&mut self, id: i64) -> Result<(), DbError> {
        self.work.enrollments.remove(&id);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DbError> {
        let MemorySession { mut guard, work } = *self;
        *guard = work;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(cedula: &str) -> StudentInput {
        StudentInput {
            cedula: cedula.into(),
            name: "Luis".into(),
            email: "luis@uni.edu".into(),
            semester: 5,
        }
    }

    fn course(code: &str) -> CourseInput {
        CourseInput {
            code: code.into(),
            name: "Algebra".into(),
            credits: 3,
            schedule: "Tue 10:00".into(),
        }
    }

    #[tokio::test]
    async fn commit_publishes_writes() {
        let store = MemoryStore::new();

        let mut session = store.begin().await.unwrap();
        let created = session.insert_student(&student("100")).await.unwrap();
        session.commit().await.unwrap();

        let mut session = store.begin().await.unwrap();
        assert_eq!(session.get_student(created.id).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn drop_without_commit_discards_writes() {
        let store = MemoryStore::new();

        let mut session = store.begin().await.unwrap();
        session.insert_student(&student("100")).await.unwrap();
        drop(session);

        let mut session = store.begin().await.unwrap();
        let all = session.list_students(&StudentFilter::default()).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn ids_are_assigned_in_order() {
        let store = MemoryStore::new();
        let mut session = store.begin().await.unwrap();
        let a = session.insert_course(&course("A1")).await.unwrap();
        let b = session.insert_course(&course("B1")).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));
    }

    #[tokio::test]
    async fn unique_constraints_are_enforced() {
        let store = MemoryStore::new();
        let mut session = store.begin().await.unwrap();

        session.insert_student(&student("100")).await.unwrap();
        let err = session.insert_student(&student("100")).await.unwrap_err();
        assert!(err.is_unique(STUDENTS_CEDULA_KEY));

        let c = session.insert_course(&course("CS101")).await.unwrap();
        let mut other = session.insert_course(&course("CS102")).await.unwrap();
        other.code = c.code.clone();
        let err = session.update_course(&other).await.unwrap_err();
        assert!(err.is_unique(COURSES_CODE_KEY));

        session.insert_enrollment(1, c.id).await.unwrap();
        let err = session.insert_enrollment(1, c.id).await.unwrap_err();
        assert!(err.is_unique(ENROLLMENTS_PAIR_KEY));
    }

    #[tokio::test]
    async fn enrollment_queries_filter_by_side() {
        let store = MemoryStore::new();
        let mut session = store.begin().await.unwrap();
        session.insert_enrollment(1, 10).await.unwrap();
        session.insert_enrollment(1, 11).await.unwrap();
        session.insert_enrollment(2, 10).await.unwrap();

        assert_eq!(session.enrollments_for_student(1).await.unwrap().len(), 2);
        assert_eq!(session.enrollments_for_course(10).await.unwrap().len(), 2);
        assert!(session.find_enrollment(2, 11).await.unwrap().is_none());
    }
}
