//! PostgreSQL store backed by a sqlx pool
//!
//! Each session owns one `sqlx::Transaction`. sqlx rolls the
//! transaction back when it is dropped without a commit.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use super::{DbError, Session, Store};
use crate::models::{
    Course, CourseFilter, CourseInput, Enrollment, Student, StudentFilter, StudentInput,
};

/// Store over a PostgreSQL connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> Result<Box<dyn Session>, DbError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgSession { tx }))
    }
}

/// Session wrapping one open transaction
pub struct PgSession {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl Session for PgSession {
    async fn get_student(&mut self, id: i64) -> Result<Option<Student>, DbError> {
        let student = sqlx::query_as::<_, Student>(
            "SELECT id, cedula, name, email, semester FROM students WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(student)
    }

    async fn find_student_by_cedula(&mut self, cedula: &str) -> Result<Option<Student>, DbError> {
        let student = sqlx::query_as::<_, Student>(
            "SELECT id, cedula, name, email, semester FROM students WHERE cedula = $1",
        )
        .bind(cedula)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(student)
    }

    async fn list_students(&mut self, filter: &StudentFilter) -> Result<Vec<Student>, DbError> {
        let students = sqlx::query_as::<_, Student>(
            r#"
            SELECT id, cedula, name, email, semester
            FROM students
            WHERE ($1::INT IS NULL OR semester = $1)
            ORDER BY id
            "#,
        )
        .bind(filter.semester)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(students)
    }

    async fn insert_student(&mut self, input: &StudentInput) -> Result<Student, DbError> {
        let student = sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students (cedula, name, email, semester)
            VALUES ($1, $2, $3, $4)
            RETURNING id, cedula, name, email, semester
            "#,
        )
        .bind(&input.cedula)
        .bind(&input.name)
        .bind(&input.email)
        .bind(input.semester)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(student)
    }

    async fn update_student(&mut self, student: &Student) -> Result<(), DbError> {
        sqlx::query(
            r#"
            UPDATE students
            SET cedula = $2, name = $3, email = $4, semester = $5
            WHERE id = $1
            "#,
        )
        .bind(student.id)
        .bind(&student.cedula)
        .bind(&student.name)
        .bind(&student.email)
        .bind(student.semester)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn delete_student(&mut self, id: i64) -> Result<(), DbError> {
        sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn get_course(&mut self, id: i64) -> Result<Option<Course>, DbError> {
        let course = sqlx::query_as::<_, Course>(
            "SELECT id, code, name, credits, schedule FROM courses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(course)
    }

    async fn find_course_by_code(&mut self, code: &str) -> Result<Option<Course>, DbError> {
        let course = sqlx::query_as::<_, Course>(
            "SELECT id, code, name, credits, schedule FROM courses WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(course)
    }

    async fn list_courses(&mut self, filter: &CourseFilter) -> Result<Vec<Course>, DbError> {
        // strpos keeps '%' and '_' in the fragment literal
        let courses = sqlx::query_as::<_, Course>(
            r#"
            SELECT id, code, name, credits, schedule
            FROM courses
            WHERE ($1::INT IS NULL OR credits = $1)
              AND ($2::TEXT IS NULL OR strpos(code, $2) > 0)
            ORDER BY id
            "#,
        )
        .bind(filter.credits)
        .bind(filter.code.as_deref())
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(courses)
    }

    async fn insert_course(&mut self, input: &CourseInput) -> Result<Course, DbError> {
        let course = sqlx::query_as::<_, Course>(
            r#"
            INSERT INTO courses (code, name, credits, schedule)
            VALUES ($1, $2, $3, $4)
            RETURNING id, code, name, credits, schedule
            "#,
        )
        .bind(&input.code)
        .bind(&input.name)
        .bind(input.credits)
        .bind(&input.schedule)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(course)
    }

    async fn update_course(&mut self, course: &Course) -> Result<(), DbError> {
        sqlx::query(
            r#"
            UPDATE courses
            SET code = $2, name = $3, credits = $4, schedule = $5
            WHERE id = $1
            "#,
        )
        .bind(course.id)
        .bind(&course.code)
        .bind(&course.name)
        .bind(course.credits)
        .bind(&course.schedule)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn delete_course(&mut self, id: i64) -> Result<(), DbError> {
        sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn find_enrollment(
        &mut self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Option<Enrollment>, DbError> {
        let enrollment = sqlx::query_as::<_, Enrollment>(
            r#"
            SELECT id, student_id, course_id, enrolled_at
            FROM enrollments
            WHERE student_id = $1 AND course_id = $2
            "#,
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(enrollment)
    }

    async fn enrollments_for_student(
        &mut self,
        student_id: i64,
    ) -> Result<Vec<Enrollment>, DbError> {
        let enrollments = sqlx::query_as::<_, Enrollment>(
            r#"
            SELECT id, student_id, course_id, enrolled_at
            FROM enrollments
            WHERE student_id = $1
            ORDER BY id
            "#,
        )
        .bind(student_id)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(enrollments)
    }

    async fn enrollments_for_course(&mut self, course_id: i64) -> Result<Vec<Enrollment>, DbError> {
        let enrollments = sqlx::query_as::<_, Enrollment>(
            r#"
            SELECT id, student_id, course_id, enrolled_at
            FROM enrollments
            WHERE course_id = $1
            ORDER BY id
            "#,
        )
        .bind(course_id)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(enrollments)
    }

    async fn insert_enrollment(
        &mut self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Enrollment, DbError> {
        let enrollment = sqlx::query_as::<_, Enrollment>(
            r#"
            INSERT INTO enrollments (student_id, course_id)
            VALUES ($1, $2)
            RETURNING id, student_id, course_id, enrolled_at
            "#,
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(enrollment)
    }

    async fn delete_enrollment(&mut self, id: i64) -> Result<(), DbError> {
        sqlx::query("DELETE FROM enrollments WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DbError> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, migrations, STUDENTS_CEDULA_KEY};

    // Integration tests require a real database
    // Run with: DATABASE_URL=postgres://... cargo test -p campus-server -- --ignored

    async fn store() -> PgStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.expect("pool creation failed");
        migrations::run(&pool).await.expect("migrations failed");
        PgStore::new(pool)
    }

    fn student(cedula: &str) -> StudentInput {
        StudentInput {
            cedula: cedula.into(),
            name: "Pg Test".into(),
            email: "pg@uni.edu".into(),
            semester: 2,
        }
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn dropped_session_rolls_back() {
        let store = store().await;
        let cedula = format!("rb-{}", std::process::id());

        let mut session = store.begin().await.unwrap();
        let created = session.insert_student(&student(&cedula)).await.unwrap();
        drop(session);

        let mut session = store.begin().await.unwrap();
        assert!(session.get_student(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn duplicate_cedula_maps_to_unique_violation() {
        let store = store().await;
        let cedula = format!("dup-{}", std::process::id());

        let mut session = store.begin().await.unwrap();
        session.insert_student(&student(&cedula)).await.unwrap();
        let err = session.insert_student(&student(&cedula)).await.unwrap_err();
        assert!(err.is_unique(STUDENTS_CEDULA_KEY), "got {err:?}");
    }
}
