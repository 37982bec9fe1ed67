//! Database error type

/// Errors raised by store and session implementations
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(sqlx::Error),

    #[error("unique constraint '{constraint}' violated")]
    UniqueViolation { constraint: String },
}

impl DbError {
    /// True if this is a violation of the named unique constraint.
    pub fn is_unique(&self, name: &str) -> bool {
        matches!(self, Self::UniqueViolation { constraint } if constraint == name)
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Self::UniqueViolation {
                    constraint: db_err.constraint().unwrap_or_default().to_owned(),
                };
            }
        }
        Self::Sqlx(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_matches_constraint_name() {
        let err = DbError::UniqueViolation {
            constraint: "courses_code_key".into(),
        };
        assert!(err.is_unique("courses_code_key"));
        assert!(!err.is_unique("students_cedula_key"));
    }

    #[test]
    fn plain_sqlx_errors_pass_through() {
        let err = DbError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, DbError::Sqlx(sqlx::Error::RowNotFound)));
    }
}
