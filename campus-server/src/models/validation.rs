//! Validation error types and shared field checks

use std::fmt;

/// Validation error for domain models
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// Integer field outside its allowed range
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
        value: i64,
    },

    /// String doesn't match required format (e.g., email)
    InvalidFormat { field: &'static str, reason: &'static str },

    /// Body or query string could not be decoded at all
    Malformed { source: &'static str, reason: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::OutOfRange {
                field,
                min,
                max,
                value,
            } => write!(f, "{} must be between {} and {}, got {}", field, min, max, value),
            Self::InvalidFormat { field, reason } => {
                write!(f, "{}: {}", field, reason)
            }
            Self::Malformed { source, reason } => write!(f, "invalid {}: {}", source, reason),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Length-check a text field. The value is stored exactly as sent.
pub(crate) fn text(field: &'static str, raw: &str, max: usize) -> Result<String, ValidationError> {
    if raw.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(raw.to_owned())
}

/// Check an integer against an inclusive range.
pub(crate) fn in_range(
    field: &'static str,
    value: i64,
    min: i32,
    max: i32,
) -> Result<i32, ValidationError> {
    if (i64::from(min)..=i64::from(max)).contains(&value) {
        // in range, so it fits
        Ok(value as i32)
    } else {
        Err(ValidationError::OutOfRange {
            field,
            min: min.into(),
            max: max.into(),
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "name",
            max: 100,
        };
        assert_eq!(err.to_string(), "name exceeds maximum length of 100 characters");

        let err = ValidationError::OutOfRange {
            field: "semester",
            min: 1,
            max: 12,
            value: 13,
        };
        assert_eq!(err.to_string(), "semester must be between 1 and 12, got 13");
    }

    #[test]
    fn text_keeps_value_verbatim() {
        assert_eq!(text("name", "  Ana  ", 10).unwrap(), "  Ana  ");
        assert_eq!(text("name", "", 10).unwrap(), "");
    }

    #[test]
    fn length_counts_chars_not_bytes() {
        // 5 chars, 10 bytes
        assert!(text("name", "ñññññ", 5).is_ok());
        assert!(text("name", "ññññññ", 5).is_err());
    }

    #[test]
    fn range_bounds_are_inclusive() {
        assert_eq!(in_range("credits", 1, 1, 10), Ok(1));
        assert_eq!(in_range("credits", 10, 1, 10), Ok(10));
        assert!(in_range("credits", 0, 1, 10).is_err());
        assert!(in_range("credits", 11, 1, 10).is_err());
    }

    #[test]
    fn range_rejects_values_wider_than_i32() {
        let err = in_range("semester", 5_000_000_000, 1, 12).unwrap_err();
        assert_eq!(
            err,
            ValidationError::OutOfRange {
                field: "semester",
                min: 1,
                max: 12,
                value: 5_000_000_000,
            }
        );
        assert!(in_range("semester", i64::MIN, 1, 12).is_err());
    }
}
