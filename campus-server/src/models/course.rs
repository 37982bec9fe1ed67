//! Course records and input validation

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::validation::{in_range, text};
use super::ValidationError;

pub const MAX_CODE_LEN: usize = 20;
pub const MAX_NAME_LEN: usize = 100;
pub const MAX_SCHEDULE_LEN: usize = 50;
pub const MIN_CREDITS: i32 = 1;
pub const MAX_CREDITS: i32 = 10;

/// Persisted course record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub credits: i32,
    pub schedule: String,
}

impl Course {
    pub fn apply(&mut self, input: CourseInput) {
        self.code = input.code;
        self.name = input.name;
        self.credits = input.credits;
        self.schedule = input.schedule;
    }
}

/// Raw request body for create and update
#[derive(Debug, Clone, Deserialize)]
pub struct CourseRequest {
    pub code: String,
    pub name: String,
    /// Wider than the stored column so oversized numbers reach the range check
    pub credits: i64,
    #[serde(default)]
    pub schedule: String,
}

/// Validated course fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseInput {
    pub code: String,
    pub name: String,
    pub credits: i32,
    pub schedule: String,
}

impl CourseInput {
    pub fn new(req: CourseRequest) -> Result<Self, ValidationError> {
        Ok(Self {
            code: text("code", &req.code, MAX_CODE_LEN)?,
            name: text("name", &req.name, MAX_NAME_LEN)?,
            credits: in_range("credits", req.credits, MIN_CREDITS, MAX_CREDITS)?,
            schedule: text("schedule", &req.schedule, MAX_SCHEDULE_LEN)?,
        })
    }
}

impl TryFrom<CourseRequest> for CourseInput {
    type Error = ValidationError;

    fn try_from(req: CourseRequest) -> Result<Self, Self::Error> {
        Self::new(req)
    }
}

/// List filter for courses: exact credits and/or code substring
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CourseFilter {
    pub credits: Option<i32>,
    pub code: Option<String>,
}

impl CourseFilter {
    /// Drop zero credits and empty code fragments.
    pub fn normalized(self) -> Self {
        Self {
            credits: self.credits.filter(|c| *c != 0),
            code: self.code.filter(|c| !c.is_empty()),
        }
    }

    pub fn matches(&self, course: &Course) -> bool {
        self.credits.map_or(true, |c| course.credits == c)
            && self
                .code
                .as_deref()
                .map_or(true, |fragment| course.code.contains(fragment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(code: &str, credits: i32) -> Course {
        Course {
            id: 1,
            code: code.into(),
            name: "Intro".into(),
            credits,
            schedule: "Mon 08:00".into(),
        }
    }

    fn request(credits: i64) -> CourseRequest {
        CourseRequest {
            code: "CS101".into(),
            name: "Intro to Programming".into(),
            credits,
            schedule: "Mon/Wed 08:00-10:00".into(),
        }
    }

    #[test]
    fn credits_bounds() {
        assert!(CourseInput::new(request(1)).is_ok());
        assert!(CourseInput::new(request(10)).is_ok());
        assert!(matches!(
            CourseInput::new(request(0)).unwrap_err(),
            ValidationError::OutOfRange { field: "credits", .. }
        ));
        assert!(CourseInput::new(request(11)).is_err());
    }

    #[test]
    fn schedule_may_be_empty() {
        let mut req = request(4);
        req.schedule = String::new();
        assert_eq!(CourseInput::new(req).unwrap().schedule, "");
    }

    #[test]
    fn code_is_stored_verbatim() {
        let mut req = request(4);
        req.code = "  ".into();
        assert_eq!(CourseInput::new(req).unwrap().code, "  ");
    }

    #[test]
    fn rejects_long_schedule() {
        let mut req = request(4);
        req.schedule = "x".repeat(MAX_SCHEDULE_LEN + 1);
        assert_eq!(
            CourseInput::new(req).unwrap_err(),
            ValidationError::TooLong { field: "schedule", max: MAX_SCHEDULE_LEN }
        );
    }

    #[test]
    fn oversized_credits_are_out_of_range() {
        assert_eq!(
            CourseInput::new(request(5_000_000_000)).unwrap_err(),
            ValidationError::OutOfRange {
                field: "credits",
                min: 1,
                max: 10,
                value: 5_000_000_000,
            }
        );
    }

    #[test]
    fn filter_combines_credits_and_code() {
        let filter = CourseFilter {
            credits: Some(4),
            code: Some("CS".into()),
        };
        assert!(filter.matches(&course("CS101", 4)));
        assert!(!filter.matches(&course("CS101", 3)));
        assert!(!filter.matches(&course("MA101", 4)));
    }

    #[test]
    fn code_filter_is_substring() {
        let filter = CourseFilter {
            credits: None,
            code: Some("10".into()),
        };
        assert!(filter.matches(&course("CS101", 4)));
        assert!(filter.matches(&course("MA210", 2)));
        assert!(!filter.matches(&course("PH300", 2)));
    }

    #[test]
    fn normalized_drops_empty_values() {
        let filter = CourseFilter {
            credits: Some(0),
            code: Some(String::new()),
        }
        .normalized();
        assert_eq!(filter, CourseFilter::default());
    }
}
