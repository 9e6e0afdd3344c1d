//! Courses offered by a bootcamp.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::access::Owned;
use super::listing::{FieldValue, Listable};
use super::validation::{FieldErrors, char_len};
use super::{BootcampId, CourseId, Error, UserId};

/// Longest course title accepted.
pub const TITLE_MAX: usize = 255;

/// Most weeks a course may run; the store keeps weeks as a signed 32-bit value.
pub const WEEKS_MAX: u32 = i32::MAX.unsigned_abs();

/// Minimum skill expected from a course's students.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Skill {
    Beginner,
    Intermediate,
    Advanced,
}

impl Skill {
    /// Lower-case wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    /// Parse a wire name.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Editable course attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetails {
    pub title: String,
    pub description: String,
    pub weeks: u32,
    pub tuition: f64,
    pub minimum_skill: Skill,
    pub scholarship_available: bool,
}

/// Stored course.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    pub bootcamp: BootcampId,
    pub user: UserId,
    #[serde(flatten)]
    pub details: CourseDetails,
    pub created_at: DateTime<Utc>,
}

impl Owned for Course {
    fn owner(&self) -> UserId {
        self.user
    }
}

impl Listable for Course {
    const FIELDS: &'static [&'static str] = &[
        "id",
        "bootcamp",
        "user",
        "title",
        "description",
        "weeks",
        "tuition",
        "minimumSkill",
        "scholarshipAvailable",
        "createdAt",
    ];

    fn field(&self, name: &str) -> Option<FieldValue> {
        let details = &self.details;
        match name {
            "id" => Some(FieldValue::Text(self.id.to_string())),
            "bootcamp" => Some(FieldValue::Text(self.bootcamp.to_string())),
            "user" => Some(FieldValue::Text(self.user.to_string())),
            "title" => Some(FieldValue::Text(details.title.clone())),
            "description" => Some(FieldValue::Text(details.description.clone())),
            "weeks" => Some(FieldValue::Number(f64::from(details.weeks))),
            "tuition" => Some(FieldValue::Number(details.tuition)),
            "minimumSkill" => Some(FieldValue::Text(details.minimum_skill.as_str().to_owned())),
            "scholarshipAvailable" => Some(FieldValue::Bool(details.scholarship_available)),
            "createdAt" => Some(FieldValue::Timestamp(self.created_at)),
            _ => None,
        }
    }
}

/// Raw course input for both creation and partial update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub weeks: Option<u32>,
    pub tuition: Option<f64>,
    pub minimum_skill: Option<String>,
    pub scholarship_available: Option<bool>,
}

impl CourseInput {
    /// Validate input for a new course; every field but
    /// `scholarshipAvailable` is required.
    pub fn validate_new(self) -> Result<CourseDetails, Error> {
        self.validate_over(None)
    }

    /// Merge the supplied fields over `current` and validate the result.
    pub fn validate_change(self, current: &CourseDetails) -> Result<CourseDetails, Error> {
        self.validate_over(Some(current))
    }

    fn validate_over(self, current: Option<&CourseDetails>) -> Result<CourseDetails, Error> {
        let mut errors = FieldErrors::new();
        let title = errors.required_text(
            self.title.or_else(|| current.map(|c| c.title.clone())),
            "title",
            "Please add a course title",
        );
        if let Some(title) = &title {
            errors.check(
                char_len(title) <= TITLE_MAX,
                "title",
                format!("Title can not be more than {TITLE_MAX} characters"),
            );
        }
        let description = errors.required_text(
            self.description
                .or_else(|| current.map(|c| c.description.clone())),
            "description",
            "Please add a description",
        );
        let weeks = errors.required(
            self.weeks.or_else(|| current.map(|c| c.weeks)),
            "weeks",
            "Please add number of weeks",
        );
        if let Some(weeks) = weeks {
            errors.check(weeks >= 1, "weeks", "Number of weeks must be at least 1");
            errors.check(
                weeks <= WEEKS_MAX,
                "weeks",
                format!("Number of weeks can not be more than {WEEKS_MAX}"),
            );
        }
        let tuition = errors.required(
            self.tuition.or_else(|| current.map(|c| c.tuition)),
            "tuition",
            "Please add a tuition cost",
        );
        if let Some(tuition) = tuition {
            errors.check(
                tuition.is_finite() && tuition >= 0.0,
                "tuition",
                "Tuition must be a non-negative number",
            );
        }
        let minimum_skill = match self.minimum_skill {
            Some(raw) => {
                let skill = Skill::parse(raw.trim());
                if skill.is_none() {
                    errors.push("minimumSkill", format!("`{raw}` is not a valid skill level"));
                }
                skill
            }
            None => errors.required(
                current.map(|c| c.minimum_skill),
                "minimumSkill",
                "Please add a minimum skill",
            ),
        };
        let scholarship_available = self
            .scholarship_available
            .or_else(|| current.map(|c| c.scholarship_available))
            .unwrap_or(false);
        errors.finish()?;

        match (title, description, weeks, tuition, minimum_skill) {
            (Some(title), Some(description), Some(weeks), Some(tuition), Some(minimum_skill)) => {
                Ok(CourseDetails {
                    title,
                    description,
                    weeks,
                    tuition,
                    minimum_skill,
                    scholarship_available,
                })
            }
            _ => Err(Error::internal("course validation produced incomplete input")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn valid_input() -> CourseInput {
        CourseInput {
            title: Some(" Front End Web Development ".into()),
            description: Some("HTML, CSS and JavaScript".into()),
            weeks: Some(8),
            tuition: Some(8000.0),
            minimum_skill: Some("beginner".into()),
            scholarship_available: None,
        }
    }

    #[rstest]
    fn new_course_trims_and_defaults() {
        let details = valid_input().validate_new().expect("valid input");
        assert_eq!(details.title, "Front End Web Development");
        assert_eq!(details.minimum_skill, Skill::Beginner);
        assert!(!details.scholarship_available);
    }

    #[rstest]
    fn new_course_reports_every_missing_field() {
        let err = CourseInput::default()
            .validate_new()
            .expect_err("empty input");
        assert_eq!(
            err.message(),
            "Please add a course title, Please add a description, Please add number of weeks, \
             Please add a tuition cost, Please add a minimum skill"
        );
    }

    #[rstest]
    #[case::zero_weeks(CourseInput { weeks: Some(0), ..valid_input() }, "Number of weeks must be at least 1")]
    #[case::negative_tuition(CourseInput { tuition: Some(-1.0), ..valid_input() }, "Tuition must be a non-negative number")]
    #[case::long_title(CourseInput { title: Some("x".repeat(TITLE_MAX + 1)), ..valid_input() }, "Title can not be more than 255 characters")]
    #[case::too_many_weeks(CourseInput { weeks: Some(u32::MAX), ..valid_input() }, "Number of weeks can not be more than 2147483647")]
    #[case::bad_skill(CourseInput { minimum_skill: Some("expert".into()), ..valid_input() }, "`expert` is not a valid skill level")]
    fn rejects_invalid_fields(#[case] input: CourseInput, #[case] message: &str) {
        let err = input.validate_new().expect_err("invalid input");
        assert_eq!(err.message(), message);
    }

    #[rstest]
    fn change_merges_over_current() {
        let current = valid_input().validate_new().expect("valid input");
        let changed = CourseInput {
            tuition: Some(9500.0),
            scholarship_available: Some(true),
            ..CourseInput::default()
        }
        .validate_change(&current)
        .expect("valid change");
        assert_eq!(changed.title, current.title);
        assert_eq!(changed.weeks, 8);
        assert!((changed.tuition - 9500.0).abs() < f64::EPSILON);
        assert!(changed.scholarship_available);
    }

    #[rstest]
    fn change_rejects_blank_title() {
        let current = valid_input().validate_new().expect("valid input");
        let err = CourseInput {
            title: Some("  ".into()),
            ..CourseInput::default()
        }
        .validate_change(&current)
        .expect_err("blank title");
        assert_eq!(err.message(), "Please add a course title");
    }
}
