//! Reviews left on a bootcamp by its students.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::access::Owned;
use super::listing::{FieldValue, Listable};
use super::validation::{FieldErrors, char_len};
use super::{BootcampId, Error, ReviewId, UserId};

/// Longest accepted review title.
pub const TITLE_MAX: usize = 100;
/// Lowest accepted rating.
pub const RATING_MIN: u8 = 1;
/// Highest accepted rating.
pub const RATING_MAX: u8 = 10;

/// Editable review attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewContent {
    pub title: String,
    pub text: String,
    pub rating: u8,
}

/// Stored review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub bootcamp: BootcampId,
    pub user: UserId,
    #[serde(flatten)]
    pub content: ReviewContent,
    pub created_at: DateTime<Utc>,
}

impl Owned for Review {
    fn owner(&self) -> UserId {
        self.user
    }
}

impl Listable for Review {
    const FIELDS: &'static [&'static str] =
        &["id", "bootcamp", "user", "title", "text", "rating", "createdAt"];

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::Text(self.id.to_string())),
            "bootcamp" => Some(FieldValue::Text(self.bootcamp.to_string())),
            "user" => Some(FieldValue::Text(self.user.to_string())),
            "title" => Some(FieldValue::Text(self.content.title.clone())),
            "text" => Some(FieldValue::Text(self.content.text.clone())),
            "rating" => Some(FieldValue::Number(f64::from(self.content.rating))),
            "createdAt" => Some(FieldValue::Timestamp(self.created_at)),
            _ => None,
        }
    }
}

/// Raw review input for both creation and partial update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewInput {
    pub title: Option<String>,
    pub text: Option<String>,
    pub rating: Option<i64>,
}

impl ReviewInput {
    /// Validate input for a new review; all fields are required.
    pub fn validate_new(self) -> Result<ReviewContent, Error> {
        self.validate_over(None)
    }

    /// Merge the supplied fields over `current` and validate the result.
    pub fn validate_change(self, current: &ReviewContent) -> Result<ReviewContent, Error> {
        self.validate_over(Some(current))
    }

    fn validate_over(self, current: Option<&ReviewContent>) -> Result<ReviewContent, Error> {
        let mut errors = FieldErrors::new();
        let title = errors.required_text(
            self.title.or_else(|| current.map(|c| c.title.clone())),
            "title",
            "Please add a title for the review",
        );
        if let Some(title) = &title {
            errors.check(
                char_len(title) <= TITLE_MAX,
                "title",
                format!("Title can not be more than {TITLE_MAX} characters"),
            );
        }
        let text = errors.required_text(
            self.text.or_else(|| current.map(|c| c.text.clone())),
            "text",
            "Please add some text",
        );
        let rating = errors
            .required(
                self.rating
                    .or_else(|| current.map(|c| i64::from(c.rating))),
                "rating",
                "Please add a rating between 1 and 10",
            )
            .and_then(|raw| {
                let rating = u8::try_from(raw)
                    .ok()
                    .filter(|value| (RATING_MIN..=RATING_MAX).contains(value));
                if rating.is_none() {
                    errors.push(
                        "rating",
                        format!("Rating must be between {RATING_MIN} and {RATING_MAX}"),
                    );
                }
                rating
            });
        errors.finish()?;

        match (title, text, rating) {
            (Some(title), Some(text), Some(rating)) => Ok(ReviewContent {
                title,
                text,
                rating,
            }),
            _ => Err(Error::internal("review validation produced incomplete input")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn valid_input() -> ReviewInput {
        ReviewInput {
            title: Some("Learned a ton!".into()),
            text: Some("Great instructors and material.".into()),
            rating: Some(8),
        }
    }

    #[rstest]
    fn accepts_valid_review() {
        let content = valid_input().validate_new().expect("valid input");
        assert_eq!(content.rating, 8);
    }

    #[rstest]
    #[case(0)]
    #[case(11)]
    #[case(-3)]
    #[case(300)]
    fn rejects_out_of_range_ratings(#[case] rating: i64) {
        let err = ReviewInput {
            rating: Some(rating),
            ..valid_input()
        }
        .validate_new()
        .expect_err("rating out of range");
        assert_eq!(err.message(), "Rating must be between 1 and 10");
    }

    #[rstest]
    fn rejects_long_titles() {
        let err = ReviewInput {
            title: Some("x".repeat(TITLE_MAX + 1)),
            ..valid_input()
        }
        .validate_new()
        .expect_err("title too long");
        assert_eq!(err.message(), "Title can not be more than 100 characters");
    }

    #[rstest]
    fn reports_every_missing_field() {
        let err = ReviewInput::default()
            .validate_new()
            .expect_err("empty input");
        assert_eq!(
            err.message(),
            "Please add a title for the review, Please add some text, Please add a rating between 1 and 10"
        );
    }

    #[rstest]
    fn change_keeps_unspecified_fields() {
        let current = valid_input().validate_new().expect("valid input");
        let changed = ReviewInput {
            rating: Some(3),
            ..ReviewInput::default()
        }
        .validate_change(&current)
        .expect("valid change");
        assert_eq!(changed.title, current.title);
        assert_eq!(changed.rating, 3);
    }
}
