//! Field-level validation shared by the entity input types.
//!
//! Every failing field is collected before reporting, so a client sees all
//! problems with a payload at once. The combined error carries the messages
//! joined with `, ` and a `details.fields` array of `{field, message}`.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::json;

use super::Error;

/// One failing field and its message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// JSON name of the offending field.
    pub field: &'static str,
    /// Client-facing message.
    pub message: String,
}

/// Accumulator for field validation failures.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    /// Start an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `field`.
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Record a failure when `ok` is false.
    pub fn check(&mut self, ok: bool, field: &'static str, message: impl Into<String>) {
        if !ok {
            self.push(field, message);
        }
    }

    /// Require a non-blank string, returning its trimmed form.
    pub fn required_text(
        &mut self,
        value: Option<String>,
        field: &'static str,
        message: &str,
    ) -> Option<String> {
        match value.map(|raw| raw.trim().to_owned()) {
            Some(trimmed) if !trimmed.is_empty() => Some(trimmed),
            _ => {
                self.push(field, message);
                None
            }
        }
    }

    /// Require a present value.
    pub fn required<T>(&mut self, value: Option<T>, field: &'static str, message: &str) -> Option<T> {
        if value.is_none() {
            self.push(field, message);
        }
        value
    }

    /// Whether no failures were recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Recorded failures in insertion order.
    pub fn as_slice(&self) -> &[FieldError] {
        &self.0
    }

    /// Finish validation, producing an [`Error`] when anything failed.
    ///
    /// # Examples
    /// ```
    /// use devcamper::domain::FieldErrors;
    ///
    /// let mut errors = FieldErrors::new();
    /// errors.push("name", "Please add a name");
    /// errors.push("description", "Please add a description");
    /// let err = errors.finish().unwrap_err();
    /// assert_eq!(err.message(), "Please add a name, Please add a description");
    /// ```
    pub fn finish(self) -> Result<(), Error> {
        if self.0.is_empty() {
            return Ok(());
        }
        let message = self
            .0
            .iter()
            .map(|error| error.message.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Err(Error::invalid_request(message).with_details(json!({ "fields": self.0 })))
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static WEBSITE_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        let pattern = r"^[^\s@<>()\[\]\\.,;:]+(\.[^\s@<>()\[\]\\.,;:]+)*@([A-Za-z0-9-]+\.)+[A-Za-z]{2,}$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

fn website_regex() -> &'static Regex {
    WEBSITE_RE.get_or_init(|| {
        let pattern = r"^https?://(www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b([-a-zA-Z0-9()@:%_+.~#?&/=]*)$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("website regex failed to compile: {error}"))
    })
}

/// Longest email address accepted.
pub const EMAIL_MAX: usize = 254;

/// Longest website URL accepted.
pub const WEBSITE_MAX: usize = 255;

/// Whether `value` looks like a deliverable email address.
pub fn is_valid_email(value: &str) -> bool {
    char_len(value) <= EMAIL_MAX && email_regex().is_match(value)
}

/// Whether `value` is an absolute http or https URL.
pub fn is_valid_website(value: &str) -> bool {
    website_regex().is_match(value)
}

/// Count characters rather than bytes for length limits.
pub(crate) fn char_len(value: &str) -> usize {
    value.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    fn finish_is_ok_when_nothing_recorded() {
        assert!(FieldErrors::new().finish().is_ok());
    }

    #[rstest]
    fn finish_collects_every_field() {
        let mut errors = FieldErrors::new();
        errors.check(false, "title", "Please add a course title");
        errors.check(true, "weeks", "unused");
        errors.push("tuition", "Please add a tuition cost");

        let err = errors.finish().expect_err("validation fails");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            err.message(),
            "Please add a course title, Please add a tuition cost"
        );
        let fields = err
            .details()
            .and_then(|details| details.get("fields"))
            .and_then(|fields| fields.as_array())
            .expect("fields array");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0]["field"], "title");
    }

    #[rstest]
    fn required_text_trims_and_rejects_blank() {
        let mut errors = FieldErrors::new();
        assert_eq!(
            errors.required_text(Some("  Devworks  ".into()), "name", "Please add a name"),
            Some("Devworks".to_owned())
        );
        assert_eq!(errors.required_text(Some("   ".into()), "name", "Please add a name"), None);
        assert_eq!(errors.as_slice().len(), 1);
    }

    #[rstest]
    #[case("john@gmail.com", true)]
    #[case("first.last@sub.example.co", true)]
    #[case("no-at-sign.com", false)]
    #[case("a@b", false)]
    #[case("spaces in@example.com", false)]
    #[case(&format!("{}@example.com", "a".repeat(250)), false)]
    fn validates_emails(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(is_valid_email(value), expected);
    }

    #[rstest]
    #[case("https://devworks.com", true)]
    #[case("http://www.example.org/path?q=1", true)]
    #[case("ftp://example.org", false)]
    #[case("devworks.com", false)]
    fn validates_websites(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(is_valid_website(value), expected);
    }
}
