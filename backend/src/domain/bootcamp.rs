//! Bootcamp entity and the input accepted to create or update one.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::access::Owned;
use super::geo::Location;
use super::listing::{FieldValue, Listable};
use super::slug::{is_valid_slug, slugify};
use super::validation::{FieldErrors, WEBSITE_MAX, char_len, is_valid_website};
use super::{BootcampId, EmailAddress, Error, UserId};

/// Longest accepted bootcamp name.
pub const NAME_MAX: usize = 50;
/// Longest accepted description.
pub const DESCRIPTION_MAX: usize = 500;
/// Longest accepted phone number.
pub const PHONE_MAX: usize = 20;
/// Photo assigned until one is uploaded.
pub const DEFAULT_PHOTO: &str = "no-photo.jpg";

/// Career track offered by a bootcamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Career {
    #[serde(rename = "Web Development")]
    WebDevelopment,
    #[serde(rename = "Mobile Development")]
    MobileDevelopment,
    #[serde(rename = "UI/UX")]
    UiUx,
    #[serde(rename = "Data Science")]
    DataScience,
    Business,
    Other,
}

impl Career {
    /// Every career, in display order.
    pub const ALL: [Self; 6] = [
        Self::WebDevelopment,
        Self::MobileDevelopment,
        Self::UiUx,
        Self::DataScience,
        Self::Business,
        Self::Other,
    ];

    /// Display label, also used on the wire.
    pub fn label(self) -> &'static str {
        match self {
            Self::WebDevelopment => "Web Development",
            Self::MobileDevelopment => "Mobile Development",
            Self::UiUx => "UI/UX",
            Self::DataScience => "Data Science",
            Self::Business => "Business",
            Self::Other => "Other",
        }
    }

    /// Parse a display label.
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|career| career.label() == label)
    }
}

impl fmt::Display for Career {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Publisher-editable bootcamp attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BootcampProfile {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<EmailAddress>,
    pub careers: Vec<Career>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_cost: Option<f64>,
    pub housing: bool,
    pub job_assistance: bool,
    pub job_guarantee: bool,
    pub accept_gi: bool,
}

/// Stored bootcamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bootcamp {
    pub id: BootcampId,
    pub user: UserId,
    pub slug: String,
    #[serde(flatten)]
    pub profile: BootcampProfile,
    pub location: Location,
    pub photo: String,
    pub created_at: DateTime<Utc>,
}

impl Bootcamp {
    /// Assemble a new bootcamp, deriving its slug from the name.
    pub fn new(
        id: BootcampId,
        user: UserId,
        profile: BootcampProfile,
        location: Location,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user,
            slug: slugify(&profile.name),
            profile,
            location,
            photo: DEFAULT_PHOTO.to_owned(),
            created_at,
        }
    }

    /// Replace the profile, re-deriving the slug only when the name changed.
    pub fn set_profile(&mut self, profile: BootcampProfile) {
        if profile.name != self.profile.name {
            self.slug = slugify(&profile.name);
        }
        self.profile = profile;
    }
}

impl Owned for Bootcamp {
    fn owner(&self) -> UserId {
        self.user
    }
}

impl Listable for Bootcamp {
    const FIELDS: &'static [&'static str] = &[
        "id",
        "user",
        "name",
        "slug",
        "description",
        "website",
        "phone",
        "email",
        "careers",
        "averageRating",
        "averageCost",
        "photo",
        "housing",
        "jobAssistance",
        "jobGuarantee",
        "acceptGi",
        "createdAt",
        "location",
        "location.city",
        "location.state",
        "location.zipcode",
        "location.country",
        "location.countryCode",
    ];

    fn field(&self, name: &str) -> Option<FieldValue> {
        let text = |value: &str| Some(FieldValue::Text(value.to_owned()));
        let profile = &self.profile;
        let location = &self.location;
        match name {
            "id" => text(&self.id.to_string()),
            "user" => text(&self.user.to_string()),
            "name" => text(&profile.name),
            "slug" => text(&self.slug),
            "description" => text(&profile.description),
            "website" => profile.website.as_deref().and_then(text),
            "phone" => profile.phone.as_deref().and_then(text),
            "email" => profile.email.as_ref().and_then(|email| text(email.as_ref())),
            "careers" => Some(FieldValue::List(
                profile
                    .careers
                    .iter()
                    .map(|career| career.label().to_owned())
                    .collect(),
            )),
            "averageRating" => profile.average_rating.map(FieldValue::Number),
            "averageCost" => profile.average_cost.map(FieldValue::Number),
            "photo" => text(&self.photo),
            "housing" => Some(FieldValue::Bool(profile.housing)),
            "jobAssistance" => Some(FieldValue::Bool(profile.job_assistance)),
            "jobGuarantee" => Some(FieldValue::Bool(profile.job_guarantee)),
            "acceptGi" => Some(FieldValue::Bool(profile.accept_gi)),
            "createdAt" => Some(FieldValue::Timestamp(self.created_at)),
            "location" => text(&location.formatted_address),
            "location.city" => location.city.as_deref().and_then(text),
            "location.state" => location.state.as_deref().and_then(text),
            "location.zipcode" => location.zipcode.as_deref().and_then(text),
            "location.country" => location.country.as_deref().and_then(text),
            "location.countryCode" => location.country_code.as_deref().and_then(text),
            _ => None,
        }
    }
}

/// Raw bootcamp input for both creation and partial update.
///
/// `address` is geocoded into the stored location and never persisted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootcampInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub careers: Option<Vec<String>>,
    pub average_rating: Option<f64>,
    pub average_cost: Option<f64>,
    pub housing: Option<bool>,
    pub job_assistance: Option<bool>,
    pub job_guarantee: Option<bool>,
    pub accept_gi: Option<bool>,
}

/// Validated input for a new bootcamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBootcamp {
    pub profile: BootcampProfile,
    pub address: String,
}

/// Validated change to an existing bootcamp.
#[derive(Debug, Clone, PartialEq)]
pub struct BootcampChange {
    pub profile: BootcampProfile,
    /// New address to geocode; `None` keeps the stored location.
    pub address: Option<String>,
}

impl BootcampInput {
    /// Validate input for creation; `name`, `description`, `address` and
    /// `careers` are required.
    pub fn validate_new(self) -> Result<NewBootcamp, Error> {
        let mut errors = FieldErrors::new();
        let address = errors.required_text(self.address.clone(), "address", "Please add an address");
        let candidate = Candidate {
            name: self.name,
            description: self.description,
            website: self.website,
            phone: self.phone,
            email: self.email,
            careers: self.careers,
            average_rating: self.average_rating,
            average_cost: self.average_cost,
            housing: self.housing.unwrap_or(false),
            job_assistance: self.job_assistance.unwrap_or(false),
            job_guarantee: self.job_guarantee.unwrap_or(false),
            accept_gi: self.accept_gi.unwrap_or(false),
        };
        let profile = candidate.validate(&mut errors);
        errors.finish()?;
        match (profile, address) {
            (Some(profile), Some(address)) => Ok(NewBootcamp { profile, address }),
            _ => Err(Error::internal("bootcamp validation produced incomplete input")),
        }
    }

    /// Merge the supplied fields over `current` and validate the result.
    pub fn validate_change(self, current: &BootcampProfile) -> Result<BootcampChange, Error> {
        let mut errors = FieldErrors::new();
        let address = match self.address {
            Some(raw) => errors.required_text(Some(raw), "address", "Please add an address"),
            None => None,
        };
        let candidate = Candidate {
            name: Some(self.name.unwrap_or_else(|| current.name.clone())),
            description: Some(
                self.description
                    .unwrap_or_else(|| current.description.clone()),
            ),
            website: self.website.or_else(|| current.website.clone()),
            phone: self.phone.or_else(|| current.phone.clone()),
            email: self
                .email
                .or_else(|| current.email.as_ref().map(ToString::to_string)),
            careers: Some(self.careers.unwrap_or_else(|| {
                current
                    .careers
                    .iter()
                    .map(|career| career.label().to_owned())
                    .collect()
            })),
            average_rating: self.average_rating.or(current.average_rating),
            average_cost: self.average_cost.or(current.average_cost),
            housing: self.housing.unwrap_or(current.housing),
            job_assistance: self.job_assistance.unwrap_or(current.job_assistance),
            job_guarantee: self.job_guarantee.unwrap_or(current.job_guarantee),
            accept_gi: self.accept_gi.unwrap_or(current.accept_gi),
        };
        let profile = candidate.validate(&mut errors);
        errors.finish()?;
        profile
            .map(|profile| BootcampChange { profile, address })
            .ok_or_else(|| Error::internal("bootcamp validation produced incomplete input"))
    }
}

struct Candidate {
    name: Option<String>,
    description: Option<String>,
    website: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    careers: Option<Vec<String>>,
    average_rating: Option<f64>,
    average_cost: Option<f64>,
    housing: bool,
    job_assistance: bool,
    job_guarantee: bool,
    accept_gi: bool,
}

impl Candidate {
    fn validate(self, errors: &mut FieldErrors) -> Option<BootcampProfile> {
        let name = errors.required_text(self.name, "name", "Please add a name");
        if let Some(name) = &name {
            errors.check(
                char_len(name) <= NAME_MAX,
                "name",
                format!("Name can not be more than {NAME_MAX} characters"),
            );
            errors.check(
                is_valid_slug(&slugify(name)),
                "name",
                "Name must contain at least one letter or digit",
            );
        }

        let description =
            errors.required_text(self.description, "description", "Please add a description");
        if let Some(description) = &description {
            errors.check(
                char_len(description) <= DESCRIPTION_MAX,
                "description",
                format!("Description can not be more than {DESCRIPTION_MAX} characters"),
            );
        }

        let website = non_blank(self.website);
        if let Some(website) = &website {
            errors.check(
                is_valid_website(website),
                "website",
                "Please use a valid URL with HTTP or HTTPS",
            );
            errors.check(
                char_len(website) <= WEBSITE_MAX,
                "website",
                format!("Website can not be more than {WEBSITE_MAX} characters"),
            );
        }

        let phone = non_blank(self.phone);
        if let Some(phone) = &phone {
            errors.check(
                char_len(phone) <= PHONE_MAX,
                "phone",
                format!("Phone number can not be longer than {PHONE_MAX} characters"),
            );
        }

        let email = match non_blank(self.email).map(EmailAddress::new) {
            None => None,
            Some(Ok(email)) => Some(email),
            Some(Err(err)) => {
                errors.push("email", err.to_string());
                None
            }
        };

        let careers = parse_careers(errors, self.careers);

        if let Some(rating) = self.average_rating {
            errors.check(rating >= 1.0, "averageRating", "Rating must be at least 1");
            errors.check(
                rating <= 10.0,
                "averageRating",
                "Rating can not be more than 10",
            );
        }
        if let Some(cost) = self.average_cost {
            errors.check(
                cost.is_finite() && cost >= 0.0,
                "averageCost",
                "Average cost must be a non-negative number",
            );
        }

        if !errors.is_empty() {
            return None;
        }
        Some(BootcampProfile {
            name: name?,
            description: description?,
            website,
            phone,
            email,
            careers: careers?,
            average_rating: self.average_rating,
            average_cost: self.average_cost,
            housing: self.housing,
            job_assistance: self.job_assistance,
            job_guarantee: self.job_guarantee,
            accept_gi: self.accept_gi,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}

fn parse_careers(errors: &mut FieldErrors, raw: Option<Vec<String>>) -> Option<Vec<Career>> {
    let labels = raw.filter(|labels| !labels.is_empty());
    let Some(labels) = labels else {
        errors.push("careers", "Please add at least one career");
        return None;
    };
    let mut careers = Vec::with_capacity(labels.len());
    for label in labels {
        match Career::parse(label.trim()) {
            Some(career) if !careers.contains(&career) => careers.push(career),
            Some(_) => {}
            None => errors.push("careers", format!("`{label}` is not a valid career")),
        }
    }
    Some(careers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GeoPoint;
    use rstest::rstest;

    fn valid_input() -> BootcampInput {
        BootcampInput {
            name: Some("  Devworks Bootcamp ".into()),
            description: Some("Full stack web development".into()),
            website: Some("https://devworks.com".into()),
            phone: Some("(111) 111-1111".into()),
            email: Some("enroll@devworks.com".into()),
            address: Some("233 Bay State Rd Boston MA 02215".into()),
            careers: Some(vec!["Web Development".into(), "UI/UX".into()]),
            housing: Some(true),
            ..BootcampInput::default()
        }
    }

    fn location() -> Location {
        Location {
            point: GeoPoint::new(42.35, -71.1).expect("valid point"),
            formatted_address: "233 Bay State Rd, Boston, MA 02215, US".into(),
            street: None,
            city: Some("Boston".into()),
            state: Some("MA".into()),
            zipcode: Some("02215".into()),
            country: None,
            country_code: Some("US".into()),
        }
    }

    fn bootcamp(input: BootcampInput) -> Bootcamp {
        let new = input.validate_new().expect("valid input");
        Bootcamp::new(
            BootcampId::random(),
            UserId::random(),
            new.profile,
            location(),
            Utc::now(),
        )
    }

    #[rstest]
    fn new_bootcamp_derives_slug_and_defaults() {
        let input = valid_input();
        let bootcamp = bootcamp(input);
        assert_eq!(bootcamp.profile.name, "Devworks Bootcamp");
        assert_eq!(bootcamp.slug, "devworks-bootcamp");
        assert_eq!(bootcamp.photo, DEFAULT_PHOTO);
        assert!(bootcamp.profile.housing);
        assert!(!bootcamp.profile.accept_gi);
    }

    #[rstest]
    fn create_requires_core_fields() {
        let err = BootcampInput::default()
            .validate_new()
            .expect_err("empty input");
        assert_eq!(
            err.message(),
            "Please add an address, Please add a name, Please add a description, Please add at least one career"
        );
    }

    #[rstest]
    #[case::long_name(BootcampInput { name: Some("x".repeat(51)), ..valid_input() }, "Name can not be more than 50 characters")]
    #[case::bad_site(BootcampInput { website: Some("devworks.com".into()), ..valid_input() }, "Please use a valid URL with HTTP or HTTPS")]
    #[case::long_phone(BootcampInput { phone: Some("1".repeat(21)), ..valid_input() }, "Phone number can not be longer than 20 characters")]
    #[case::bad_email(BootcampInput { email: Some("enroll".into()), ..valid_input() }, "Please add a valid email")]
    #[case::bad_career(BootcampInput { careers: Some(vec!["Cooking".into()]), ..valid_input() }, "`Cooking` is not a valid career")]
    #[case::low_rating(BootcampInput { average_rating: Some(0.5), ..valid_input() }, "Rating must be at least 1")]
    #[case::high_rating(BootcampInput { average_rating: Some(11.0), ..valid_input() }, "Rating can not be more than 10")]
    fn create_rejects_invalid_fields(#[case] input: BootcampInput, #[case] message: &str) {
        let err = input.validate_new().expect_err("invalid input");
        assert_eq!(err.message(), message);
    }

    #[rstest]
    fn change_keeps_slug_when_name_unchanged() {
        let input = valid_input();
        let mut bootcamp = bootcamp(input);
        let change = BootcampInput {
            description: Some("Updated".into()),
            ..BootcampInput::default()
        }
        .validate_change(&bootcamp.profile)
        .expect("valid change");
        assert!(change.address.is_none());
        bootcamp.set_profile(change.profile);
        assert_eq!(bootcamp.slug, "devworks-bootcamp");
        assert_eq!(bootcamp.profile.description, "Updated");
        assert_eq!(bootcamp.profile.careers, vec![Career::WebDevelopment, Career::UiUx]);
    }

    #[rstest]
    fn change_rederives_slug_on_rename() {
        let input = valid_input();
        let mut bootcamp = bootcamp(input);
        let change = BootcampInput {
            name: Some("Codemasters Academy".into()),
            ..BootcampInput::default()
        }
        .validate_change(&bootcamp.profile)
        .expect("valid change");
        bootcamp.set_profile(change.profile);
        assert_eq!(bootcamp.slug, "codemasters-academy");
    }

    #[rstest]
    #[case("Академия Кода")]
    #[case("コードキャンプ")]
    fn non_latin_names_get_transliterated_slugs(#[case] name: &str) {
        let bootcamp = bootcamp(BootcampInput {
            name: Some(name.into()),
            ..valid_input()
        });
        assert!(!bootcamp.slug.is_empty());
        assert!(bootcamp.slug.is_ascii());
    }

    #[rstest]
    fn symbol_only_names_are_rejected() {
        let err = BootcampInput {
            name: Some("!!! ???".into()),
            ..valid_input()
        }
        .validate_new()
        .expect_err("no slug");
        assert_eq!(err.message(), "Name must contain at least one letter or digit");
    }

    #[rstest]
    fn change_rejects_blank_address() {
        let input = valid_input();
        let bootcamp = bootcamp(input);
        let err = BootcampInput {
            address: Some("   ".into()),
            ..BootcampInput::default()
        }
        .validate_change(&bootcamp.profile)
        .expect_err("blank address");
        assert_eq!(err.message(), "Please add an address");
    }

    #[rstest]
    fn serialises_flat_camel_case() {
        let input = valid_input();
        let value = serde_json::to_value(bootcamp(input)).expect("serialises");
        assert_eq!(value["name"], "Devworks Bootcamp");
        assert_eq!(value["careers"][1], "UI/UX");
        assert_eq!(value["jobGuarantee"], false);
        assert!(value.get("address").is_none());
        assert!(value.get("averageCost").is_none());
    }
}
