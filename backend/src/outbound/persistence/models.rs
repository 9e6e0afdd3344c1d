//! Internal Diesel row structs and their conversions.
//!
//! Rows never leave the persistence module. Converting a row back into a
//! domain entity can fail when a stored enum label is unknown; those
//! failures surface as `String` messages that each repository maps into its
//! own query error.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Bootcamp, BootcampProfile, Career, Course, CourseDetails, EmailAddress, GeoPoint, Location,
    PasswordHash, PasswordReset, Review, ReviewContent, Role, Skill, User,
};

use super::schema::{bootcamps, courses, reviews, users};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Row struct for the users table, used for reads and inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub password_hash: String,
    pub reset_token_digest: Option<String>,
    pub reset_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Changeset for updating a user; a cleared reset writes `NULL`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserUpdate<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub role: &'a str,
    pub password_hash: &'a str,
    pub reset_token_digest: Option<&'a str>,
    pub reset_expires_at: Option<DateTime<Utc>>,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        let (reset_token_digest, reset_expires_at) = match &user.password_reset {
            Some(reset) => (Some(reset.token_digest.clone()), Some(reset.expires_at)),
            None => (None, None),
        };
        Self {
            id: *user.id.as_uuid(),
            name: user.name.clone(),
            email: user.email.to_string(),
            role: user.role.as_str().to_owned(),
            password_hash: user.password_hash.as_str().to_owned(),
            reset_token_digest,
            reset_expires_at,
            created_at: user.created_at,
        }
    }
}

impl<'a> From<&'a User> for UserUpdate<'a> {
    fn from(user: &'a User) -> Self {
        let reset = user.password_reset.as_ref();
        Self {
            name: &user.name,
            email: user.email.as_ref(),
            role: user.role.as_str(),
            password_hash: user.password_hash.as_str(),
            reset_token_digest: reset.map(|reset| reset.token_digest.as_str()),
            reset_expires_at: reset.map(|reset| reset.expires_at),
        }
    }
}

impl TryFrom<UserRow> for User {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::parse(&row.role)
            .ok_or_else(|| format!("user {} has unknown role `{}`", row.id, row.role))?;
        let email = EmailAddress::new(&row.email)
            .map_err(|_| format!("user {} has a malformed email", row.id))?;
        let password_reset = match (row.reset_token_digest, row.reset_expires_at) {
            (Some(token_digest), Some(expires_at)) => Some(PasswordReset {
                token_digest,
                expires_at,
            }),
            _ => None,
        };
        Ok(Self {
            id: row.id.into(),
            name: row.name,
            email,
            role,
            password_hash: PasswordHash::new(row.password_hash),
            password_reset,
            created_at: row.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Bootcamps
// ---------------------------------------------------------------------------

/// Row struct for the bootcamps table, used for reads and inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = bootcamps)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BootcampRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub careers: Vec<String>,
    pub average_rating: Option<f64>,
    pub average_cost: Option<f64>,
    pub photo: String,
    pub housing: bool,
    pub job_assistance: bool,
    pub job_guarantee: bool,
    pub accept_gi: bool,
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_address: String,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Changeset for updating a bootcamp. Owner and creation time never change.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = bootcamps)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct BootcampUpdate {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub careers: Vec<String>,
    pub average_rating: Option<f64>,
    pub average_cost: Option<f64>,
    pub photo: String,
    pub housing: bool,
    pub job_assistance: bool,
    pub job_guarantee: bool,
    pub accept_gi: bool,
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_address: String,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
}

impl From<&Bootcamp> for BootcampRow {
    fn from(bootcamp: &Bootcamp) -> Self {
        let update = BootcampUpdate::from(bootcamp);
        Self {
            id: *bootcamp.id.as_uuid(),
            user_id: *bootcamp.user.as_uuid(),
            name: update.name,
            slug: update.slug,
            description: update.description,
            website: update.website,
            phone: update.phone,
            email: update.email,
            careers: update.careers,
            average_rating: update.average_rating,
            average_cost: update.average_cost,
            photo: update.photo,
            housing: update.housing,
            job_assistance: update.job_assistance,
            job_guarantee: update.job_guarantee,
            accept_gi: update.accept_gi,
            latitude: update.latitude,
            longitude: update.longitude,
            formatted_address: update.formatted_address,
            street: update.street,
            city: update.city,
            state: update.state,
            zipcode: update.zipcode,
            country: update.country,
            country_code: update.country_code,
            created_at: bootcamp.created_at,
        }
    }
}

impl From<&Bootcamp> for BootcampUpdate {
    fn from(bootcamp: &Bootcamp) -> Self {
        let profile = &bootcamp.profile;
        let location = &bootcamp.location;
        Self {
            name: profile.name.clone(),
            slug: bootcamp.slug.clone(),
            description: profile.description.clone(),
            website: profile.website.clone(),
            phone: profile.phone.clone(),
            email: profile.email.as_ref().map(ToString::to_string),
            careers: profile
                .careers
                .iter()
                .map(|career| career.label().to_owned())
                .collect(),
            average_rating: profile.average_rating,
            average_cost: profile.average_cost,
            photo: bootcamp.photo.clone(),
            housing: profile.housing,
            job_assistance: profile.job_assistance,
            job_guarantee: profile.job_guarantee,
            accept_gi: profile.accept_gi,
            latitude: location.point.latitude,
            longitude: location.point.longitude,
            formatted_address: location.formatted_address.clone(),
            street: location.street.clone(),
            city: location.city.clone(),
            state: location.state.clone(),
            zipcode: location.zipcode.clone(),
            country: location.country.clone(),
            country_code: location.country_code.clone(),
        }
    }
}

impl TryFrom<BootcampRow> for Bootcamp {
    type Error = String;

    fn try_from(row: BootcampRow) -> Result<Self, Self::Error> {
        let careers = row
            .careers
            .iter()
            .map(|label| {
                Career::parse(label)
                    .ok_or_else(|| format!("bootcamp {} has unknown career `{label}`", row.id))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let email = row
            .email
            .as_deref()
            .map(EmailAddress::new)
            .transpose()
            .map_err(|_| format!("bootcamp {} has a malformed email", row.id))?;
        Ok(Self {
            id: row.id.into(),
            user: row.user_id.into(),
            slug: row.slug,
            profile: BootcampProfile {
                name: row.name,
                description: row.description,
                website: row.website,
                phone: row.phone,
                email,
                careers,
                average_rating: row.average_rating,
                average_cost: row.average_cost,
                housing: row.housing,
                job_assistance: row.job_assistance,
                job_guarantee: row.job_guarantee,
                accept_gi: row.accept_gi,
            },
            location: Location {
                point: GeoPoint {
                    latitude: row.latitude,
                    longitude: row.longitude,
                },
                formatted_address: row.formatted_address,
                street: row.street,
                city: row.city,
                state: row.state,
                zipcode: row.zipcode,
                country: row.country,
                country_code: row.country_code,
            },
            photo: row.photo,
            created_at: row.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Courses
// ---------------------------------------------------------------------------

/// Row struct for the courses table, used for reads and inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CourseRow {
    pub id: Uuid,
    pub bootcamp_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub weeks: i32,
    pub tuition: f64,
    pub minimum_skill: String,
    pub scholarship_available: bool,
    pub created_at: DateTime<Utc>,
}

/// Changeset for the editable course columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = courses)]
pub(crate) struct CourseUpdate<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub weeks: i32,
    pub tuition: f64,
    pub minimum_skill: &'a str,
    pub scholarship_available: bool,
}

fn weeks_for_db(course: &Course) -> Result<i32, String> {
    i32::try_from(course.details.weeks)
        .map_err(|_| format!("course {} has too many weeks to store", course.id))
}

impl TryFrom<&Course> for CourseRow {
    type Error = String;

    fn try_from(course: &Course) -> Result<Self, Self::Error> {
        let details = &course.details;
        Ok(Self {
            id: *course.id.as_uuid(),
            bootcamp_id: *course.bootcamp.as_uuid(),
            user_id: *course.user.as_uuid(),
            title: details.title.clone(),
            description: details.description.clone(),
            weeks: weeks_for_db(course)?,
            tuition: details.tuition,
            minimum_skill: details.minimum_skill.as_str().to_owned(),
            scholarship_available: details.scholarship_available,
            created_at: course.created_at,
        })
    }
}

impl<'a> TryFrom<&'a Course> for CourseUpdate<'a> {
    type Error = String;

    fn try_from(course: &'a Course) -> Result<Self, Self::Error> {
        let details = &course.details;
        Ok(Self {
            title: &details.title,
            description: &details.description,
            weeks: weeks_for_db(course)?,
            tuition: details.tuition,
            minimum_skill: details.minimum_skill.as_str(),
            scholarship_available: details.scholarship_available,
        })
    }
}

impl TryFrom<CourseRow> for Course {
    type Error = String;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        let minimum_skill = Skill::parse(&row.minimum_skill).ok_or_else(|| {
            format!(
                "course {} has unknown skill level `{}`",
                row.id, row.minimum_skill
            )
        })?;
        let weeks = u32::try_from(row.weeks)
            .map_err(|_| format!("course {} has negative weeks", row.id))?;
        Ok(Self {
            id: row.id.into(),
            bootcamp: row.bootcamp_id.into(),
            user: row.user_id.into(),
            details: CourseDetails {
                title: row.title,
                description: row.description,
                weeks,
                tuition: row.tuition,
                minimum_skill,
                scholarship_available: row.scholarship_available,
            },
            created_at: row.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

/// Row struct for the reviews table, used for reads and inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReviewRow {
    pub id: Uuid,
    pub bootcamp_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub body: String,
    pub rating: i16,
    pub created_at: DateTime<Utc>,
}

/// Changeset for the editable review columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = reviews)]
pub(crate) struct ReviewUpdate<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub rating: i16,
}

impl From<&Review> for ReviewRow {
    fn from(review: &Review) -> Self {
        Self {
            id: *review.id.as_uuid(),
            bootcamp_id: *review.bootcamp.as_uuid(),
            user_id: *review.user.as_uuid(),
            title: review.content.title.clone(),
            body: review.content.text.clone(),
            rating: i16::from(review.content.rating),
            created_at: review.created_at,
        }
    }
}

impl<'a> From<&'a Review> for ReviewUpdate<'a> {
    fn from(review: &'a Review) -> Self {
        Self {
            title: &review.content.title,
            body: &review.content.text,
            rating: i16::from(review.content.rating),
        }
    }
}

impl TryFrom<ReviewRow> for Review {
    type Error = String;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let rating = u8::try_from(row.rating)
            .map_err(|_| format!("review {} has out-of-range rating {}", row.id, row.rating))?;
        Ok(Self {
            id: row.id.into(),
            bootcamp: row.bootcamp_id.into(),
            user: row.user_id.into(),
            content: ReviewContent {
                title: row.title,
                text: row.body,
                rating,
            },
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rstest::rstest;

    use super::*;
    use crate::domain::{BootcampId, CourseId, UserId};

    fn user_row() -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            name: "Jane".into(),
            email: "jane@devcamper.io".into(),
            role: "publisher".into(),
            password_hash: "$pbkdf2-sha256$...".into(),
            reset_token_digest: Some("abc".into()),
            reset_expires_at: Some(Utc::now()),
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn user_rows_restore_role_and_reset() {
        let user = User::try_from(user_row()).expect("valid row");
        assert_eq!(user.role, Role::Publisher);
        assert_eq!(
            user.password_reset.map(|reset| reset.token_digest),
            Some("abc".to_owned())
        );
    }

    #[rstest]
    fn half_written_reset_is_ignored() {
        let row = UserRow {
            reset_expires_at: None,
            ..user_row()
        };
        let user = User::try_from(row).expect("valid row");
        assert!(user.password_reset.is_none());
    }

    #[rstest]
    fn unknown_roles_are_reported() {
        let row = UserRow {
            role: "owner".into(),
            ..user_row()
        };
        let err = User::try_from(row).expect_err("unknown role");
        assert!(err.contains("unknown role `owner`"));
    }

    #[rstest]
    fn cleared_reset_writes_nulls() {
        let mut user = User::try_from(user_row()).expect("valid row");
        user.password_reset = None;
        let update = UserUpdate::from(&user);
        assert!(update.reset_token_digest.is_none());
        assert!(update.reset_expires_at.is_none());
    }

    #[rstest]
    fn course_rows_reject_unknown_skills() {
        let row = CourseRow {
            id: *CourseId::random().as_uuid(),
            bootcamp_id: *BootcampId::random().as_uuid(),
            user_id: *UserId::random().as_uuid(),
            title: "Front End".into(),
            description: "HTML and CSS".into(),
            weeks: 8,
            tuition: 8000.0,
            minimum_skill: "expert".into(),
            scholarship_available: false,
            created_at: Utc::now(),
        };
        let err = Course::try_from(row).expect_err("unknown skill");
        assert!(err.contains("expert"));
    }

    #[rstest]
    fn course_weeks_beyond_the_column_are_refused() {
        let row = CourseRow {
            id: *CourseId::random().as_uuid(),
            bootcamp_id: *BootcampId::random().as_uuid(),
            user_id: *UserId::random().as_uuid(),
            title: "Front End".into(),
            description: "HTML and CSS".into(),
            weeks: 8,
            tuition: 8000.0,
            minimum_skill: "beginner".into(),
            scholarship_available: false,
            created_at: Utc::now(),
        };
        let mut course = Course::try_from(row).expect("valid row");
        assert_eq!(CourseRow::try_from(&course).expect("fits").weeks, 8);

        course.details.weeks = u32::MAX;
        let err = CourseRow::try_from(&course).expect_err("too many weeks");
        assert!(err.contains("too many weeks"));
        assert!(CourseUpdate::try_from(&course).is_err());
    }

    #[rstest]
    fn bootcamp_rows_keep_career_labels() {
        let row = BootcampRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Devworks Bootcamp".into(),
            slug: "devworks-bootcamp".into(),
            description: "Full stack".into(),
            website: None,
            phone: None,
            email: None,
            careers: vec!["UI/UX".into(), "Web Development".into()],
            average_rating: None,
            average_cost: Some(10_000.0),
            photo: "no-photo.jpg".into(),
            housing: true,
            job_assistance: false,
            job_guarantee: false,
            accept_gi: true,
            latitude: 42.35,
            longitude: -71.1,
            formatted_address: "233 Bay State Rd Boston MA 02215".into(),
            street: None,
            city: Some("Boston".into()),
            state: Some("MA".into()),
            zipcode: Some("02215".into()),
            country: None,
            country_code: Some("US".into()),
            created_at: Utc::now(),
        };
        let bootcamp = Bootcamp::try_from(row).expect("valid row");
        assert_eq!(
            bootcamp.profile.careers,
            vec![Career::UiUx, Career::WebDevelopment]
        );
        let back = BootcampRow::from(&bootcamp);
        assert_eq!(back.careers, vec!["UI/UX", "Web Development"]);
        assert_eq!(back.city.as_deref(), Some("Boston"));
    }
}
