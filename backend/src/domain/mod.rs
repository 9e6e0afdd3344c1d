//! Domain primitives, aggregates and services.
//!
//! Purpose: define the strongly typed entities of the bootcamp directory,
//! the validation that guards them, the access rules every mutation goes
//! through, and the services that orchestrate repositories and outbound
//! integrations. Nothing here knows about HTTP or SQL.
//!
//! Public surface:
//! - `Error` / `ErrorCode`: transport-agnostic failure with a stable code.
//! - `User`, `Bootcamp`, `Course`, `Review`: stored entities.
//! - `ListQuery` / `Page`: the filter, sort and pagination contract.
//! - `Actor`, `require_role`, `ensure_can_modify`: the access rules.
//! - `*Service`: use-cases driven by the inbound adapter.

pub mod access;
pub mod auth;
pub mod bootcamp;
pub mod course;
pub mod error;
pub mod geo;
pub mod ids;
pub mod listing;
pub mod ports;
pub mod review;
pub mod slug;
pub mod trace_id;
pub mod user;
pub mod validation;

mod auth_service;
mod bootcamp_service;
mod course_service;
mod review_service;
mod service_support;
mod user_service;

pub use self::access::{Actor, Owned, ensure_can_modify, require_role};
pub use self::auth::{
    ForgotPasswordInput, IssuedResetToken, LoginCredentials, LoginInput, LoginValidationError,
    PasswordChange, RESET_TOKEN_TTL_MINUTES, ResetPasswordInput, issue_reset_token,
    reset_token_digest,
};
pub use self::auth_service::{AuthService, AuthServiceConfig, Session};
pub use self::bootcamp::{
    Bootcamp, BootcampChange, BootcampInput, BootcampProfile, Career, DEFAULT_PHOTO, NewBootcamp,
};
pub use self::bootcamp_service::{BootcampService, PhotoUpload};
pub use self::course::{Course, CourseDetails, CourseInput, Skill};
pub use self::course_service::CourseService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::geo::{EARTH_RADIUS_KM, GeoPoint, Location, Radius};
pub use self::ids::{BootcampId, CourseId, InvalidId, ReviewId, UserId};
pub use self::listing::{
    FieldValue, Filter, FilterOp, ListQuery, Listable, Page, PageRef, Pagination, SortKey,
};
pub use self::review::{Review, ReviewContent, ReviewInput};
pub use self::review_service::ReviewService;
pub use self::slug::slugify;
pub use self::trace_id::TraceId;
pub use self::user::{
    EmailAddress, InvalidEmail, NewUser, PASSWORD_MIN_LEN, PasswordHash, PasswordReset, Role,
    User, UserDraft, UserPatch, validate_new_password,
};
pub use self::user_service::UserService;
pub use self::validation::{FieldError, FieldErrors, is_valid_email, is_valid_website};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use devcamper::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
