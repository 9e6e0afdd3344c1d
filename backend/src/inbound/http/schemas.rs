//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module mirrors their wire shape for the generated document.

#![expect(
    dead_code,
    reason = "Schema wrappers exist only for OpenAPI generation via utoipa"
)]

use utoipa::ToSchema;

/// Stable machine-readable error codes.
#[derive(ToSchema)]
#[schema(as = ErrorCode)]
pub enum ErrorCodeSchema {
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    #[schema(rename = "conflict")]
    Conflict,
    #[schema(rename = "unauthorized")]
    Unauthorized,
    #[schema(rename = "forbidden")]
    Forbidden,
    #[schema(rename = "not_found")]
    NotFound,
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    #[schema(rename = "internal_error")]
    InternalError,
}

/// Failure envelope.
#[derive(ToSchema)]
#[schema(as = ErrorEnvelope)]
#[schema(rename_all = "camelCase")]
pub struct ErrorEnvelopeSchema {
    /// Always `false`.
    #[schema(example = false)]
    success: bool,
    /// Human-readable message.
    #[schema(example = "No bootcamp with the id of 5d725a1b-7b29-4d4a-9a8e-6b7a0f4d2c11")]
    error: String,
    code: ErrorCodeSchema,
    /// Field-level validation failures and similar context.
    details: Option<serde_json::Value>,
    /// Correlation identifier echoed in the `trace-id` header.
    trace_id: Option<String>,
}

/// Neighbouring page reference.
#[derive(ToSchema)]
#[schema(as = PageRef)]
pub struct PageRefSchema {
    page: u32,
    limit: u32,
}

/// Links to the previous and next pages of a list.
#[derive(ToSchema)]
#[schema(as = Pagination)]
pub struct PaginationSchema {
    next: Option<PageRefSchema>,
    prev: Option<PageRefSchema>,
}

/// Registered account. The password hash is never returned.
#[derive(ToSchema)]
#[schema(as = User)]
#[schema(rename_all = "camelCase")]
pub struct UserSchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    #[schema(example = "John Doe")]
    name: String,
    #[schema(example = "john@gmail.com")]
    email: String,
    #[schema(example = "publisher")]
    role: String,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
}

/// GeoJSON point with the geocoded address parts.
#[derive(ToSchema)]
#[schema(as = Location)]
#[schema(rename_all = "camelCase")]
pub struct LocationSchema {
    #[schema(rename = "type", example = "Point")]
    kind: String,
    /// `[longitude, latitude]`.
    coordinates: [f64; 2],
    formatted_address: String,
    street: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zipcode: Option<String>,
    country: Option<String>,
    country_code: Option<String>,
}

/// Published bootcamp.
#[derive(ToSchema)]
#[schema(as = Bootcamp)]
#[schema(rename_all = "camelCase")]
pub struct BootcampSchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    /// Owning publisher.
    #[schema(value_type = String, format = Uuid)]
    user: String,
    #[schema(example = "Devworks Bootcamp")]
    name: String,
    #[schema(example = "devworks-bootcamp")]
    slug: String,
    description: String,
    website: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    #[schema(example = json!(["Web Development", "UI/UX"]))]
    careers: Vec<String>,
    average_rating: Option<f64>,
    average_cost: Option<f64>,
    housing: bool,
    job_assistance: bool,
    job_guarantee: bool,
    accept_gi: bool,
    location: LocationSchema,
    #[schema(example = "no-photo.jpg")]
    photo: String,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
}

/// Course offered by a bootcamp.
#[derive(ToSchema)]
#[schema(as = Course)]
#[schema(rename_all = "camelCase")]
pub struct CourseSchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    #[schema(value_type = String, format = Uuid)]
    bootcamp: String,
    #[schema(value_type = String, format = Uuid)]
    user: String,
    title: String,
    description: String,
    weeks: u32,
    tuition: f64,
    #[schema(example = "intermediate")]
    minimum_skill: String,
    scholarship_available: bool,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
}

/// Review left on a bootcamp.
#[derive(ToSchema)]
#[schema(as = Review)]
#[schema(rename_all = "camelCase")]
pub struct ReviewSchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    #[schema(value_type = String, format = Uuid)]
    bootcamp: String,
    #[schema(value_type = String, format = Uuid)]
    user: String,
    title: String,
    text: String,
    #[schema(minimum = 1, maximum = 10)]
    rating: u8,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
}

/// Account fields for registration and admin creation.
#[derive(ToSchema)]
#[schema(as = UserDraft)]
pub struct UserDraftSchema {
    name: String,
    email: String,
    #[schema(min_length = 6)]
    password: String,
    /// `user` or `publisher`; admins may also create `admin` accounts.
    role: Option<String>,
}

/// Sign-in credentials.
#[derive(ToSchema)]
#[schema(as = LoginRequest)]
pub struct LoginRequestSchema {
    #[schema(example = "john@gmail.com")]
    email: String,
    #[schema(example = "123456")]
    password: String,
}

/// Partial account update.
#[derive(ToSchema)]
#[schema(as = UserPatch)]
pub struct UserPatchSchema {
    name: Option<String>,
    email: Option<String>,
    /// Honoured on the admin route only.
    role: Option<String>,
}

/// Password change for the signed-in user.
#[derive(ToSchema)]
#[schema(as = PasswordChange)]
#[schema(rename_all = "camelCase")]
pub struct PasswordChangeSchema {
    current_password: String,
    #[schema(min_length = 6)]
    new_password: String,
}

/// Address to send a reset link to.
#[derive(ToSchema)]
#[schema(as = ForgotPasswordRequest)]
pub struct ForgotPasswordSchema {
    email: String,
}

/// New password submitted with a reset token.
#[derive(ToSchema)]
#[schema(as = ResetPasswordRequest)]
pub struct ResetPasswordSchema {
    #[schema(min_length = 6)]
    password: String,
}

/// Bootcamp fields; all are required on create and optional on update.
#[derive(ToSchema)]
#[schema(as = BootcampInput)]
#[schema(rename_all = "camelCase")]
pub struct BootcampInputSchema {
    name: Option<String>,
    description: Option<String>,
    website: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    /// Geocoded into `location`; never stored verbatim.
    address: Option<String>,
    careers: Option<Vec<String>>,
    average_rating: Option<f64>,
    average_cost: Option<f64>,
    housing: Option<bool>,
    job_assistance: Option<bool>,
    job_guarantee: Option<bool>,
    accept_gi: Option<bool>,
}

/// Course fields; all but `scholarshipAvailable` are required on create.
#[derive(ToSchema)]
#[schema(as = CourseInput)]
#[schema(rename_all = "camelCase")]
pub struct CourseInputSchema {
    title: Option<String>,
    description: Option<String>,
    weeks: Option<u32>,
    tuition: Option<f64>,
    /// `beginner`, `intermediate` or `advanced`.
    minimum_skill: Option<String>,
    scholarship_available: Option<bool>,
}

/// Review fields; all are required on create.
#[derive(ToSchema)]
#[schema(as = ReviewInput)]
pub struct ReviewInputSchema {
    title: Option<String>,
    text: Option<String>,
    rating: Option<u8>,
}

/// Sign-in response.
#[derive(ToSchema)]
#[schema(as = TokenResponse)]
pub struct TokenResponseSchema {
    success: bool,
    /// Bearer token, also set as the `token` cookie.
    token: String,
    data: UserSchema,
}
