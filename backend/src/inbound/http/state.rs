//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and remain testable without I/O.

use actix_web::cookie::time::Duration;

use crate::domain::{AuthService, BootcampService, CourseService, ReviewService, UserService};

/// Attributes of the `token` cookie set on sign-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieSettings {
    /// Cookie max-age.
    pub lifetime: Duration,
    /// Whether to mark the cookie `Secure`.
    pub secure: bool,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            lifetime: Duration::days(30),
            secure: false,
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: AuthService,
    pub bootcamps: BootcampService,
    pub courses: CourseService,
    pub reviews: ReviewService,
    pub users: UserService,
    pub cookies: CookieSettings,
}
