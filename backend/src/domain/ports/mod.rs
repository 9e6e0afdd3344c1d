//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (databases, geocoders, mail transports, file storage). Each trait exposes
//! strongly typed errors so adapters map their failures into predictable
//! variants.

mod macros;
pub(crate) use macros::define_port_error;

mod bootcamp_repository;
mod course_repository;
mod geocoder;
mod mailer;
mod password_hasher;
mod photo_store;
mod review_repository;
mod token_service;
mod user_repository;

#[cfg(test)]
pub use bootcamp_repository::MockBootcampRepository;
pub use bootcamp_repository::{BootcampRepository, BootcampRepositoryError};
#[cfg(test)]
pub use course_repository::MockCourseRepository;
pub use course_repository::{CourseRepository, CourseRepositoryError};
#[cfg(test)]
pub use geocoder::MockGeocoder;
pub use geocoder::{FixtureGeocoder, Geocoder, GeocoderError};
#[cfg(test)]
pub use mailer::MockMailer;
pub use mailer::{Mailer, MailerError, OutgoingMail};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use photo_store::MockPhotoStore;
pub use photo_store::{PhotoStore, PhotoStoreError};
#[cfg(test)]
pub use review_repository::MockReviewRepository;
pub use review_repository::{ReviewRepository, ReviewRepositoryError};
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{IssuedToken, TokenError, TokenService};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
