//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL through `diesel-async` and a `bb8` pool.
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain entities.
//! - **Internal models**: row structs (`models.rs`) and the schema
//!   (`schema.rs`) never reach the domain.
//! - **Typed errors**: database failures are classified once and mapped into
//!   each port's error enum.
//!
//! # Example
//!
//! ```ignore
//! use devcamper::outbound::persistence::{DbPool, PoolConfig, DieselUserRepository};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/devcamper")).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

pub(crate) mod diesel_helpers;
mod diesel_bootcamp_repository;
mod diesel_course_repository;
mod diesel_review_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_bootcamp_repository::DieselBootcampRepository;
pub use diesel_course_repository::DieselCourseRepository;
pub use diesel_review_repository::DieselReviewRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
