//! HTTP inbound adapter exposing the REST API under `/api/v1`.

pub mod auth;
pub mod bootcamps;
pub mod courses;
pub mod envelope;
pub mod error;
pub mod health;
pub mod reviews;
pub mod schemas;
pub mod session;
pub mod state;
pub mod users;
pub mod validation;

pub use error::ApiResult;
