//! DevCamper backend library modules.
//!
//! The crate follows a hexagonal layout: `domain` holds entities, rules and
//! services behind port traits, `outbound` implements those ports, and
//! `inbound::http` exposes the services over Actix. `server` wires the
//! layers together from configuration.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
