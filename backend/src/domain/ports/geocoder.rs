//! Port for resolving free-form addresses and postal codes to locations.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{GeoPoint, Location};

use super::define_port_error;

define_port_error! {
    /// Errors raised by geocoding adapters.
    pub enum GeocoderError {
        /// The provider could not be reached.
        Transport { message: String } => "geocoder transport failed: {message}",
        /// The provider answered with a non-success status.
        Status { status: u16, message: String } => "geocoder returned status {status}: {message}",
        /// The provider response could not be decoded.
        Decode { message: String } => "geocoder response could not be decoded: {message}",
        /// The provider found nothing for the query.
        NoMatch { query: String } => "no location found for `{query}`",
    }
}

/// Resolve an address or postal code to a single best location.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Geocode `query`, returning the provider's first match.
    async fn geocode(&self, query: &str) -> Result<Location, GeocoderError>;
}

/// Deterministic geocoder for development and tests.
///
/// Registered queries resolve to their stored location; anything else
/// resolves to the fallback point with the query as formatted address.
#[derive(Debug, Clone)]
pub struct FixtureGeocoder {
    known: HashMap<String, Location>,
    fallback: GeoPoint,
}

impl Default for FixtureGeocoder {
    fn default() -> Self {
        Self {
            known: HashMap::new(),
            fallback: GeoPoint {
                latitude: 42.350_504,
                longitude: -71.105_399,
            },
        }
    }
}

impl FixtureGeocoder {
    /// Register a fixed answer for `query`.
    pub fn with_location(mut self, query: impl Into<String>, location: Location) -> Self {
        self.known.insert(normalise(&query.into()), location);
        self
    }
}

fn normalise(query: &str) -> String {
    query.trim().to_lowercase()
}

#[async_trait]
impl Geocoder for FixtureGeocoder {
    async fn geocode(&self, query: &str) -> Result<Location, GeocoderError> {
        let key = normalise(query);
        if key.is_empty() {
            return Err(GeocoderError::no_match(query));
        }
        if let Some(location) = self.known.get(&key) {
            return Ok(location.clone());
        }
        Ok(Location {
            point: self.fallback,
            formatted_address: query.trim().to_owned(),
            street: None,
            city: None,
            state: None,
            zipcode: None,
            country: None,
            country_code: None,
        })
    }
}
