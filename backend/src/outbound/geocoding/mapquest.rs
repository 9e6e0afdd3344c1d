//! Reqwest-backed MapQuest geocoder.
//!
//! This adapter owns transport details only: request construction, timeout
//! and HTTP error mapping, and JSON decoding into domain locations.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;
use zeroize::Zeroizing;

use super::dto::GeocodeResponseDto;
use crate::domain::Location;
use crate::domain::ports::{Geocoder, GeocoderError};

const DEFAULT_USER_AGENT: &str = "devcamper-backend/0.1";

/// Endpoint, credentials and timeout for MapQuest requests.
pub struct MapQuestSettings {
    /// Address endpoint, e.g. `https://www.mapquestapi.com/geocoding/v1/address`.
    pub endpoint: Url,
    /// Consumer key sent as the `key` query parameter.
    pub api_key: Zeroizing<String>,
    /// Whole-request timeout.
    pub timeout: Duration,
}

/// Geocoder that performs one HTTP GET per lookup.
pub struct MapQuestGeocoder {
    client: Client,
    endpoint: Url,
    api_key: Zeroizing<String>,
}

impl MapQuestGeocoder {
    /// Build an adapter using a reqwest client with an explicit timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(settings: MapQuestSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            endpoint: settings.endpoint,
            api_key: settings.api_key,
        })
    }
}

#[async_trait]
impl Geocoder for MapQuestGeocoder {
    async fn geocode(&self, query: &str) -> Result<Location, GeocoderError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(GeocoderError::no_match(query));
        }
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("key", self.api_key.as_str()), ("location", trimmed)])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        let location = parse_location(trimmed, body.as_ref())?;
        debug!(
            query = trimmed,
            latitude = location.point.latitude,
            longitude = location.point.longitude,
            "geocoded"
        );
        Ok(location)
    }
}

fn parse_location(query: &str, body: &[u8]) -> Result<Location, GeocoderError> {
    let decoded: GeocodeResponseDto = serde_json::from_slice(body).map_err(|error| {
        GeocoderError::decode(format!("invalid geocoding JSON payload: {error}"))
    })?;
    if decoded.info.statuscode != 0 {
        return Err(GeocoderError::status(
            decoded.info.statuscode,
            decoded.info.messages.join("; "),
        ));
    }
    decoded
        .into_first_location()
        .ok_or_else(|| GeocoderError::no_match(query))?
        .into_domain()
        .map_err(GeocoderError::decode)
}

fn map_transport_error(error: reqwest::Error) -> GeocoderError {
    GeocoderError::transport(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> GeocoderError {
    GeocoderError::status(status.as_u16(), body_preview(body))
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for the non-network decoding and mapping helpers.

    use super::*;
    use rstest::rstest;

    const BOSTON: &str = r#"{
        "info": { "statuscode": 0, "messages": [] },
        "results": [{
            "providedLocation": { "location": "02215" },
            "locations": [{
                "street": "233 Bay State Rd",
                "adminArea5": "Boston",
                "adminArea3": "MA",
                "adminArea1": "US",
                "postalCode": "02215",
                "latLng": { "lat": 42.350504, "lng": -71.105399 }
            }]
        }]
    }"#;

    #[test]
    fn decodes_first_location_with_address_parts() {
        let location = parse_location("02215", BOSTON.as_bytes()).expect("decodes");

        assert_eq!(location.point.latitude, 42.350504);
        assert_eq!(location.point.longitude, -71.105399);
        assert_eq!(location.city.as_deref(), Some("Boston"));
        assert_eq!(location.state.as_deref(), Some("MA"));
        assert_eq!(location.zipcode.as_deref(), Some("02215"));
        assert_eq!(location.country_code.as_deref(), Some("US"));
        assert_eq!(
            location.formatted_address,
            "233 Bay State Rd, Boston, MA 02215, US"
        );
    }

    #[test]
    fn empty_results_are_no_match() {
        let body = r#"{ "info": { "statuscode": 0 }, "results": [{ "locations": [] }] }"#;
        let error = parse_location("nowhere", body.as_bytes()).expect_err("no match");
        assert_eq!(error, GeocoderError::no_match("nowhere"));
    }

    #[test]
    fn provider_status_codes_are_reported() {
        let body = r#"{ "info": { "statuscode": 403, "messages": ["bad key"] } }"#;
        let error = parse_location("02215", body.as_bytes()).expect_err("status");
        assert_eq!(error, GeocoderError::status(403_u16, "bad key"));
    }

    #[rstest]
    #[case(b"not json".as_slice())]
    #[case(br#"{ "results": [] }"#.as_slice())]
    fn malformed_payloads_are_decode_errors(#[case] body: &[u8]) {
        let error = parse_location("02215", body).expect_err("decode");
        assert!(matches!(error, GeocoderError::Decode { .. }));
    }

    #[test]
    fn http_failures_keep_a_short_body_preview() {
        let long_body = "x".repeat(400);
        let error = map_status_error(StatusCode::BAD_GATEWAY, long_body.as_bytes());
        match error {
            GeocoderError::Status { status, message } => {
                assert_eq!(status, 502);
                assert!(message.ends_with("..."));
                assert_eq!(message.chars().count(), 163);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
