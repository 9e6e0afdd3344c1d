//! DTOs for decoding MapQuest-compatible geocoding responses.
//!
//! The adapter decodes into these transport DTOs first, then maps the first
//! location of the first result into a domain [`Location`].

use serde::Deserialize;

use crate::domain::{GeoPoint, Location};

#[derive(Debug, Deserialize)]
pub(super) struct GeocodeResponseDto {
    pub(super) info: InfoDto,
    #[serde(default)]
    pub(super) results: Vec<ResultDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct InfoDto {
    pub(super) statuscode: u16,
    #[serde(default)]
    pub(super) messages: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ResultDto {
    #[serde(default)]
    pub(super) locations: Vec<LocationDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LocationDto {
    #[serde(default)]
    pub(super) street: Option<String>,
    /// City.
    #[serde(default)]
    pub(super) admin_area5: Option<String>,
    /// State or region code.
    #[serde(default)]
    pub(super) admin_area3: Option<String>,
    /// Country code.
    #[serde(default)]
    pub(super) admin_area1: Option<String>,
    #[serde(default)]
    pub(super) postal_code: Option<String>,
    pub(super) lat_lng: LatLngDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct LatLngDto {
    pub(super) lat: f64,
    pub(super) lng: f64,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}

impl GeocodeResponseDto {
    /// First location of the first result, if any.
    pub(super) fn into_first_location(self) -> Option<LocationDto> {
        self.results
            .into_iter()
            .next()
            .and_then(|result| result.locations.into_iter().next())
    }
}

impl LocationDto {
    pub(super) fn into_domain(self) -> Result<Location, String> {
        let point = GeoPoint::new(self.lat_lng.lat, self.lat_lng.lng).map_err(|_| {
            format!(
                "coordinates ({}, {}) are out of range",
                self.lat_lng.lat, self.lat_lng.lng
            )
        })?;
        let street = non_blank(self.street);
        let city = non_blank(self.admin_area5);
        let state = non_blank(self.admin_area3);
        let zipcode = non_blank(self.postal_code);
        let country_code = non_blank(self.admin_area1);

        let region = [state.as_deref(), zipcode.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        let formatted_address = [
            street.as_deref(),
            city.as_deref(),
            Some(region.as_str()).filter(|r| !r.is_empty()),
            country_code.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");

        Ok(Location {
            point,
            formatted_address,
            street,
            city,
            state,
            zipcode,
            country: country_code.clone(),
            country_code,
        })
    }
}
