//! Geographic primitives and the spherical radius test.

use serde::{Deserialize, Serialize};

use super::Error;

/// Earth radius used to turn a distance into a central angle, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6378.0;

/// Latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Build a point, rejecting out-of-range or non-finite coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, Error> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if valid {
            Ok(Self {
                latitude,
                longitude,
            })
        } else {
            Err(Error::invalid_request("coordinates are out of range"))
        }
    }

    /// Central angle to `other` in radians (haversine formula).
    pub fn central_angle(&self, other: &Self) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = lat2 - lat1;
        let dlng = (other.longitude - self.longitude).to_radians();
        let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        2.0 * h.sqrt().min(1.0).asin()
    }
}

/// Angular search radius derived from a distance in kilometres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Radius(f64);

impl Radius {
    /// Convert a distance to radians, rejecting negative or non-finite input.
    ///
    /// # Examples
    /// ```
    /// use devcamper::domain::Radius;
    ///
    /// assert_eq!(Radius::from_distance_km(6378.0).unwrap().radians(), 1.0);
    /// assert!(Radius::from_distance_km(-1.0).is_err());
    /// ```
    pub fn from_distance_km(distance: f64) -> Result<Self, Error> {
        if !distance.is_finite() || distance < 0.0 {
            return Err(Error::invalid_request(
                "Distance must be a non-negative number",
            ));
        }
        Ok(Self(distance / EARTH_RADIUS_KM))
    }

    /// Radius in radians.
    pub fn radians(self) -> f64 {
        self.0
    }

    /// Whether `point` lies within this radius of `centre`.
    pub fn contains(self, centre: &GeoPoint, point: &GeoPoint) -> bool {
        centre.central_angle(point) <= self.0
    }
}

/// Geocoded location stored on a bootcamp.
///
/// Serialises as a GeoJSON point (`[longitude, latitude]`) alongside the
/// structured address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "LocationDto", try_from = "LocationDto")]
pub struct Location {
    pub point: GeoPoint,
    pub formatted_address: String,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocationDto {
    #[serde(rename = "type")]
    kind: String,
    coordinates: [f64; 2],
    formatted_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    zipcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    country_code: Option<String>,
}

impl From<Location> for LocationDto {
    fn from(value: Location) -> Self {
        Self {
            kind: "Point".to_owned(),
            coordinates: [value.point.longitude, value.point.latitude],
            formatted_address: value.formatted_address,
            street: value.street,
            city: value.city,
            state: value.state,
            zipcode: value.zipcode,
            country: value.country,
            country_code: value.country_code,
        }
    }
}

impl TryFrom<LocationDto> for Location {
    type Error = Error;

    fn try_from(value: LocationDto) -> Result<Self, Self::Error> {
        let [longitude, latitude] = value.coordinates;
        Ok(Self {
            point: GeoPoint::new(latitude, longitude)?,
            formatted_address: value.formatted_address,
            street: value.street,
            city: value.city,
            state: value.state,
            zipcode: value.zipcode,
            country: value.country,
            country_code: value.country_code,
        })
    }
}
