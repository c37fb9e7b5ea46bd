//! Google Geocoding API response mapping.

use serde::Deserialize;

/// Geocoding endpoint.
pub const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResult {
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

impl GeocodeResponse {
    /// Location of the first result when the lookup succeeded.
    pub fn first_location(&self) -> Option<(f64, f64)> {
        if self.status != "OK" {
            return None;
        }
        self.results
            .first()
            .map(|r| (r.geometry.location.lat, r.geometry.location.lng))
    }
}
