// file: src/models/geo.rs
// description: geolocated ip point and the map marker derived from it
// reference: https://ipinfo.io/developers

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub ip: String,
    pub lat: f64,
    pub lon: f64,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub lat: f64,
    pub lon: f64,
    pub label: String,
}

impl GeoPoint {
    pub fn new(ip: &str, lat: f64, lon: f64) -> Self {
        Self {
            ip: ip.to_string(),
            lat,
            lon,
            city: None,
            region: None,
            country: None,
        }
    }

    /// Popup label in the form `ip - city, region, country`; missing parts stay empty.
    pub fn label(&self) -> String {
        format!(
            "{} - {}, {}, {}",
            self.ip,
            self.city.as_deref().unwrap_or(""),
            self.region.as_deref().unwrap_or(""),
            self.country.as_deref().unwrap_or("")
        )
    }

    pub fn to_marker(&self) -> Marker {
        Marker {
            lat: self.lat,
            lon: self.lon,
            label: self.label(),
        }
    }
}
