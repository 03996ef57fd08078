// file: src/geo/resolver.rs
// description: ip to coordinate lookup seam with an ipinfo-backed implementation
// reference: https://ipinfo.io/developers

use crate::error::{AggregatorError, Result};
use crate::models::GeoPoint;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait GeoResolver: Send + Sync {
    async fn resolve(&self, ip: &str) -> Result<GeoPoint>;
}

#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    loc: Option<String>,
    city: Option<String>,
    region: Option<String>,
    country: Option<String>,
}

pub struct IpInfoResolver {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl IpInfoResolver {
    pub fn new(base_url: String, token: Option<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url,
            token,
        }
    }

    fn lookup_url(&self, ip: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        match &self.token {
            Some(token) => format!("{}/{}?token={}", base, ip, urlencoding::encode(token)),
            None => format!("{}/{}", base, ip),
        }
    }
}

#[async_trait]
impl GeoResolver for IpInfoResolver {
    async fn resolve(&self, ip: &str) -> Result<GeoPoint> {
        debug!("Geolocating {}", ip);

        let response = self
            .client
            .get(self.lookup_url(ip))
            .send()
            .await
            .map_err(|e| AggregatorError::geolocation(ip, e))?;

        if !response.status().is_success() {
            return Err(AggregatorError::geolocation(
                ip,
                format!("status {}", response.status()),
            ));
        }

        let body: IpInfoResponse = response
            .json()
            .await
            .map_err(|e| AggregatorError::geolocation(ip, e))?;

        point_from_response(ip, body)
    }
}

fn point_from_response(ip: &str, body: IpInfoResponse) -> Result<GeoPoint> {
    let loc = body
        .loc
        .ok_or_else(|| AggregatorError::geolocation(ip, "response has no loc field"))?;
    let (lat, lon) = parse_loc(&loc)
        .ok_or_else(|| AggregatorError::geolocation(ip, format!("unparseable loc {:?}", loc)))?;

    Ok(GeoPoint {
        ip: ip.to_string(),
        lat,
        lon,
        city: body.city,
        region: body.region,
        country: body.country,
    })
}

/// Parses ipinfo's `"lat,lon"` pair.
fn parse_loc(loc: &str) -> Option<(f64, f64)> {
    let (lat, lon) = loc.split_once(',')?;
    Some((lat.trim().parse().ok()?, lon.trim().parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_loc() {
        assert_eq!(parse_loc("37.4056,-122.0775"), Some((37.4056, -122.0775)));
        assert_eq!(parse_loc("37.4"), None);
        assert_eq!(parse_loc("north,west"), None);
    }

    #[test]
    fn test_point_from_response() {
        let body: IpInfoResponse = serde_json::from_str(
            r#"{"ip": "8.8.8.8", "city": "Mountain View", "region": "California", "country": "US", "loc": "37.4056,-122.0775"}"#,
        )
        .unwrap();

        let point = point_from_response("8.8.8.8", body).unwrap();
        assert_eq!(point.city.as_deref(), Some("Mountain View"));
        assert_eq!(point.lon, -122.0775);
    }

    #[test]
    fn test_missing_loc_is_error() {
        let body: IpInfoResponse = serde_json::from_str(r#"{"ip": "10.0.0.1", "bogon": true}"#).unwrap();
        let err = point_from_response("10.0.0.1", body).unwrap_err();
        assert!(matches!(err, AggregatorError::Geolocation { .. }));
    }

    #[test]
    fn test_lookup_url() {
        let resolver = IpInfoResolver::new(
            "https://ipinfo.io/".to_string(),
            Some("abc".to_string()),
            Duration::from_secs(5),
        );
        assert_eq!(resolver.lookup_url("1.2.3.4"), "https://ipinfo.io/1.2.3.4?token=abc");
    }
}
