//! Blocking HTTP geocoder
//!
//! Speaks the Google Geocoding JSON response shape:
//! `{"status": "OK", "results": [{"geometry": {"location": {"lat": .., "lng": ..}}}]}`.

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::GeocodeResolver;
use crate::app::models::Coordinate;
use crate::config::GeocoderConfig;
use crate::{Error, Result};

/// Geocoder backed by an HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpGeocoder {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpGeocoder {
    /// Build a client with the configured timeout and user agent
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.resolved_api_key(),
        })
    }
}

impl GeocodeResolver for HttpGeocoder {
    fn resolve(&self, query: &str) -> Result<Coordinate> {
        debug!("Geocoding '{}'", query);

        let mut request = self.client.get(&self.endpoint).query(&[("address", query)]);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        let response = request.send().map_err(|e| {
            let reason = if e.is_timeout() {
                "request timed out".to_string()
            } else {
                format!("request failed: {}", e)
            };
            warn!("Geocoding '{}' failed: {}", query, reason);
            Error::geocode_unavailable(query, reason)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Geocoding '{}' returned HTTP {}", query, status);
            return Err(Error::geocode_unavailable(query, format!("HTTP {}", status)));
        }

        let body: GeocodeResponse = response.json().map_err(|e| {
            Error::geocode_unavailable(query, format!("unreadable response: {}", e))
        })?;

        body.into_coordinate(query)
    }
}

/// Geocoding API response body
#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,

    #[serde(default)]
    pub results: Vec<GeocodeResult>,

    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    pub geometry: Geometry,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl GeocodeResponse {
    /// First result's coordinate, if the lookup succeeded
    pub fn into_coordinate(self, query: &str) -> Result<Coordinate> {
        if self.status != "OK" {
            let reason = match self.error_message {
                Some(message) => format!("{}: {}", self.status, message),
                None => self.status,
            };
            return Err(Error::geocode_unavailable(query, reason));
        }

        let location = self
            .results
            .into_iter()
            .next()
            .map(|result| result.geometry.location)
            .ok_or_else(|| Error::geocode_unavailable(query, "no results"))?;

        let in_range = location.lat.is_finite()
            && location.lng.is_finite()
            && (-90.0..=90.0).contains(&location.lat)
            && (-180.0..=180.0).contains(&location.lng);
        if !in_range {
            return Err(Error::geocode_unavailable(
                query,
                format!("coordinate out of range: {}, {}", location.lat, location.lng),
            ));
        }

        Ok(Coordinate::new(location.lat, location.lng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> GeocodeResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_ok_response() {
        let body = r#"{
            "status": "OK",
            "results": [
                {"geometry": {"location": {"lat": 39.8, "lng": -89.6}}, "formatted_address": "Springfield, IL, USA"},
                {"geometry": {"location": {"lat": 1.0, "lng": 1.0}}}
            ]
        }"#;

        let coordinate = parse(body).into_coordinate("Springfield, IL").unwrap();
        assert_eq!(coordinate, Coordinate::new(39.8, -89.6));
    }

    #[test]
    fn test_zero_results() {
        let err = parse(r#"{"status": "ZERO_RESULTS", "results": []}"#)
            .into_coordinate("Nowhere, ZZ")
            .unwrap_err();
        assert!(matches!(err, Error::GeocodeUnavailable { ref reason, .. } if reason == "ZERO_RESULTS"));
    }

    #[test]
    fn test_error_message_is_reported() {
        let err = parse(r#"{"status": "REQUEST_DENIED", "error_message": "The provided API key is invalid."}"#)
            .into_coordinate("Springfield, IL")
            .unwrap_err();
        assert!(err.to_string().contains("REQUEST_DENIED"));
        assert!(err.to_string().contains("API key"));
    }

    #[test]
    fn test_ok_without_results() {
        let err = parse(r#"{"status": "OK"}"#)
            .into_coordinate("Springfield, IL")
            .unwrap_err();
        assert!(matches!(err, Error::GeocodeUnavailable { .. }));
    }

    #[test]
    fn test_out_of_range_coordinate() {
        let body = r#"{"status": "OK", "results": [{"geometry": {"location": {"lat": 123.0, "lng": 0.0}}}]}"#;
        assert!(parse(body).into_coordinate("Bad").is_err());
    }

    #[test]
    fn test_unreachable_endpoint_is_unavailable() {
        let config = GeocoderConfig {
            endpoint: "http://127.0.0.1:9/geocode".to_string(),
            timeout_secs: 1,
            ..GeocoderConfig::default()
        };
        let geocoder = HttpGeocoder::new(&config).unwrap();

        let err = geocoder.resolve("Springfield, IL").unwrap_err();
        assert!(matches!(err, Error::GeocodeUnavailable { .. }));
    }

    #[test]
    fn test_silent_endpoint_times_out() {
        use std::io::Read;
        use std::net::TcpListener;
        use std::time::{Duration, Instant};

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();

        // Accept and hold the connection without ever answering
        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
            let mut buf = [0u8; 1024];
            while matches!(stream.read(&mut buf), Ok(n) if n > 0) {}
        });

        let config = GeocoderConfig {
            endpoint: format!("http://{}/geocode", address),
            timeout_secs: 1,
            ..GeocoderConfig::default()
        };
        let geocoder = HttpGeocoder::new(&config).unwrap();

        let started = Instant::now();
        let err = geocoder.resolve("Springfield, IL").unwrap_err();
        let elapsed = started.elapsed();

        assert!(
            matches!(err, Error::GeocodeUnavailable { ref reason, .. } if reason == "request timed out"),
            "unexpected error: {}",
            err
        );
        assert!(elapsed >= Duration::from_millis(900), "returned after {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(5), "returned after {:?}", elapsed);

        drop(geocoder);
        server.join().unwrap();
    }
}
