//! Geocoding boundary for institution locations
//!
//! The transformer only sees the [`GeocodeResolver`] trait. A failed lookup
//! is reported as [`Error::GeocodeUnavailable`](crate::Error::GeocodeUnavailable)
//! and recovered by the caller; it never aborts a row.
//!
//! - [`http`] - blocking HTTP client with a bounded per-request timeout
//! - [`cache`] - per-run memoisation of lookups
//!
//! ```rust,no_run
//! use grouped_csv::app::services::geocoder::{self, GeocodeResolver};
//! use grouped_csv::config::GeocoderConfig;
//!
//! # fn example() -> grouped_csv::Result<()> {
//! let resolver = geocoder::from_config(&GeocoderConfig::default())?;
//! let coordinate = resolver.resolve("Springfield, IL")?;
//! println!("{}", coordinate);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod http;

use std::sync::Arc;

use tracing::info;

use crate::app::models::Coordinate;
use crate::config::GeocoderConfig;
use crate::{Error, Result};

pub use cache::CachingGeocoder;
pub use http::HttpGeocoder;

/// Resolves a free-text place description to a coordinate
pub trait GeocodeResolver: Send + Sync {
    /// Look up `query` (e.g. "Springfield, IL")
    ///
    /// Returns [`Error::GeocodeUnavailable`] when no coordinate can be produced.
    fn resolve(&self, query: &str) -> Result<Coordinate>;
}

impl<T: GeocodeResolver + ?Sized> GeocodeResolver for &T {
    fn resolve(&self, query: &str) -> Result<Coordinate> {
        (**self).resolve(query)
    }
}

impl<T: GeocodeResolver + ?Sized> GeocodeResolver for Box<T> {
    fn resolve(&self, query: &str) -> Result<Coordinate> {
        (**self).resolve(query)
    }
}

impl<T: GeocodeResolver + ?Sized> GeocodeResolver for Arc<T> {
    fn resolve(&self, query: &str) -> Result<Coordinate> {
        (**self).resolve(query)
    }
}

/// Resolver used when geocoding is switched off
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGeocoder;

impl GeocodeResolver for DisabledGeocoder {
    fn resolve(&self, query: &str) -> Result<Coordinate> {
        Err(Error::geocode_unavailable(query, "geocoding is disabled"))
    }
}

/// Build the resolver described by the configuration
pub fn from_config(config: &GeocoderConfig) -> Result<Box<dyn GeocodeResolver>> {
    if !config.enabled {
        info!("Geocoding disabled; institution locations will carry no coordinates");
        return Ok(Box::new(DisabledGeocoder));
    }

    config.validate()?;
    let client = HttpGeocoder::new(config)?;
    info!(
        "Geocoding via {} (timeout {}s, cache {})",
        config.endpoint,
        config.timeout_secs,
        if config.cache { "on" } else { "off" }
    );

    if config.cache {
        Ok(Box::new(CachingGeocoder::new(client)))
    } else {
        Ok(Box::new(client))
    }
}
