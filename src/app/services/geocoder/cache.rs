//! Per-run memoisation of geocoding lookups
//!
//! Spreadsheets repeat the same city on many rows. Both successes and
//! failures are remembered, so an unresolvable place costs one timeout per
//! run rather than one per row.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use super::GeocodeResolver;
use crate::app::models::Coordinate;
use crate::{Error, Result};

/// Wraps a resolver and remembers its answers by query
#[derive(Debug)]
pub struct CachingGeocoder<R> {
    inner: R,
    cache: Mutex<HashMap<String, Option<Coordinate>>>,
}

impl<R: GeocodeResolver> CachingGeocoder<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of distinct queries seen
    pub fn cached_queries(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<R: GeocodeResolver> GeocodeResolver for CachingGeocoder<R> {
    fn resolve(&self, query: &str) -> Result<Coordinate> {
        let cached = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(query)
            .copied();

        if let Some(entry) = cached {
            debug!("Geocode cache hit for '{}'", query);
            return entry
                .ok_or_else(|| Error::geocode_unavailable(query, "previous lookup failed"));
        }

        // The lock is not held across the lookup itself
        let result = self.inner.resolve(query);
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(query.to_string(), result.as_ref().ok().copied());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingResolver {
        calls: AtomicUsize,
    }

    impl GeocodeResolver for CountingResolver {
        fn resolve(&self, query: &str) -> Result<Coordinate> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if query.starts_with("Springfield") {
                Ok(Coordinate::new(39.8, -89.6))
            } else {
                Err(Error::geocode_unavailable(query, "unknown place"))
            }
        }
    }

    #[test]
    fn test_repeated_queries_hit_inner_once() {
        let geocoder = CachingGeocoder::new(CountingResolver {
            calls: AtomicUsize::new(0),
        });

        for _ in 0..3 {
            assert_eq!(
                geocoder.resolve("Springfield, IL").unwrap(),
                Coordinate::new(39.8, -89.6)
            );
        }
        assert_eq!(geocoder.inner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(geocoder.cached_queries(), 1);
    }

    #[test]
    fn test_failures_are_cached() {
        let geocoder = CachingGeocoder::new(CountingResolver {
            calls: AtomicUsize::new(0),
        });

        assert!(geocoder.resolve("Atlantis, XX").is_err());
        assert!(geocoder.resolve("Atlantis, XX").is_err());
        assert!(geocoder.resolve("Springfield, IL").is_ok());

        assert_eq!(geocoder.inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(geocoder.cached_queries(), 2);
    }
}
