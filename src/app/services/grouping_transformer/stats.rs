//! Counters collected by the grouping transformer

use std::fmt;

/// Transformation statistics accumulated across rows
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct TransformStats {
    /// Rows turned into records
    pub rows_transformed: usize,

    /// Plain values copied into records
    pub plain_values: usize,

    /// Grouped block entries created
    pub entries_created: usize,

    /// Grouped values discarded because no entry was open
    pub stray_values_dropped: usize,

    /// Geocoding lookups issued
    pub geocode_requests: usize,

    /// Lookups that produced a coordinate
    pub geocode_resolved: usize,

    /// Lookups that failed and left the entry without coordinates
    pub geocode_failures: usize,
}

impl TransformStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share of geocoding lookups that succeeded, as a percentage
    pub fn geocode_success_rate(&self) -> f64 {
        if self.geocode_requests == 0 {
            0.0
        } else {
            (self.geocode_resolved as f64 / self.geocode_requests as f64) * 100.0
        }
    }
}

impl fmt::Display for TransformStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows, {} entries, {} stray values dropped, geocoded {}/{}",
            self.rows_transformed,
            self.entries_created,
            self.stray_values_dropped,
            self.geocode_resolved,
            self.geocode_requests
        )
    }
}
