//! Grouped CSV Library
//!
//! A Rust library for turning spreadsheet exports whose headers encode
//! repeated column families ("Inst1 Name", "Inst2 City", "Press Text",
//! "Footnotes Text", ...) into structured records.
//!
//! This library provides tools for:
//! - Streaming rows from delimited text with a per-field length guard
//! - Classifying header columns once into plain, grouped and ignored columns
//! - Folding grouped columns into ordered `Institutions`, `Press` and
//!   `Footnotes` blocks
//! - Geocoding institution locations through a pluggable resolver
//! - Assembling a lazy, ordered record stream for downstream consumers

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod field_classifier;
        pub mod geocoder;
        pub mod grouping_transformer;
        pub mod record_stream;
        pub mod tabular_reader;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{
    ColumnTag, Coordinate, EntryValue, Family, FieldValue, GroupEntry, Location, Record, Role,
};
pub use app::services::field_classifier::{ColumnClassification, FieldClassifier};
pub use app::services::geocoder::{
    CachingGeocoder, DisabledGeocoder, GeocodeResolver, HttpGeocoder,
};
pub use app::services::grouping_transformer::{GroupingTransformer, TransformStats};
pub use app::services::record_stream::{RecordStream, StreamStats, stream};
pub use app::services::tabular_reader::TabularReader;
pub use config::Config;

/// Result type alias for grouped CSV processing
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for reading, classifying and transforming grouped CSV data
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The input source could not be opened
    #[error("Source not found: {path}")]
    SourceNotFound { path: String },

    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// A row could not be read from the source; aborts the stream
    #[error("Failed to read row {row}: {message}")]
    RowRead {
        row: usize,
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// Geocoding lookup produced no coordinate
    #[error("Geocode unavailable for '{query}': {reason}")]
    GeocodeUnavailable { query: String, reason: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Reader used out of order (header read twice or after rows)
    #[error("Invalid reader state: {message}")]
    InvalidReaderState { message: String },

    /// Record output could not be serialized
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl Error {
    /// Create a source not found error
    pub fn source_not_found(path: impl Into<String>) -> Self {
        Self::SourceNotFound { path: path.into() }
    }

    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a row read error
    pub fn row_read(row: usize, message: impl Into<String>, source: Option<csv::Error>) -> Self {
        Self::RowRead {
            row,
            message: message.into(),
            source,
        }
    }

    /// Create a geocode unavailable error
    pub fn geocode_unavailable(query: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::GeocodeUnavailable {
            query: query.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an invalid reader state error
    pub fn invalid_reader_state(message: impl Into<String>) -> Self {
        Self::InvalidReaderState {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Whether this error ends the record stream
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::GeocodeUnavailable { .. })
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        let row = error
            .position()
            .map(|pos| pos.record() as usize)
            .unwrap_or_default();
        Self::RowRead {
            row,
            message: "CSV parsing failed".to_string(),
            source: Some(error),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            message: format!("JSON encoding failed: {}", error),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(error: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: format!("YAML encoding failed: {}", error),
        }
    }
}
