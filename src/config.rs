//! Configuration management and validation.
//!
//! Provides configuration structures for the reader, the header classifier
//! and the geocoding client. Values are layered: built-in defaults, then an
//! optional YAML file, then command-line overrides.

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_DELIMITER, DEFAULT_GEOCODER_ENDPOINT,
    DEFAULT_GEOCODER_TIMEOUT_SECS, DEFAULT_GEOCODER_USER_AGENT, DEFAULT_IDENTIFIER_COLUMN,
    DEFAULT_MAX_FIELD_LENGTH, GEOCODER_KEY_ENV,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Delimited source settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Field delimiter, a single ASCII character
    pub delimiter: char,

    /// Maximum bytes kept per field; longer fields are truncated
    ///
    /// The cap applies to emitted values. The csv layer still buffers a
    /// whole field before it is truncated, so it does not bound memory use
    /// for a single oversized field.
    pub max_field_length: usize,

    /// Treat the first row as the header
    pub has_header: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            max_field_length: DEFAULT_MAX_FIELD_LENGTH,
            has_header: true,
        }
    }
}

impl ReaderConfig {
    /// Delimiter as the byte the csv layer expects
    pub fn delimiter_byte(&self) -> Result<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(Error::configuration(format!(
                "delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            )))
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.delimiter_byte()?;
        if matches!(self.delimiter, '"' | '\n' | '\r') {
            return Err(Error::configuration(format!(
                "delimiter {:?} is reserved",
                self.delimiter
            )));
        }
        if self.max_field_length == 0 {
            return Err(Error::configuration(
                "max_field_length must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Header classification settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Header token that marks the row identifier column
    pub identifier_column: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            identifier_column: DEFAULT_IDENTIFIER_COLUMN.to_string(),
        }
    }
}

/// Geocoding client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    /// Resolve institution locations at all
    pub enabled: bool,

    /// Geocoding endpoint accepting `address` and `key` query parameters
    pub endpoint: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// User agent sent with requests
    pub user_agent: String,

    /// API key; falls back to the environment when unset
    pub api_key: Option<String>,

    /// Remember results per query for the duration of a run
    pub cache: bool,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: DEFAULT_GEOCODER_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_GEOCODER_TIMEOUT_SECS,
            user_agent: DEFAULT_GEOCODER_USER_AGENT.to_string(),
            api_key: None,
            cache: true,
        }
    }
}

impl GeocoderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// API key from the config, or from the environment
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(GEOCODER_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        if self.timeout_secs == 0 {
            return Err(Error::configuration(
                "geocoder timeout_secs must be greater than zero",
            ));
        }
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(Error::configuration(format!(
                "geocoder endpoint must be an http(s) URL, got '{}'",
                self.endpoint
            )));
        }
        Ok(())
    }
}

/// Complete configuration for a conversion run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub reader: ReaderConfig,
    pub classifier: ClassifierConfig,
    pub geocoder: GeocoderConfig,

    /// Maximum number of data rows to convert (0 = all)
    pub limit: usize,
}

impl Config {
    /// Default config file location (`<config dir>/grouped-csv/config.yaml`)
    pub fn default_config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or_else(|| Error::configuration("could not determine user config directory"))
    }

    /// Load configuration from a YAML file; missing keys use defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("Failed to read config {}", path.display()), e))?;
        let config: Config = serde_yaml::from_str(&content).map_err(|e| {
            Error::configuration(format!("invalid config file {}: {}", path.display(), e))
        })?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from an explicit file, else from the default location if it exists, else defaults
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        if let Some(path) = config_file {
            return Self::from_file(path);
        }
        match Self::default_config_path() {
            Ok(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.reader.validate()?;
        if self.classifier.identifier_column.is_empty() {
            return Err(Error::configuration("identifier_column must not be empty"));
        }
        self.geocoder.validate()
    }

    /// Limit as an option (`None` = unbounded)
    pub fn row_limit(&self) -> Option<usize> {
        (self.limit > 0).then_some(self.limit)
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.reader.delimiter = delimiter;
        self
    }

    pub fn with_max_field_length(mut self, max_field_length: usize) -> Self {
        self.reader.max_field_length = max_field_length;
        self
    }

    pub fn without_header(mut self) -> Self {
        self.reader.has_header = false;
        self
    }

    pub fn with_identifier_column(mut self, identifier_column: impl Into<String>) -> Self {
        self.classifier.identifier_column = identifier_column.into();
        self
    }

    pub fn without_geocoding(mut self) -> Self {
        self.geocoder.enabled = false;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}
