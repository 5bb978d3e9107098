//! Application constants for grouped CSV processing
//!
//! This module contains default values, header keywords and output field
//! names shared by the reader, classifier, transformer and CLI.

// =============================================================================
// Reader Defaults
// =============================================================================

/// Default field delimiter
pub const DEFAULT_DELIMITER: char = ',';

/// Default maximum length of a single field in bytes; longer fields are truncated
pub const DEFAULT_MAX_FIELD_LENGTH: usize = 8000;

/// Header token reserved for row identifiers, which are never copied into records
pub const DEFAULT_IDENTIFIER_COLUMN: &str = "ID";

// =============================================================================
// Header Keywords
// =============================================================================

/// Substrings that place a header column in a family, in precedence order
pub mod family_keywords {
    pub const INSTITUTION: &str = "Inst";
    pub const PRESS: &str = "Press";
    pub const FOOTNOTE: &str = "Footnotes";
}

/// Substrings that select a column's role inside its family
pub mod role_keywords {
    pub const NAME: &str = "Name";
    pub const CITY: &str = "City";
    pub const STATE: &str = "State";
    pub const ZIP: &str = "Zip";
    pub const TYPE_1: &str = "Type 1";
    pub const TYPE_2: &str = "Type 2";
    pub const TEXT: &str = "Text";
    pub const LINK: &str = "Link";
}

// =============================================================================
// Output Field Names
// =============================================================================

/// Record field names for the grouped blocks, in emission order
pub mod block_fields {
    pub const INSTITUTIONS: &str = "Institutions";
    pub const PRESS: &str = "Press";
    pub const FOOTNOTES: &str = "Footnotes";
}

/// Sub-field names used inside grouped block entries
pub mod entry_fields {
    pub const INSTITUTE: &str = "institute";
    pub const LOCATION: &str = "location";
    pub const POSTAL_CODE: &str = "postalcode";
    pub const INSTITUTION_TYPE_1: &str = "institution_type_1";
    pub const INSTITUTION_TYPE_2: &str = "institution_type_2";
    pub const TEXT: &str = "text";
    pub const LINK: &str = "link";
}

/// Straight apostrophe found in spreadsheet text
pub const APOSTROPHE: char = '\'';

/// Typographic right single quotation mark substituted for apostrophes
pub const RIGHT_SINGLE_QUOTE: char = '\u{2019}';

/// Map zoom level attached to institution locations
pub const DEFAULT_MAP_ZOOM: &str = "9";

// =============================================================================
// Geocoding Defaults
// =============================================================================

/// Default geocoding endpoint (Google Geocoding JSON API)
pub const DEFAULT_GEOCODER_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Default per-request geocoding timeout in seconds
pub const DEFAULT_GEOCODER_TIMEOUT_SECS: u64 = 10;

/// User agent sent with geocoding requests
pub const DEFAULT_GEOCODER_USER_AGENT: &str =
    concat!("grouped-csv/", env!("CARGO_PKG_VERSION"));

/// Environment variable holding the geocoding API key
pub const GEOCODER_KEY_ENV: &str = "GROUPED_CSV_GEOCODER_KEY";

// =============================================================================
// Configuration
// =============================================================================

/// Directory name under the user config directory
pub const CONFIG_DIR_NAME: &str = "grouped-csv";

/// Config file name inside [`CONFIG_DIR_NAME`]
pub const CONFIG_FILE_NAME: &str = "config.yaml";
