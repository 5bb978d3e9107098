//! Data models for grouped CSV processing
//!
//! This module contains the column classification tags produced from a header
//! and the structured record types produced for each data row.

use crate::constants::{block_fields, entry_fields};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// A raw data row as read from the source
pub type Row = Vec<String>;

// =============================================================================
// Column Classification Tags
// =============================================================================

/// Column family whose columns fold into one nested block per record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Institution,
    Press,
    Footnote,
}

impl Family {
    /// All families in block emission order
    pub const ALL: [Family; 3] = [Family::Institution, Family::Press, Family::Footnote];

    /// Record field name under which this family's block is attached
    pub fn block_field(self) -> &'static str {
        match self {
            Family::Institution => block_fields::INSTITUTIONS,
            Family::Press => block_fields::PRESS,
            Family::Footnote => block_fields::FOOTNOTES,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Family::Institution => "institution",
            Family::Press => "press",
            Family::Footnote => "footnote",
        };
        write!(f, "{}", name)
    }
}

/// Role of a grouped column inside its family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Name,
    City,
    State,
    Zip,
    Type1,
    Type2,
    Text,
    Link,
    /// Belongs to the family but carries no recognised sub-field
    Unrecognised,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Name => "name",
            Role::City => "city",
            Role::State => "state",
            Role::Zip => "zip",
            Role::Type1 => "type 1",
            Role::Type2 => "type 2",
            Role::Text => "text",
            Role::Link => "link",
            Role::Unrecognised => "unrecognised",
        };
        write!(f, "{}", name)
    }
}

/// Classification of a single header column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnTag {
    /// Copied into the record under its header name
    Plain,
    /// Identifier column, never copied
    Ignore,
    /// Folded into the family's nested block
    Grouped { family: Family, role: Role },
}

impl fmt::Display for ColumnTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnTag::Plain => write!(f, "plain"),
            ColumnTag::Ignore => write!(f, "ignore"),
            ColumnTag::Grouped { family, role } => write!(f, "{} / {}", family, role),
        }
    }
}

// =============================================================================
// Geocoding
// =============================================================================

/// Latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lng)
    }
}

// =============================================================================
// Record Structure
// =============================================================================

/// Nested location object of an institution entry
///
/// Coordinates and zoom are kept as strings, matching the quoted scalars the
/// content host expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<String>,
}

impl Location {
    /// Set latitude and longitude from a resolved coordinate
    pub fn set_coordinate(&mut self, coordinate: Coordinate) {
        self.lat = Some(coordinate.lat.to_string());
        self.lng = Some(coordinate.lng.to_string());
    }

    /// Whether coordinates are attached
    pub fn has_coordinate(&self) -> bool {
        self.lat.is_some() && self.lng.is_some()
    }
}

/// Value of a sub-field inside a grouped block entry
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum EntryValue {
    Text(String),
    Location(Location),
}

impl EntryValue {
    /// Borrow as a location, replacing a scalar with an empty location first
    fn make_location(&mut self) -> &mut Location {
        match self {
            EntryValue::Location(location) => location,
            scalar => {
                *scalar = EntryValue::Location(Location::default());
                scalar.make_location()
            }
        }
    }
}

/// One entry of a grouped block, with sub-fields in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupEntry {
    fields: Vec<(String, EntryValue)>,
}

impl GroupEntry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a scalar sub-field, replacing any previous value in place
    pub fn set_text(&mut self, key: &str, value: impl Into<String>) {
        let value = EntryValue::Text(value.into());
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key.to_string(), value)),
        }
    }

    /// Location object of this entry, created at the current position if absent
    ///
    /// A scalar stored under the location key is replaced by an empty location.
    pub fn location_mut(&mut self) -> &mut Location {
        let position = match self
            .fields
            .iter()
            .position(|(k, _)| k == entry_fields::LOCATION)
        {
            Some(position) => position,
            None => {
                self.fields.push((
                    entry_fields::LOCATION.to_string(),
                    EntryValue::Location(Location::default()),
                ));
                self.fields.len() - 1
            }
        };

        self.fields[position].1.make_location()
    }

    /// Location object of this entry, if any
    pub fn location(&self) -> Option<&Location> {
        self.fields.iter().find_map(|(k, v)| match v {
            EntryValue::Location(location) if k == entry_fields::LOCATION => Some(location),
            _ => None,
        })
    }

    pub fn get(&self, key: &str) -> Option<&EntryValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Scalar sub-field value
    pub fn get_text(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(EntryValue::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Sub-field names in emission order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for GroupEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Value of a top-level record field
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Block(Vec<GroupEntry>),
}

/// Structured output for one input row
///
/// Fields keep insertion order: plain fields in column order, followed by the
/// grouped blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field; a repeated name replaces the earlier value in place
    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Scalar field value
    pub fn get_text(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(FieldValue::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Grouped block value
    pub fn get_block(&self, key: &str) -> Option<&[GroupEntry]> {
        match self.get(key) {
            Some(FieldValue::Block(entries)) => Some(entries.as_slice()),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Field names in emission order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
