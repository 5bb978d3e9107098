//! Per-family accumulator state
//!
//! An accumulator holds the entries started in the current row. The entry
//! started last is the open one; values for roles that do not start an entry
//! attach to it, or are dropped when no entry has been started yet.

use crate::app::models::{Family, GroupEntry, Role};
use crate::constants::{DEFAULT_MAP_ZOOM, entry_fields};

/// Outcome of feeding one cell to an accumulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accepted {
    /// A new entry was started
    Started,
    /// The value was attached to the open entry
    Attached,
    /// Empty cell, nothing to do
    Empty,
    /// No entry was open; the value was discarded
    Dropped,
    /// The column carries no field for this family
    Ignored,
}

/// An entry under construction, with the raw parts needed for geocoding
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingEntry {
    pub entry: GroupEntry,
    pub city: Option<String>,
    pub state: Option<String>,
}

impl PendingEntry {
    /// "City, State" when both parts are present
    pub fn geocode_query(&self) -> Option<String> {
        match (&self.city, &self.state) {
            (Some(city), Some(state)) => Some(format!("{}, {}", city, state)),
            _ => None,
        }
    }

    fn update_address(&mut self) {
        let address = match (&self.city, &self.state) {
            (Some(city), Some(state)) => format!("{}, {}", city, state),
            (Some(part), None) | (None, Some(part)) => part.clone(),
            (None, None) => return,
        };
        self.entry.location_mut().address = Some(address);
    }
}

/// Entry state for one family within one row
#[derive(Debug, Clone)]
pub struct FamilyAccumulator {
    family: Family,
    entries: Vec<PendingEntry>,
}

impl FamilyAccumulator {
    pub fn new(family: Family) -> Self {
        Self {
            family,
            entries: Vec::new(),
        }
    }

    pub fn family(&self) -> Family {
        self.family
    }

    /// Whether an entry is open to receive attached values
    pub fn has_open_entry(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Feed one cell of a column with the given role
    pub fn accept(&mut self, role: Role, value: &str) -> Accepted {
        let value = value.trim();
        if value.is_empty() {
            return Accepted::Empty;
        }
        if !self.carries_field(role) {
            return Accepted::Ignored;
        }

        let started = self.starts_entry(role);
        if started {
            self.entries.push(PendingEntry::default());
        }
        let Some(current) = self.entries.last_mut() else {
            return Accepted::Dropped;
        };

        match (self.family, role) {
            (Family::Institution, Role::Name) => {
                current.entry.set_text(entry_fields::INSTITUTE, value);
            }
            (Family::Institution, Role::City) => {
                current.city = Some(value.to_string());
                current.update_address();
            }
            (Family::Institution, Role::State) => {
                current.state = Some(value.to_string());
                current.update_address();
            }
            (Family::Institution, Role::Zip) => {
                current.entry.location_mut().zoom = Some(DEFAULT_MAP_ZOOM.to_string());
                current.entry.set_text(entry_fields::POSTAL_CODE, value);
            }
            (Family::Institution, Role::Type1) => {
                current.entry.set_text(entry_fields::INSTITUTION_TYPE_1, value);
            }
            (Family::Institution, Role::Type2) => {
                current.entry.set_text(entry_fields::INSTITUTION_TYPE_2, value);
            }
            (Family::Press | Family::Footnote, Role::Text) => {
                current.entry.set_text(entry_fields::TEXT, value);
            }
            (Family::Press, Role::Link) => {
                current.entry.set_text(entry_fields::LINK, value);
            }
            _ => return Accepted::Ignored,
        }

        if started {
            Accepted::Started
        } else {
            Accepted::Attached
        }
    }

    /// Close the accumulator, yielding its entries in start order
    pub fn into_entries(self) -> Vec<PendingEntry> {
        self.entries
    }

    fn starts_entry(&self, role: Role) -> bool {
        matches!(
            (self.family, role),
            (Family::Institution, Role::Name) | (Family::Press | Family::Footnote, Role::Text)
        )
    }

    fn carries_field(&self, role: Role) -> bool {
        match self.family {
            Family::Institution => matches!(
                role,
                Role::Name | Role::City | Role::State | Role::Zip | Role::Type1 | Role::Type2
            ),
            Family::Press => matches!(role, Role::Text | Role::Link),
            Family::Footnote => role == Role::Text,
        }
    }
}
