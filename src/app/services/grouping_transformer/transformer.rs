//! Row transformation
//!
//! Walks the classified columns of one row in header order and builds a
//! [`Record`]. Accumulators are created fresh for every row, so no entry state
//! leaks from one row into the next.

use tracing::{debug, warn};

use super::accumulator::{Accepted, FamilyAccumulator, PendingEntry};
use super::stats::TransformStats;
use crate::app::models::{ColumnTag, Family, FieldValue, GroupEntry, Record};
use crate::app::services::field_classifier::ColumnClassification;
use crate::app::services::geocoder::GeocodeResolver;
use crate::constants::{APOSTROPHE, DEFAULT_MAP_ZOOM, RIGHT_SINGLE_QUOTE};

/// Turns raw rows into structured records using a fixed classification
#[derive(Debug)]
pub struct GroupingTransformer<G> {
    classification: ColumnClassification,
    resolver: G,
    stats: TransformStats,
}

impl<G: GeocodeResolver> GroupingTransformer<G> {
    pub fn new(classification: ColumnClassification, resolver: G) -> Self {
        Self {
            classification,
            resolver,
            stats: TransformStats::new(),
        }
    }

    pub fn classification(&self) -> &ColumnClassification {
        &self.classification
    }

    pub fn stats(&self) -> &TransformStats {
        &self.stats
    }

    /// Build the record for one row
    ///
    /// Missing trailing cells are treated as empty; cells beyond the header
    /// are ignored.
    pub fn transform(&mut self, row: &[String]) -> Record {
        if row.len() != self.classification.len() {
            debug!(
                "Row has {} cells, header has {} columns",
                row.len(),
                self.classification.len()
            );
        }

        let mut record = Record::new();
        let mut accumulators = Family::ALL.map(FamilyAccumulator::new);

        for (index, name, tag) in self.classification.iter() {
            let cell = row.get(index).map(String::as_str).unwrap_or("");

            match tag {
                ColumnTag::Ignore => {}
                ColumnTag::Plain => {
                    if !cell.trim().is_empty() {
                        record.insert(name, FieldValue::Text(normalize_apostrophes(cell)));
                        self.stats.plain_values += 1;
                    }
                }
                ColumnTag::Grouped { family, role } => {
                    let Some(accumulator) =
                        accumulators.iter_mut().find(|a| a.family() == family)
                    else {
                        continue;
                    };
                    match accumulator.accept(role, cell) {
                        Accepted::Started => self.stats.entries_created += 1,
                        Accepted::Dropped => {
                            self.stats.stray_values_dropped += 1;
                            debug!(
                                "Dropped '{}' value in column {} ('{}'): no open {} entry",
                                role, index, name, family
                            );
                        }
                        Accepted::Attached | Accepted::Empty | Accepted::Ignored => {}
                    }
                }
            }
        }

        for accumulator in accumulators {
            if !accumulator.has_open_entry() {
                continue;
            }
            let family = accumulator.family();
            let entries: Vec<GroupEntry> = accumulator
                .into_entries()
                .into_iter()
                .map(|pending| self.finish_entry(family, pending))
                .collect();
            record.insert(family.block_field(), FieldValue::Block(entries));
        }

        self.stats.rows_transformed += 1;
        record
    }

    /// Close an entry, geocoding institution locations that have city and state
    fn finish_entry(&mut self, family: Family, pending: PendingEntry) -> GroupEntry {
        let query = match family {
            Family::Institution => pending.geocode_query(),
            Family::Press | Family::Footnote => None,
        };
        let mut entry = pending.entry;
        let Some(query) = query else {
            return entry;
        };

        self.stats.geocode_requests += 1;
        match self.resolver.resolve(&query) {
            Ok(coordinate) => {
                debug!("Resolved '{}' to {}", query, coordinate);
                let location = entry.location_mut();
                location.set_coordinate(coordinate);
                location.zoom = Some(DEFAULT_MAP_ZOOM.to_string());
                self.stats.geocode_resolved += 1;
            }
            Err(e) => {
                warn!("No coordinates for '{}': {}", query, e);
                self.stats.geocode_failures += 1;
            }
        }
        entry
    }
}

/// Replace every straight apostrophe with a typographic right single quote
pub fn normalize_apostrophes(value: &str) -> String {
    value.replace(APOSTROPHE, &RIGHT_SINGLE_QUOTE.to_string())
}
