//! Test utilities and stub infrastructure for grouping transformer testing
//!
//! This module provides a recording stub resolver and helpers shared by the
//! transformer and accumulator test modules.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::app::models::Coordinate;
use crate::app::services::field_classifier::FieldClassifier;
use crate::app::services::geocoder::GeocodeResolver;
use crate::app::services::grouping_transformer::GroupingTransformer;
use crate::{Error, Result};


/// Stub resolver answering from a fixed table and recording every query
#[derive(Debug, Default)]
pub struct StubResolver {
    answers: HashMap<String, Coordinate>,
    queries: Mutex<Vec<String>>,
}

impl StubResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answer(mut self, query: &str, lat: f64, lng: f64) -> Self {
        self.answers
            .insert(query.to_string(), Coordinate::new(lat, lng));
        self
    }

    /// Queries received so far, in call order
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl GeocodeResolver for StubResolver {
    fn resolve(&self, query: &str) -> Result<Coordinate> {
        self.queries.lock().unwrap().push(query.to_string());
        self.answers
            .get(query)
            .copied()
            .ok_or_else(|| Error::geocode_unavailable(query, "not in stub table"))
    }
}

/// Build an owned header or row from string literals
pub fn cells(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Create a transformer for a header with the default classifier
pub fn transformer_for<'a>(
    header: &[&str],
    resolver: &'a StubResolver,
) -> GroupingTransformer<&'a StubResolver> {
    let classification = FieldClassifier::default().classify(&cells(header));
    GroupingTransformer::new(classification, resolver)
}

/// Header of the reference institution scenario
pub const INSTITUTION_HEADER: &[&str] = &[
    "ID",
    "Title",
    "Inst1 Name",
    "Inst1 City",
    "Inst1 State",
    "Inst1 Zip",
];
