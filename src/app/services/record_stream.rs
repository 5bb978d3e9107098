//! Record stream assembly
//!
//! Drives the reader and the transformer row by row. The stream is lazy and
//! one-pass: each record is produced when requested, in input order, and is
//! not retained afterwards. The stream owns the reader, so dropping the
//! stream releases the source whether it was exhausted, stopped early or
//! failed.

use std::io::Read;
use std::iter::FusedIterator;

use tracing::{error, info};

use crate::app::models::Record;
use crate::app::services::field_classifier::{ColumnClassification, FieldClassifier};
use crate::app::services::geocoder::GeocodeResolver;
use crate::app::services::grouping_transformer::{GroupingTransformer, TransformStats};
use crate::app::services::tabular_reader::TabularReader;
use crate::Result;

/// Read the header, classify it once and return the record stream
///
/// `limit` of `None` or `Some(0)` streams every row.
pub fn stream<R: Read, G: GeocodeResolver>(
    mut reader: TabularReader<R>,
    classifier: &FieldClassifier,
    resolver: G,
    limit: Option<usize>,
) -> Result<RecordStream<R, G>> {
    let header = reader.read_header()?;
    let classification = classifier.classify(&header);
    Ok(RecordStream::new(reader, classification, resolver, limit))
}

/// Stream statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct StreamStats {
    /// Data rows read from the source
    pub rows_read: usize,

    /// Records handed to the consumer
    pub records_emitted: usize,

    /// Transformer counters
    pub transform: TransformStats,
}

/// Lazy iterator of records over a tabular source
#[derive(Debug)]
pub struct RecordStream<R: Read, G> {
    reader: TabularReader<R>,
    transformer: GroupingTransformer<G>,
    limit: Option<usize>,
    emitted: usize,
    finished: bool,
}

impl<R: Read, G: GeocodeResolver> RecordStream<R, G> {
    /// Build a stream over a reader whose header was already classified
    pub fn new(
        reader: TabularReader<R>,
        classification: ColumnClassification,
        resolver: G,
        limit: Option<usize>,
    ) -> Self {
        Self {
            reader,
            transformer: GroupingTransformer::new(classification, resolver),
            limit: limit.filter(|&limit| limit > 0),
            emitted: 0,
            finished: false,
        }
    }

    pub fn classification(&self) -> &ColumnClassification {
        self.transformer.classification()
    }

    pub fn stats(&self) -> StreamStats {
        StreamStats {
            rows_read: self.reader.rows_read(),
            records_emitted: self.emitted,
            transform: self.transformer.stats().clone(),
        }
    }

    /// Drain the stream, stopping at the first fatal error
    pub fn collect_records(self) -> Result<Vec<Record>> {
        self.collect()
    }

    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        info!(
            "Finished {}: {} records emitted ({})",
            self.reader.source(),
            self.emitted,
            self.transformer.stats()
        );
    }
}

impl<R: Read, G: GeocodeResolver> Iterator for RecordStream<R, G> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if self.limit.is_some_and(|limit| self.emitted >= limit) {
            self.finish();
            return None;
        }

        match self.reader.read_row() {
            Ok(Some(row)) => {
                let record = self.transformer.transform(&row);
                self.emitted += 1;
                Some(Ok(record))
            }
            Ok(None) => {
                self.finish();
                None
            }
            Err(e) => {
                error!("Stopping record stream: {}", e);
                self.finish();
                Some(Err(e))
            }
        }
    }
}

impl<R: Read, G: GeocodeResolver> FusedIterator for RecordStream<R, G> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::Coordinate;
    use crate::app::services::geocoder::DisabledGeocoder;
    use crate::config::ReaderConfig;
    use crate::{Error, Result};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const CSV: &str = "ID,Title,Inst1 Name,Inst1 City,Inst1 State\n\
                       1,Alpha,Acme U,Springfield,IL\n\
                       2,Beta,,,\n\
                       3,Gamma,Rose C,Portland,OR\n\
                       4,Delta,,,\n";

    fn reader(content: &'static str) -> TabularReader<&'static [u8]> {
        TabularReader::from_reader(content.as_bytes(), &ReaderConfig::default()).unwrap()
    }

    struct CountingResolver(AtomicUsize);

    impl GeocodeResolver for CountingResolver {
        fn resolve(&self, _query: &str) -> Result<Coordinate> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Coordinate::new(1.0, 2.0))
        }
    }

    fn titles(records: &[Record]) -> Vec<&str> {
        records.iter().filter_map(|r| r.get_text("Title")).collect()
    }

    #[test]
    fn test_all_rows_in_order() {
        let records = stream(reader(CSV), &FieldClassifier::default(), DisabledGeocoder, None)
            .unwrap()
            .collect_records()
            .unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(titles(&records), vec!["Alpha", "Beta", "Gamma", "Delta"]);
        assert!(records[0].contains_key("Institutions"));
        assert!(!records[1].contains_key("Institutions"));
    }

    #[test]
    fn test_limit_stops_early() {
        let resolver = CountingResolver(AtomicUsize::new(0));
        let mut records =
            stream(reader(CSV), &FieldClassifier::default(), &resolver, Some(2)).unwrap();

        let first_two: Vec<_> = records.by_ref().map(|r| r.unwrap()).collect();
        assert_eq!(titles(&first_two), vec!["Alpha", "Beta"]);
        assert!(records.next().is_none());

        // Rows past the limit are never read or geocoded
        assert_eq!(records.stats().rows_read, 2);
        assert_eq!(resolver.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_zero_limit_is_unbounded() {
        let count = stream(reader(CSV), &FieldClassifier::default(), DisabledGeocoder, Some(0))
            .unwrap()
            .count();
        assert_eq!(count, 4);
    }

    #[test]
    fn test_header_only_source() {
        let mut records = stream(
            reader("ID,Title\n"),
            &FieldClassifier::default(),
            DisabledGeocoder,
            None,
        )
        .unwrap();
        assert!(records.next().is_none());
        assert_eq!(records.stats().records_emitted, 0);
    }

    /// Serves its bytes once, then reports an I/O failure
    struct FailingSource(Option<&'static [u8]>);

    impl std::io::Read for FailingSource {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let Some(data) = self.0.take() else {
                return Err(std::io::Error::other("connection reset"));
            };
            let n = data.len().min(buf.len());
            buf[..n].copy_from_slice(&data[..n]);
            Ok(n)
        }
    }

    #[test]
    fn test_legacy_encoded_row_does_not_stop_stream() {
        let bytes: &'static [u8] = b"ID,Title\n1,Owner\x92s pick\n2,Beta\n3,Gamma\n";
        let source = TabularReader::from_reader(bytes, &ReaderConfig::default()).unwrap();
        let records = stream(source, &FieldClassifier::default(), DisabledGeocoder, None)
            .unwrap()
            .collect_records()
            .unwrap();

        assert_eq!(titles(&records), vec!["Owner\u{2019}s pick", "Beta", "Gamma"]);
    }

    #[test]
    fn test_row_error_aborts_stream() {
        let source = TabularReader::from_reader(
            FailingSource(Some(b"Title\nOne\n")),
            &ReaderConfig::default(),
        )
        .unwrap();
        let mut records = stream(source, &FieldClassifier::default(), DisabledGeocoder, None).unwrap();

        assert!(records.next().unwrap().is_ok());
        assert!(matches!(records.next(), Some(Err(Error::RowRead { .. }))));
        assert!(records.next().is_none());
        assert!(records.next().is_none());
    }

    #[test]
    fn test_collect_records_propagates_row_error() {
        let source = TabularReader::from_reader(
            FailingSource(Some(b"Title\nOne\n")),
            &ReaderConfig::default(),
        )
        .unwrap();
        let result = stream(source, &FieldClassifier::default(), DisabledGeocoder, None)
            .unwrap()
            .collect_records();
        assert!(result.is_err());
    }

    #[test]
    fn test_stats_accumulate() {
        let resolver = CountingResolver(AtomicUsize::new(0));
        let mut records = stream(reader(CSV), &FieldClassifier::default(), &resolver, None).unwrap();
        records.by_ref().for_each(drop);

        let stats = records.stats();
        assert_eq!(stats.rows_read, 4);
        assert_eq!(stats.records_emitted, 4);
        assert_eq!(stats.transform.entries_created, 2);
        assert_eq!(stats.transform.geocode_requests, 2);
        assert_eq!(stats.transform.geocode_resolved, 2);
    }

    #[test]
    fn test_classification_is_exposed() {
        let records = stream(reader(CSV), &FieldClassifier::default(), DisabledGeocoder, None).unwrap();
        assert_eq!(records.classification().len(), 5);
        assert_eq!(records.classification().ignored_count(), 1);
    }
}
