//! Convert command implementation
//!
//! Streams rows from a file or stdin through classification, grouping and
//! geocoding, and writes each record as soon as it is produced.

use super::shared::{
    RecordWriter, create_spinner, load_configuration, open_output, print_summary, setup_logging,
};
use crate::app::services::field_classifier::FieldClassifier;
use crate::app::services::geocoder;
use crate::app::services::record_stream::{StreamStats, stream};
use crate::app::services::tabular_reader::TabularReader;
use crate::cli::args::ConvertArgs;
use crate::config::Config;
use crate::Result;
use indicatif::ProgressBar;
use std::io::Read;
use std::time::Instant;
use tracing::{debug, info};

/// Convert command runner
pub fn run_convert(args: ConvertArgs) -> Result<()> {
    let start_time = Instant::now();
    setup_logging(&args.common)?;

    info!("Starting grouped CSV conversion");
    debug!("Convert arguments: {:?}", args);

    let config = load_configuration(&args.common, |config| args.apply_to(config))?;

    let summary = if args.reads_stdin() {
        let reader = TabularReader::from_reader(std::io::stdin().lock(), &config.reader)?;
        convert_source(reader, &config, &args)?
    } else {
        let reader = TabularReader::open(&args.input, &config.reader)?;
        convert_source(reader, &config, &args)?
    };

    if !args.common.quiet {
        print_summary("Conversion Summary", &summary.lines(), start_time.elapsed());
    }
    Ok(())
}

/// What a conversion did, for the summary
#[derive(Debug, Default)]
struct ConvertSummary {
    rows_written: usize,
    stream: Option<StreamStats>,
}

impl ConvertSummary {
    fn lines(&self) -> Vec<(&'static str, String)> {
        let mut lines = vec![("Records written:", self.rows_written.to_string())];
        if let Some(stats) = &self.stream {
            let transform = &stats.transform;
            lines.push(("Rows read:", stats.rows_read.to_string()));
            lines.push(("Entries created:", transform.entries_created.to_string()));
            lines.push((
                "Stray values dropped:",
                transform.stray_values_dropped.to_string(),
            ));
            lines.push((
                "Geocoded:",
                format!(
                    "{}/{} ({:.1}%)",
                    transform.geocode_resolved,
                    transform.geocode_requests,
                    transform.geocode_success_rate()
                ),
            ));
        }
        lines
    }
}

fn convert_source<R: Read>(
    mut reader: TabularReader<R>,
    config: &Config,
    args: &ConvertArgs,
) -> Result<ConvertSummary> {
    let output = open_output(args.output.as_deref())?;
    let mut writer = RecordWriter::new(output, args.format);
    let progress = args
        .show_progress()
        .then(|| create_spinner(&format!("Converting {}", reader.source())));

    let summary = if config.reader.has_header {
        let resolver = geocoder::from_config(&config.geocoder)?;
        let classifier = FieldClassifier::new(&config.classifier);
        let mut records = stream(reader, &classifier, resolver, config.row_limit())?;

        for record in records.by_ref() {
            writer.write(&record?)?;
            tick(&progress);
        }
        ConvertSummary {
            rows_written: writer.finish()?,
            stream: Some(records.stats()),
        }
    } else {
        info!("Header parsing disabled; writing raw rows");
        let limit = config.row_limit().unwrap_or(usize::MAX);
        for row in reader.rows().take(limit) {
            writer.write(&row?)?;
            tick(&progress);
        }
        ConvertSummary {
            rows_written: writer.finish()?,
            stream: None,
        }
    };

    if let Some(pb) = progress {
        pb.finish_with_message(format!("Wrote {} records", summary.rows_written));
    }
    Ok(summary)
}

fn tick(progress: &Option<ProgressBar>) {
    if let Some(pb) = progress {
        pb.inc(1);
    }
}
