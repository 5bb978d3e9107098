//! Classify command implementation
//!
//! Reads only the header of the input and reports how every column will be
//! treated during conversion.

use super::shared::{load_configuration, setup_logging};
use crate::app::models::ColumnTag;
use crate::app::services::field_classifier::{ColumnClassification, FieldClassifier};
use crate::app::services::tabular_reader::TabularReader;
use crate::cli::args::{ClassifyArgs, ReportFormat};
use crate::config::Config;
use crate::{Family, Result};
use colored::*;
use serde::Serialize;
use std::io::Read;
use tracing::info;

/// Classify command runner
pub fn run_classify(args: ClassifyArgs) -> Result<()> {
    setup_logging(&args.common)?;
    let config = load_configuration(&args.common, |config| args.common.apply_to(config))?;

    let classification = if args.reads_stdin() {
        let reader = TabularReader::from_reader(std::io::stdin().lock(), &config.reader)?;
        classify_source(reader, &config)?
    } else {
        let reader = TabularReader::open(&args.input, &config.reader)?;
        classify_source(reader, &config)?
    };

    match args.format {
        ReportFormat::Human => print_human(&classification),
        ReportFormat::Json => {
            let report = ClassificationReport::from(&classification);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

fn classify_source<R: Read>(
    mut reader: TabularReader<R>,
    config: &Config,
) -> Result<ColumnClassification> {
    let header = reader.read_header()?;
    info!("Classifying {} header columns of {}", header.len(), reader.source());
    Ok(FieldClassifier::new(&config.classifier).classify(&header))
}

/// Machine-readable classification report
#[derive(Debug, Serialize)]
pub struct ClassificationReport {
    pub columns: Vec<ColumnReport>,
    pub plain: usize,
    pub ignored: usize,
    pub institutions: usize,
    pub press: usize,
    pub footnotes: usize,
}

#[derive(Debug, Serialize)]
pub struct ColumnReport {
    pub index: usize,
    pub name: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl From<&ColumnClassification> for ClassificationReport {
    fn from(classification: &ColumnClassification) -> Self {
        let columns = classification
            .iter()
            .map(|(index, name, tag)| {
                let (kind, family, role) = match tag {
                    ColumnTag::Plain => ("plain", None, None),
                    ColumnTag::Ignore => ("ignore", None, None),
                    ColumnTag::Grouped { family, role } => {
                        ("grouped", Some(family.to_string()), Some(role.to_string()))
                    }
                };
                ColumnReport {
                    index,
                    name: name.to_string(),
                    kind,
                    family,
                    role,
                }
            })
            .collect();

        Self {
            columns,
            plain: classification.plain_count(),
            ignored: classification.ignored_count(),
            institutions: classification.family_column_count(Family::Institution),
            press: classification.family_column_count(Family::Press),
            footnotes: classification.family_column_count(Family::Footnote),
        }
    }
}

fn print_human(classification: &ColumnClassification) {
    println!("{}", "Header Classification".bright_green().bold());
    if classification.is_empty() {
        println!("  {}", "(empty header)".yellow());
        return;
    }

    for (index, name, tag) in classification.iter() {
        let tag_text = match tag {
            ColumnTag::Plain => tag.to_string().normal(),
            ColumnTag::Ignore => tag.to_string().dimmed(),
            ColumnTag::Grouped { family, .. } => {
                format!("{} -> {}", tag, family.block_field()).bright_yellow()
            }
        };
        println!(
            "  {:>3}  {:<32} {}",
            index.to_string().bright_cyan(),
            name.bright_white(),
            tag_text
        );
    }

    println!();
    println!(
        "  {} {}  {} {}",
        "Plain:".bright_cyan(),
        classification.plain_count().to_string().bright_white(),
        "Ignored:".bright_cyan(),
        classification.ignored_count().to_string().bright_white()
    );
    for family in Family::ALL {
        println!(
            "  {} {}",
            format!("{} columns:", family.block_field()).bright_cyan(),
            classification.family_column_count(family).to_string().bright_white()
        );
    }
}
