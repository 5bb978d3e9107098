//! Command-line argument definitions for grouped CSV conversion
//!
//! This module defines the CLI interface using the clap derive API.

use crate::config::Config;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

/// CLI arguments for the grouped CSV converter
///
/// Converts spreadsheet exports whose headers repeat Institution, Press and
/// Footnotes column families into structured records.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "grouped-csv",
    version,
    about = "Convert grouped spreadsheet exports into structured, geocoded records",
    long_about = "Reads a delimited export whose header repeats column families such as \
                  'Inst1 Name', 'Inst2 City', 'Press1 Link' or 'Footnotes Text', folds each \
                  family into an ordered list of nested entries, geocodes institution \
                  locations and writes one record per row as JSON or YAML."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Convert rows into structured records (main command)
    Convert(ConvertArgs),
    /// Show how each header column is classified
    Classify(ClassifyArgs),
}

/// Options shared by every subcommand
#[derive(Debug, Clone, ClapArgs)]
pub struct CommonArgs {
    /// Path to configuration file
    ///
    /// YAML configuration file. If not specified, looks for
    /// ~/.config/grouped-csv/config.yaml
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (YAML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Field delimiter
    #[arg(
        short = 'd',
        long = "delimiter",
        value_name = "CHAR",
        help = "Field delimiter (default ',')"
    )]
    pub delimiter: Option<char>,

    /// Header token marking the identifier column, which is never copied
    #[arg(
        long = "identifier-column",
        value_name = "NAME",
        help = "Header of the identifier column to skip (default 'ID')"
    )]
    pub identifier_column: Option<String>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl CommonArgs {
    /// Log level implied by -v/-q
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Apply overrides shared by all commands
    pub fn apply_to(&self, mut config: Config) -> Config {
        if let Some(delimiter) = self.delimiter {
            config = config.with_delimiter(delimiter);
        }
        if let Some(identifier) = &self.identifier_column {
            config = config.with_identifier_column(identifier.clone());
        }
        config
    }
}

/// Arguments for the convert command
#[derive(Debug, Clone, Parser)]
pub struct ConvertArgs {
    /// Input delimited file, or '-' for stdin
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output file; defaults to stdout
    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help = "Output file for records (default: stdout)"
    )]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(
        short = 'f',
        long = "format",
        value_enum,
        default_value = "json",
        help = "Output format for records"
    )]
    pub format: RecordFormat,

    /// Stop after this many data rows (0 = all)
    #[arg(
        short = 'n',
        long = "limit",
        value_name = "ROWS",
        help = "Convert at most this many data rows"
    )]
    pub limit: Option<usize>,

    /// Maximum bytes kept per field
    #[arg(
        long = "max-field-length",
        value_name = "BYTES",
        help = "Truncate fields longer than this many bytes (default 8000)"
    )]
    pub max_field_length: Option<usize>,

    /// Treat the first row as data; rows are emitted as plain lists
    #[arg(long = "no-header", help = "Input has no header row; emit raw rows")]
    pub no_header: bool,

    /// Skip geocoding entirely
    #[arg(long = "no-geocode", help = "Do not geocode institution locations")]
    pub no_geocode: bool,

    /// Geocoding endpoint
    #[arg(
        long = "geocoder-endpoint",
        value_name = "URL",
        help = "Geocoding endpoint (Google Geocoding JSON API compatible)"
    )]
    pub geocoder_endpoint: Option<String>,

    /// Geocoding request timeout in seconds
    #[arg(
        long = "geocoder-timeout",
        value_name = "SECS",
        help = "Per-request geocoding timeout in seconds"
    )]
    pub geocoder_timeout: Option<u64>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ConvertArgs {
    /// Whether records are read from stdin
    pub fn reads_stdin(&self) -> bool {
        is_stdin(&self.input)
    }

    /// Show a progress spinner only when records go to a file
    pub fn show_progress(&self) -> bool {
        self.output.is_some() && !self.common.quiet
    }

    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply_to(&self, config: Config) -> Config {
        let mut config = self.common.apply_to(config);
        if let Some(limit) = self.limit {
            config = config.with_limit(limit);
        }
        if let Some(max) = self.max_field_length {
            config = config.with_max_field_length(max);
        }
        if self.no_header {
            config = config.without_header();
        }
        if self.no_geocode {
            config = config.without_geocoding();
        }
        if let Some(endpoint) = &self.geocoder_endpoint {
            config.geocoder.endpoint = endpoint.clone();
        }
        if let Some(timeout) = self.geocoder_timeout {
            config.geocoder.timeout_secs = timeout;
        }
        config
    }
}

/// Arguments for the classify command
#[derive(Debug, Clone, Parser)]
pub struct ClassifyArgs {
    /// Input delimited file, or '-' for stdin
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Report format
    #[arg(
        long = "format",
        value_enum,
        default_value = "human",
        help = "Output format for the classification report"
    )]
    pub format: ReportFormat,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ClassifyArgs {
    pub fn reads_stdin(&self) -> bool {
        is_stdin(&self.input)
    }
}

/// Serialization format for converted records
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RecordFormat {
    /// Pretty-printed JSON array
    Json,
    /// One compact JSON document per line
    JsonLines,
    /// YAML sequence
    Yaml,
}

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_defaults() {
        let args = Args::try_parse_from(["grouped-csv", "convert", "projects.csv"]).unwrap();
        let Some(Commands::Convert(convert)) = args.command else {
            panic!("expected convert command");
        };

        assert_eq!(convert.input, PathBuf::from("projects.csv"));
        assert_eq!(convert.format, RecordFormat::Json);
        assert!(!convert.reads_stdin());
        assert!(!convert.show_progress());
        assert_eq!(convert.common.get_log_level(), "warn");
        assert_eq!(convert.apply_to(Config::default()), Config::default());
    }

    #[test]
    fn test_convert_overrides() {
        let args = Args::try_parse_from([
            "grouped-csv",
            "convert",
            "-",
            "-o",
            "out.yaml",
            "--format",
            "yaml",
            "--limit",
            "10",
            "--delimiter",
            ";",
            "--no-geocode",
            "--identifier-column",
            "Key",
            "-vv",
        ])
        .unwrap();
        let Some(Commands::Convert(convert)) = args.command else {
            panic!("expected convert command");
        };

        assert!(convert.reads_stdin());
        assert!(convert.show_progress());
        assert_eq!(convert.format, RecordFormat::Yaml);
        assert_eq!(convert.common.get_log_level(), "debug");

        let config = convert.apply_to(Config::default());
        assert_eq!(config.reader.delimiter, ';');
        assert_eq!(config.row_limit(), Some(10));
        assert!(!config.geocoder.enabled);
        assert_eq!(config.classifier.identifier_column, "Key");
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Args::try_parse_from(["grouped-csv", "convert", "in.csv", "-q", "-v"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_classify_args() {
        let args =
            Args::try_parse_from(["grouped-csv", "classify", "in.csv", "--format", "json", "-q"])
                .unwrap();
        let Some(Commands::Classify(classify)) = args.command else {
            panic!("expected classify command");
        };
        assert_eq!(classify.format, ReportFormat::Json);
        assert_eq!(classify.common.get_log_level(), "error");
    }
}
