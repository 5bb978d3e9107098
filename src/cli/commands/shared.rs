//! Shared components for CLI commands
//!
//! Logging setup, layered configuration loading, record output and the run
//! summary used by the command implementations.

use crate::cli::args::{CommonArgs, RecordFormat};
use crate::config::Config;
use crate::{Error, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Set up structured logging on stderr
pub fn setup_logging(args: &CommonArgs) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("grouped_csv={}", log_level)));

    let result = if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    result.map_err(|e| Error::configuration(format!("failed to initialise logging: {}", e)))?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration using layered approach (file -> args), then validate
pub fn load_configuration(
    common: &CommonArgs,
    overrides: impl FnOnce(Config) -> Config,
) -> Result<Config> {
    match &common.config_file {
        Some(path) => info!("Using config file: {}", path.display()),
        None => info!("No config file given, using default location or built-in defaults"),
    }

    let config = Config::load(common.config_file.as_deref())?;
    let config = overrides(config);
    config.validate()?;
    debug!("Loaded configuration: {:?}", config);
    Ok(config)
}

/// Open the record destination: a file, or stdout
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                Error::io(format!("Failed to create output {}", path.display()), e)
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(std::io::stdout().lock()))),
    }
}

/// Incremental writer emitting items in the chosen format as they arrive
pub struct RecordWriter<W: Write> {
    out: W,
    format: RecordFormat,
    written: usize,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(out: W, format: RecordFormat) -> Self {
        Self {
            out,
            format,
            written: 0,
        }
    }

    /// Write one item
    pub fn write<T: Serialize>(&mut self, item: &T) -> Result<()> {
        match self.format {
            RecordFormat::Json => {
                let separator = if self.written == 0 { "[\n" } else { ",\n" };
                self.out.write_all(separator.as_bytes())?;
                serde_json::to_writer_pretty(&mut self.out, item)?;
            }
            RecordFormat::JsonLines => {
                serde_json::to_writer(&mut self.out, item)?;
                self.out.write_all(b"\n")?;
            }
            RecordFormat::Yaml => {
                // A one-element sequence per item concatenates into one sequence
                let yaml = serde_yaml::to_string(&[item])?;
                self.out.write_all(yaml.as_bytes())?;
            }
        }
        self.written += 1;
        Ok(())
    }

    /// Close the document and flush, returning the number of items written
    pub fn finish(mut self) -> Result<usize> {
        match self.format {
            RecordFormat::Json if self.written == 0 => self.out.write_all(b"[]\n")?,
            RecordFormat::Json => self.out.write_all(b"\n]\n")?,
            RecordFormat::Yaml if self.written == 0 => self.out.write_all(b"[]\n")?,
            RecordFormat::JsonLines | RecordFormat::Yaml => {}
        }
        self.out.flush()?;
        Ok(self.written)
    }
}

/// Create a simple spinner progress bar for row counting
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}] {pos} rows")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Print a run summary on stderr
pub fn print_summary(title: &str, lines: &[(&str, String)], elapsed: Duration) {
    eprintln!("\n{}", title.bright_green().bold());
    eprintln!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        elapsed.as_millis().to_string().bright_white()
    );
    for (label, value) in lines {
        eprintln!("  {} {}", label.bright_cyan(), value.bright_white().bold());
    }
}
