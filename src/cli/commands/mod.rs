//! Command implementations for the grouped CSV CLI
//!
//! Each subcommand lives in its own module; helpers they share are in
//! [`shared`].

pub mod classify;
pub mod convert;
pub mod shared;

use crate::Result;
use crate::cli::args::{Args, Commands};

/// Dispatch to the subcommand handler
///
/// - `convert`: rows to structured records
/// - `classify`: header column classification report
pub fn run(args: Args) -> Result<()> {
    match args.command {
        Some(Commands::Convert(convert_args)) => convert::run_convert(convert_args),
        Some(Commands::Classify(classify_args)) => classify::run_classify(classify_args),
        None => Ok(()),
    }
}
