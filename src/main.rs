use clap::Parser;
use grouped_csv::cli::{args::Args, commands};
use std::process;

fn main() {
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    match commands::run(args) {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Grouped CSV - structured records from grouped spreadsheet exports");
    println!("==================================================================");
    println!();
    println!("Fold repeated Institution, Press and Footnotes column families into");
    println!("nested blocks and geocode institution locations.");
    println!();
    println!("USAGE:");
    println!("    grouped-csv <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    convert     Convert rows into structured records (main command)");
    println!("    classify    Show how each header column is classified");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Convert to a JSON array on stdout:");
    println!("    grouped-csv convert projects.csv");
    println!();
    println!("    # First 50 rows as YAML, without geocoding:");
    println!("    grouped-csv convert projects.csv -o projects.yaml --format yaml \\");
    println!("                        --limit 50 --no-geocode");
    println!();
    println!("    # Inspect header classification of a semicolon-delimited export:");
    println!("    grouped-csv classify export.csv --delimiter ';'");
    println!();
    println!("For detailed help on any command, use:");
    println!("    grouped-csv <COMMAND> --help");
}
