//! procedit CLI
//!
//! Command-line interface for checking and normalising process configurations

use clap::{Parser, Subcommand};
use procedit_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "procedit")]
#[command(about = "procedit - Typed process tree checker", long_about = None)]
struct Cli {
    /// Emit JSON structured logs on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load a process and report its validation errors
    Check(commands::check::CheckArgs),
    /// Load a process and write it back out in canonical form
    Export(commands::export::ExportArgs),
}

fn main() {
    let cli = Cli::parse();
    init(if cli.log_json {
        Profile::Production
    } else {
        Profile::Development
    });

    let result = match cli.command {
        Commands::Check(args) => commands::check::execute(args),
        Commands::Export(args) => commands::export::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
