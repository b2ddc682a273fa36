//! Export command
//!
//! Usage: procedit export <SPEC> <CONFIG> [--output <FILE>] [--format <yaml|json>]

use clap::Args;
use std::path::PathBuf;

use procedit_core::NeverGuardedPolicy;
use procedit_store::Format;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Engine specification (YAML or JSON)
    pub spec: PathBuf,

    /// Process configuration (YAML or JSON)
    pub config: PathBuf,

    /// Output file path (default: stdout); syntax follows the extension
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Syntax used when writing to stdout
    #[arg(short, long, default_value = "yaml")]
    pub format: Format,
}

/// Execute export command
///
/// # Errors
/// Load, construction or write failures.
pub fn execute(args: ExportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let state = procedit_store::open_session(&args.spec, &args.config, &NeverGuardedPolicy)?;
    let config = state.export()?;

    match args.output {
        Some(path) => {
            procedit_store::write_config_file(&path, &config)?;
            println!("Exported {} to {}", config.name, path.display());
        }
        None => {
            print!("{}", procedit_store::render_config(&config, args.format)?);
        }
    }
    Ok(())
}
