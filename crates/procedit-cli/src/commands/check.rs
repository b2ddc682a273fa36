//! Check command
//!
//! Usage: procedit check <SPEC> <CONFIG> [--guarded <NAME>]... [--all-guarded]

use clap::Args;
use std::collections::HashSet;
use std::path::PathBuf;

use procedit_core::queries::{collect_errors, NodeError};
use procedit_core::{AlwaysGuardedPolicy, GuardPolicy, NeverGuardedPolicy, SelectedGuardedPolicy};

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Engine specification (YAML or JSON)
    pub spec: PathBuf,

    /// Process configuration (YAML or JSON)
    pub config: PathBuf,

    /// Treat optional references to this variable as guarded
    #[arg(long = "guarded", value_name = "NAME")]
    pub guarded: Vec<String>,

    /// Treat every optional reference as guarded
    #[arg(long, conflicts_with = "guarded")]
    pub all_guarded: bool,
}

/// Execute check command
///
/// Prints one line per recorded validation error and fails when any of them
/// is blocking.
///
/// # Errors
/// Load or construction failures, or a count of blocking errors.
pub fn execute(args: CheckArgs) -> Result<(), Box<dyn std::error::Error>> {
    let policy = policy_for(&args);
    let state = procedit_store::open_session(&args.spec, &args.config, policy.as_ref())?;
    let errors = collect_errors(&state);

    for error in &errors {
        println!("{}", format_error(error));
    }

    let blocking = errors.iter().filter(|e| e.error.is_blocking()).count();
    tracing::info!(errors = errors.len(), blocking, "process checked");

    if blocking > 0 {
        return Err(format!("{} blocking validation error(s)", blocking).into());
    }
    println!("OK ({} warning(s))", errors.len());
    Ok(())
}

fn policy_for(args: &CheckArgs) -> Box<dyn GuardPolicy> {
    if args.all_guarded {
        Box::new(AlwaysGuardedPolicy)
    } else if args.guarded.is_empty() {
        Box::new(NeverGuardedPolicy)
    } else {
        let names: HashSet<String> = args.guarded.iter().cloned().collect();
        Box::new(SelectedGuardedPolicy::new(names))
    }
}

/// `<key> <kind> <code>[ (<parameter>)]: <message>`
pub fn format_error(error: &NodeError) -> String {
    let parameter = error
        .error
        .parameter
        .as_deref()
        .map(|p| format!(" ({})", p))
        .unwrap_or_default();
    format!(
        "{} {} {}{}: {}",
        error.key,
        error.kind,
        error.error.code.as_str(),
        parameter,
        error.error.message
    )
}
