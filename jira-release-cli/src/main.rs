//! Jira Release CLI - release a Jira version from the command line
//!
//! Creates the version, attaches unversioned done issues to it and closes
//! resolved issues that already carry a fix version.

mod output;
mod release;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Release a Jira version and close its resolved issues
#[derive(Parser, Debug)]
#[command(name = "jira-release")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Name of the version to create and release
    #[arg(value_name = "VERSION")]
    name: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Path to the project config file (defaults to ./.jiraProject)
    #[arg(long, env = "JIRA_RELEASE_CONFIG")]
    config: Option<PathBuf>,
}

/// Exit status for a failed run
///
/// Workflow errors carry their own status; everything else is 1.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|e| e.downcast_ref::<jira_release_api::Error>())
        .map(jira_release_api::Error::exit_code)
        .unwrap_or(1)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    match release::execute(&cli.name, cli.config).await {
        Ok(report) => {
            if report.has_failures() {
                tracing::warn!("Some issues could not be updated, see output above");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}
