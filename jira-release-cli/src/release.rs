//! Release command - create the version and update its issues

use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;
use jira_release_api::{JiraClient, ReleaseReport, ReleaseWorkflow};
use jira_release_core::{Config, Credential, KeyringStore};

use crate::output::{event_line, format_vars, masked_userpass, summary_line};

/// Run the release for `version`
///
/// The config file is read before any request is made; a missing file
/// aborts the run.
pub async fn execute(
    version: &str,
    config_path: Option<PathBuf>,
) -> anyhow::Result<ReleaseReport> {
    let config =
        Config::load_with_overrides(config_path).context("Failed to load configuration")?;

    println!(
        "{}",
        format_vars(&[
            ("project", config.project.clone()),
            ("userpass", masked_userpass(&config.userpass)),
            ("version", version.to_string()),
            ("jira", config.jira.clone()),
        ])
    );

    let credential = Credential::resolve(&config.userpass, &config.jira, &KeyringStore::new())
        .context("Failed to resolve credentials")?;

    let client = JiraClient::new(&config.jira, credential)?;
    let today = Local::now().date_naive();

    let report = ReleaseWorkflow::new(&client, &config.project)
        .run(version, today, |event| println!("{}", event_line(&event)))
        .await?;

    println!("{}", summary_line(&report));
    Ok(report)
}
