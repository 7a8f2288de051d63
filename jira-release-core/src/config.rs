//! Release configuration
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags (config file location only)
//! 2. Environment variables (JIRA_RELEASE_*)
//! 3. Config file (`.jiraProject` in the current directory)
//!
//! The config file must exist. Two layouts are accepted: TOML with
//! `project`, `userpass` and `jira` keys, or a single legacy line of the
//! form `PROJECT USERPASS URL`.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::{Error, Result};

/// File name looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = ".jiraProject";

/// Release configuration for one tracker project
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project key, e.g. `ABC`
    pub project: String,

    /// `user:secret`, or `user` alone to use the secret store
    pub userpass: String,

    /// Tracker base URL without trailing slash
    pub jira: String,
}

impl Config {
    /// Load configuration from a specific file
    ///
    /// A missing file is reported as [`Error::ConfigNotFound`].
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        debug!(path = %path.display(), "Read config file");
        Self::parse(&contents)
    }

    /// Parse config file contents in either the TOML or the legacy layout
    pub fn parse(contents: &str) -> Result<Self> {
        match toml::from_str::<Config>(contents) {
            Ok(config) => Ok(config),
            Err(toml_err) => Self::parse_legacy(contents).ok_or_else(|| {
                Error::Config(format!("Failed to parse config: {}", toml_err))
            }),
        }
    }

    /// Parse the single-line `PROJECT USERPASS URL` layout
    fn parse_legacy(contents: &str) -> Option<Self> {
        let line = contents.lines().find(|l| !l.trim().is_empty())?;

        let mut opts = line.split_whitespace();
        let project = opts.next()?;
        // `key = value` is a broken TOML file, not a legacy line
        if project.contains('=') || opts.clone().next()? == "=" {
            return None;
        }

        let userpass = opts.next()?;
        let jira = opts.next()?;

        Some(Self {
            project: project.to_string(),
            userpass: userpass.to_string(),
            jira: jira.to_string(),
        })
    }

    /// Get the default config file path
    ///
    /// Returns `.jiraProject` relative to the current directory
    pub fn default_config_path() -> PathBuf {
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - JIRA_RELEASE_PROJECT: Project key
    /// - JIRA_RELEASE_USERPASS: Credential string
    /// - JIRA_RELEASE_URL: Tracker base URL
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable source
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(project) = lookup("JIRA_RELEASE_PROJECT") {
            self.project = project;
        }

        if let Some(userpass) = lookup("JIRA_RELEASE_USERPASS") {
            self.userpass = userpass;
        }

        if let Some(jira) = lookup("JIRA_RELEASE_URL") {
            self.jira = jira;
        }

        self
    }

    /// Check that every field is populated and normalize the base URL
    pub fn validate(mut self) -> Result<Self> {
        self.project = self.project.trim().to_string();
        self.userpass = self.userpass.trim().to_string();
        self.jira = self.jira.trim().trim_end_matches('/').to_string();

        if self.project.is_empty() {
            return Err(Error::Config("`project` must not be empty".to_string()));
        }
        if self.userpass.is_empty() {
            return Err(Error::Config("`userpass` must not be empty".to_string()));
        }
        if self.jira.is_empty() {
            return Err(Error::Config("`jira` must not be empty".to_string()));
        }

        url::Url::parse(&self.jira)
            .map_err(|e| Error::Config(format!("Invalid jira URL {}: {}", self.jira, e)))?;

        Ok(self)
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI path > env > config file
    pub fn load_with_overrides(config_path: Option<PathBuf>) -> Result<Self> {
        let path = config_path.unwrap_or_else(Self::default_config_path);
        Self::load_from_file(&path)?.with_env_overrides().validate()
    }
}
