//! Jira Release API - Jira REST integration for jira-release
//!
//! This crate talks to the Jira REST v2 API to create versions, search
//! issues, attach fix versions and apply workflow transitions, and drives
//! those calls as one release workflow.

mod client;
mod error;
mod issues;
mod models;
mod release;
mod search;
mod version;

pub use client::JiraClient;
pub use error::{Error, Result};
pub use models::{SearchResult, Transition, TransitionsResult, VersionResult};
pub use release::{ReleaseEvent, ReleasePatch, ReleaseReport, ReleaseWorkflow, CLOSED_TRANSITION};
pub use search::{resolved_with_fix_version_jql, unversioned_done_jql};
