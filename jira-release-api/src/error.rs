//! Error types for Jira operations

use thiserror::Error;

/// Result type for Jira operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during Jira operations
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response
    #[error("Jira returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not have the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Invalid base URL or resource path
    #[error("Invalid URL: {0}")]
    Url(String),

    /// Version name argument was empty
    #[error("Version name must not be empty")]
    EmptyVersion,

    /// Creating the release version failed
    #[error("Failed to create version {name}: {source}")]
    VersionCreate {
        name: String,
        #[source]
        source: Box<Error>,
    },

    /// Fetching the transition list failed
    #[error("Failed to fetch transitions for {issue}: {source}")]
    TransitionLookup {
        issue: String,
        #[source]
        source: Box<Error>,
    },

    /// No transition with the expected name exists
    #[error("No Closed transition for {issue} (available: {})", .available.join(", "))]
    NoClosedTransition {
        issue: String,
        available: Vec<String>,
    },
}

impl Error {
    /// Process exit status for a run aborted by this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::NoClosedTransition { .. } => 2,
            _ => 1,
        }
    }
}
