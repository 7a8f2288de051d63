//! Release workflow
//!
//! Runs the fixed release sequence against one tracker:
//!
//! 1. create the version as released (patching the flag if the tracker
//!    ignored it)
//! 2. find done issues assigned to the user that have no fix version
//! 3. add the new version to each of them
//! 4. find resolved issues that already have a fix version
//! 5. look up the `Closed` transition on the first of those
//! 6. apply it to all of them
//!
//! Requests are issued one at a time. Failed searches count as empty and
//! per-issue failures are reported without stopping the loop. Only version
//! creation and transition discovery abort the run.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::{
    resolved_with_fix_version_jql, unversioned_done_jql, Error, JiraClient, Result, SearchResult,
    VersionResult,
};

/// Name of the transition applied to resolved issues
pub const CLOSED_TRANSITION: &str = "Closed";

/// Progress notifications emitted while the workflow runs
#[derive(Debug)]
pub enum ReleaseEvent<'a> {
    VersionCreated {
        id: &'a str,
        released: bool,
    },
    ReleasePatchFailed {
        id: &'a str,
        error: &'a Error,
    },
    SearchFailed {
        jql: &'a str,
        error: &'a Error,
    },
    IssuesFound {
        jql: &'a str,
        keys: &'a [String],
    },
    FixVersionAdded {
        key: &'a str,
    },
    FixVersionFailed {
        key: &'a str,
        error: &'a Error,
    },
    ClosedTransitionFound {
        issue: &'a str,
        id: &'a str,
    },
    IssueClosed {
        key: &'a str,
    },
    CloseFailed {
        key: &'a str,
        error: &'a Error,
    },
}

/// Outcome of the follow-up released-flag patch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleasePatch {
    /// The tracker honoured `released` on create
    NotNeeded,
    Applied,
    Failed,
}

/// Summary of a completed release run
#[derive(Debug, Clone)]
pub struct ReleaseReport {
    pub version: VersionResult,
    pub release_patch: ReleasePatch,
    pub attached: Vec<String>,
    pub attach_failed: Vec<String>,
    pub closed: Vec<String>,
    pub close_failed: Vec<String>,
}

impl ReleaseReport {
    /// Whether any per-issue operation failed
    pub fn has_failures(&self) -> bool {
        !self.attach_failed.is_empty() || !self.close_failed.is_empty()
    }
}

/// Release workflow for one project
#[derive(Debug)]
pub struct ReleaseWorkflow<'a> {
    client: &'a JiraClient,
    project: &'a str,
}

impl<'a> ReleaseWorkflow<'a> {
    pub fn new(client: &'a JiraClient, project: &'a str) -> Self {
        Self { client, project }
    }

    /// Release `version` dated `release_date`
    ///
    /// `on_event` is called synchronously for every progress step.
    /// Side effects already applied are not rolled back when the run
    /// aborts.
    pub async fn run<F>(
        &self,
        version: &str,
        release_date: NaiveDate,
        mut on_event: F,
    ) -> Result<ReleaseReport>
    where
        F: FnMut(ReleaseEvent<'_>),
    {
        if version.trim().is_empty() {
            return Err(Error::EmptyVersion);
        }

        info!(project = self.project, version, "Starting release");

        let (created, release_patch) = self
            .create_version(version, release_date, &mut on_event)
            .await?;

        let jql = unversioned_done_jql(self.client.username(), self.project);
        let unversioned = self.find_issues(&jql, &mut on_event).await;
        let (attached, attach_failed) = self
            .attach_version(&unversioned, version, &mut on_event)
            .await;

        let jql = resolved_with_fix_version_jql(self.project);
        let resolved = self.find_issues(&jql, &mut on_event).await;
        let (closed, close_failed) = self.close_issues(&resolved, &mut on_event).await?;

        info!(
            attached = attached.len(),
            attach_failed = attach_failed.len(),
            closed = closed.len(),
            close_failed = close_failed.len(),
            "Release finished"
        );

        Ok(ReleaseReport {
            version: created,
            release_patch,
            attached,
            attach_failed,
            closed,
            close_failed,
        })
    }

    async fn create_version<F>(
        &self,
        version: &str,
        release_date: NaiveDate,
        on_event: &mut F,
    ) -> Result<(VersionResult, ReleasePatch)>
    where
        F: FnMut(ReleaseEvent<'_>),
    {
        let created = self
            .client
            .create_version(version, self.project, release_date)
            .await
            .map_err(|e| Error::VersionCreate {
                name: version.to_string(),
                source: Box::new(e),
            })?;

        on_event(ReleaseEvent::VersionCreated {
            id: &created.id,
            released: created.released,
        });

        if created.released {
            return Ok((created, ReleasePatch::NotNeeded));
        }

        // the tracker sometimes ignores `released` on create
        let patch = match self.client.mark_released(&created.id).await {
            Ok(()) => ReleasePatch::Applied,
            Err(error) => {
                warn!(id = %created.id, %error, "Failed to mark version released");
                on_event(ReleaseEvent::ReleasePatchFailed {
                    id: &created.id,
                    error: &error,
                });
                ReleasePatch::Failed
            }
        };

        Ok((created, patch))
    }

    async fn find_issues<F>(&self, jql: &str, on_event: &mut F) -> SearchResult
    where
        F: FnMut(ReleaseEvent<'_>),
    {
        match self.client.search(jql).await {
            Ok(result) => {
                on_event(ReleaseEvent::IssuesFound {
                    jql,
                    keys: &result.keys,
                });
                result
            }
            Err(error) => {
                warn!(jql, %error, "Search failed, treating as empty");
                on_event(ReleaseEvent::SearchFailed { jql, error: &error });
                SearchResult::default()
            }
        }
    }

    async fn attach_version<F>(
        &self,
        issues: &SearchResult,
        version: &str,
        on_event: &mut F,
    ) -> (Vec<String>, Vec<String>)
    where
        F: FnMut(ReleaseEvent<'_>),
    {
        let mut attached = Vec::new();
        let mut failed = Vec::new();

        for key in &issues.keys {
            match self.client.add_fix_version(key, version).await {
                Ok(()) => {
                    on_event(ReleaseEvent::FixVersionAdded { key });
                    attached.push(key.clone());
                }
                Err(error) => {
                    warn!(key = %key, %error, "Failed to add fix version");
                    on_event(ReleaseEvent::FixVersionFailed { key, error: &error });
                    failed.push(key.clone());
                }
            }
        }

        (attached, failed)
    }

    async fn close_issues<F>(
        &self,
        issues: &SearchResult,
        on_event: &mut F,
    ) -> Result<(Vec<String>, Vec<String>)>
    where
        F: FnMut(ReleaseEvent<'_>),
    {
        let Some(first) = issues.keys.first() else {
            return Ok((Vec::new(), Vec::new()));
        };

        // the first issue's workflow stands in for the whole batch
        let transitions =
            self.client
                .transitions(first)
                .await
                .map_err(|e| Error::TransitionLookup {
                    issue: first.clone(),
                    source: Box::new(e),
                })?;

        let closed_id = transitions
            .find(CLOSED_TRANSITION)
            .map(|t| t.id.clone())
            .ok_or_else(|| Error::NoClosedTransition {
                issue: first.clone(),
                available: transitions.names(),
            })?;

        on_event(ReleaseEvent::ClosedTransitionFound {
            issue: first,
            id: &closed_id,
        });

        let mut closed = Vec::new();
        let mut failed = Vec::new();

        for key in &issues.keys {
            match self.client.transition_issue(key, &closed_id).await {
                Ok(()) => {
                    on_event(ReleaseEvent::IssueClosed { key });
                    closed.push(key.clone());
                }
                Err(error) => {
                    warn!(key = %key, %error, "Failed to close issue");
                    on_event(ReleaseEvent::CloseFailed { key, error: &error });
                    failed.push(key.clone());
                }
            }
        }

        Ok((closed, failed))
    }
}
