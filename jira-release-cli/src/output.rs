//! Progress lines printed to stdout as `key: value` pairs

use jira_release_api::{ReleaseEvent, ReleasePatch, ReleaseReport};

/// Join variables into one `key: value  key: value` line
pub fn format_vars(vars: &[(&str, String)]) -> String {
    vars.iter()
        .map(|(key, value)| format!("{}: {}", key, value))
        .collect::<Vec<_>>()
        .join("  ")
}

/// Credential string with any secret part masked
pub fn masked_userpass(userpass: &str) -> String {
    match userpass.split_once(':') {
        Some((user, _)) => format!("{}:***", user),
        None => userpass.to_string(),
    }
}

/// Render one workflow event
pub fn event_line(event: &ReleaseEvent<'_>) -> String {
    match event {
        ReleaseEvent::VersionCreated { id, released } => format_vars(&[
            ("created", id.to_string()),
            ("released", released.to_string()),
        ]),
        ReleaseEvent::ReleasePatchFailed { id, error } => format_vars(&[
            ("release_patch_failed", id.to_string()),
            ("error", error.to_string()),
        ]),
        ReleaseEvent::SearchFailed { jql, error } => format_vars(&[
            ("search_failed", jql.to_string()),
            ("error", error.to_string()),
        ]),
        ReleaseEvent::IssuesFound { jql, keys } => format_vars(&[
            ("query", jql.to_string()),
            ("found", keys.join(" ")),
        ]),
        ReleaseEvent::FixVersionAdded { key } => format_vars(&[("fixed", key.to_string())]),
        ReleaseEvent::FixVersionFailed { key, error } => format_vars(&[
            ("fix_failed", key.to_string()),
            ("error", error.to_string()),
        ]),
        ReleaseEvent::ClosedTransitionFound { issue, id } => format_vars(&[
            ("transition", id.to_string()),
            ("from", issue.to_string()),
        ]),
        ReleaseEvent::IssueClosed { key } => format_vars(&[("closed", key.to_string())]),
        ReleaseEvent::CloseFailed { key, error } => format_vars(&[
            ("close_failed", key.to_string()),
            ("error", error.to_string()),
        ]),
    }
}

/// Final summary line
pub fn summary_line(report: &ReleaseReport) -> String {
    let patch = match report.release_patch {
        ReleasePatch::NotNeeded => "not needed",
        ReleasePatch::Applied => "applied",
        ReleasePatch::Failed => "failed",
    };

    format_vars(&[
        ("version", report.version.id.clone()),
        ("release_patch", patch.to_string()),
        ("attached", report.attached.len().to_string()),
        ("attach_failed", report.attach_failed.len().to_string()),
        ("closed", report.closed.len().to_string()),
        ("close_failed", report.close_failed.len().to_string()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use jira_release_api::{Error, VersionResult};

    #[test]
    fn test_format_vars() {
        let line = format_vars(&[("project", "ABC".to_string()), ("version", "1.2.0".to_string())]);
        assert_eq!(line, "project: ABC  version: 1.2.0");
    }

    #[test]
    fn test_masked_userpass() {
        assert_eq!(masked_userpass("bob:secret"), "bob:***");
        assert_eq!(masked_userpass("bob"), "bob");
    }

    #[test]
    fn test_failure_line_includes_key_and_response() {
        let error = Error::Status {
            status: 400,
            body: "Field 'fixVersions' cannot be set".to_string(),
        };
        let line = event_line(&ReleaseEvent::FixVersionFailed {
            key: "ABC-2",
            error: &error,
        });
        assert!(line.starts_with("fix_failed: ABC-2  error: "));
        assert!(line.contains("fixVersions"));
    }

    #[test]
    fn test_issues_found_line() {
        let keys = vec!["ABC-1".to_string(), "ABC-2".to_string()];
        let line = event_line(&ReleaseEvent::IssuesFound {
            jql: "project = ABC",
            keys: &keys,
        });
        assert_eq!(line, "query: project = ABC  found: ABC-1 ABC-2");
    }

    #[test]
    fn test_summary_line() {
        let report = ReleaseReport {
            version: VersionResult {
                id: "10000".to_string(),
                released: true,
            },
            release_patch: ReleasePatch::NotNeeded,
            attached: vec!["ABC-1".to_string()],
            attach_failed: vec![],
            closed: vec![],
            close_failed: vec!["ABC-3".to_string()],
        };
        assert_eq!(
            summary_line(&report),
            "version: 10000  release_patch: not needed  attached: 1  attach_failed: 0  closed: 0  close_failed: 1"
        );
    }
}
