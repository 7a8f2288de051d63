//! JQL issue search

use reqwest::Method;
use tracing::debug;

use crate::client::parse_body;
use crate::models::{SearchRequest, SearchResponse};
use crate::{JiraClient, Result, SearchResult};

/// Issues assigned to `username` that are done but have no fix version
pub fn unversioned_done_jql(username: &str, project: &str) -> String {
    format!(
        "assignee = {} AND project = {} AND (status = Resolved OR status = Closed) AND fixVersion = EMPTY",
        username, project
    )
}

/// Resolved issues that already carry a fix version
pub fn resolved_with_fix_version_jql(project: &str) -> String {
    format!(
        "project = {} AND status = Resolved AND fixVersion != EMPTY",
        project
    )
}

impl JiraClient {
    /// Run a JQL query and return the matching issue keys
    pub async fn search(&self, jql: &str) -> Result<SearchResult> {
        debug!(jql, "Searching issues");

        let request = self.request(Method::POST, "search")?.json(&SearchRequest {
            jql,
            fields: ["key"],
        });
        let body = self.execute(request).await?;
        let response: SearchResponse = parse_body(&body, "search")?;

        let result = SearchResult::from(response);
        debug!(count = result.keys.len(), "Search complete");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unversioned_done_jql() {
        assert_eq!(
            unversioned_done_jql("bob", "ABC"),
            "assignee = bob AND project = ABC AND (status = Resolved OR status = Closed) AND fixVersion = EMPTY"
        );
    }

    #[test]
    fn test_resolved_with_fix_version_jql() {
        assert_eq!(
            resolved_with_fix_version_jql("ABC"),
            "project = ABC AND status = Resolved AND fixVersion != EMPTY"
        );
    }
}
