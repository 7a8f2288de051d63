//! Request payloads and typed response records for the Jira REST v2 API

use serde::{Deserialize, Serialize};

/// Body of `POST version`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewVersion<'a> {
    pub name: &'a str,
    pub archived: bool,
    pub released: bool,
    pub release_date: String,
    pub project: &'a str,
}

/// Body of `PUT version/{id}` marking a version as released
#[derive(Debug, Serialize)]
pub(crate) struct ReleasedPatch {
    pub released: bool,
}

/// Body of `POST search`
#[derive(Debug, Serialize)]
pub(crate) struct SearchRequest<'a> {
    pub jql: &'a str,
    pub fields: [&'a str; 1],
}

/// Version as returned by `POST version`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VersionResult {
    /// Version id, used to address `version/{id}`
    pub id: String,
    /// Whether the tracker recorded the version as released
    #[serde(default)]
    pub released: bool,
}

/// Issue keys returned by a search, in response order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    pub keys: Vec<String>,
}

/// Wire shape of the search response, restricted to `key`
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    issues: Vec<IssueKeyField>,
}

#[derive(Debug, Deserialize)]
struct IssueKeyField {
    key: String,
}

impl From<SearchResponse> for SearchResult {
    fn from(response: SearchResponse) -> Self {
        SearchResult {
            keys: response.issues.into_iter().map(|i| i.key).collect(),
        }
    }
}

/// A workflow transition available on an issue
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Transition {
    pub id: String,
    pub name: String,
}

/// Response of `GET issue/{key}/transitions`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TransitionsResult {
    pub transitions: Vec<Transition>,
}

impl TransitionsResult {
    /// Find a transition by its exact name
    pub fn find(&self, name: &str) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.name == name)
    }

    /// Names of all transitions, in response order
    pub fn names(&self) -> Vec<String> {
        self.transitions.iter().map(|t| t.name.clone()).collect()
    }
}
