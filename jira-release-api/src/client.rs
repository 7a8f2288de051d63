//! Jira REST API client using reqwest

use jira_release_core::Credential;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use crate::{Error, Result};

/// Path of the REST v2 surface below the tracker base URL
const REST_PATH: &str = "rest/api/2/";

/// Jira API client bound to one tracker and one set of credentials
pub struct JiraClient {
    http: reqwest::Client,
    rest: Url,
    credential: Credential,
}

impl JiraClient {
    /// Create a new client for the tracker at `base_url`
    ///
    /// `base_url` is the instance root, e.g. `https://example.atlassian.net`.
    pub fn new(base_url: &str, credential: Credential) -> Result<Self> {
        let rest = rest_root(base_url)?;

        info!(rest = %rest, username = %credential.username, "Created Jira client");

        Ok(Self {
            http: reqwest::Client::new(),
            rest,
            credential,
        })
    }

    /// Get the authenticated username
    pub fn username(&self) -> &str {
        &self.credential.username
    }

    /// Build an authenticated JSON request for a REST resource
    pub(crate) fn request(&self, method: Method, resource: &str) -> Result<RequestBuilder> {
        let url = self
            .rest
            .join(resource)
            .map_err(|e| Error::Url(format!("{}{}: {}", self.rest, resource, e)))?;

        debug!(%method, %url, "Jira request");

        Ok(self
            .http
            .request(method, url)
            .basic_auth(&self.credential.username, Some(&self.credential.secret))
            .header(CONTENT_TYPE, "application/json"))
    }

    /// Send a request and return the body of a 2xx response
    pub(crate) async fn execute(&self, request: RequestBuilder) -> Result<String> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "Jira request failed");
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

impl std::fmt::Debug for JiraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraClient")
            .field("rest", &self.rest.as_str())
            .field("username", &self.credential.username)
            .finish_non_exhaustive()
    }
}

/// Build `{base}/rest/api/2/` from a tracker base URL
fn rest_root(base_url: &str) -> Result<Url> {
    let base = format!("{}/", base_url.trim().trim_end_matches('/'));
    let base = Url::parse(&base).map_err(|e| Error::Url(format!("{}: {}", base_url, e)))?;
    if base.cannot_be_a_base() {
        return Err(Error::Url(format!("{} cannot be a base URL", base_url)));
    }

    base.join(REST_PATH)
        .map_err(|e| Error::Url(format!("{}: {}", base_url, e)))
}

/// Deserialize a response body into an endpoint record
pub(crate) fn parse_body<T: DeserializeOwned>(body: &str, what: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| Error::MalformedResponse(format!("{}: {}", what, e)))
}
