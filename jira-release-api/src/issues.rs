//! Issue updates and workflow transitions

use reqwest::Method;
use serde_json::json;
use tracing::debug;

use crate::client::parse_body;
use crate::{JiraClient, Result, TransitionsResult};

impl JiraClient {
    /// Add `version` to the fix versions of issue `key`
    pub async fn add_fix_version(&self, key: &str, version: &str) -> Result<()> {
        debug!(key, version, "Adding fix version");

        let payload = json!({
            "update": {
                "fixVersions": [{ "add": { "name": version } }]
            }
        });
        let request = self
            .request(Method::PUT, &format!("issue/{}", key))?
            .json(&payload);
        self.execute(request).await?;
        Ok(())
    }

    /// List the transitions currently available on issue `key`
    pub async fn transitions(&self, key: &str) -> Result<TransitionsResult> {
        debug!(key, "Fetching transitions");

        let request = self.request(Method::GET, &format!("issue/{}/transitions", key))?;
        let body = self.execute(request).await?;
        parse_body(&body, "transitions")
    }

    /// Apply transition `id` to issue `key`
    pub async fn transition_issue(&self, key: &str, id: &str) -> Result<()> {
        debug!(key, transition = id, "Applying transition");

        let payload = json!({ "transition": { "id": id } });
        let request = self
            .request(Method::POST, &format!("issue/{}/transitions", key))?
            .json(&payload);
        self.execute(request).await?;
        Ok(())
    }
}
