//! Version creation and release

use chrono::NaiveDate;
use reqwest::Method;
use tracing::{debug, info};

use crate::client::parse_body;
use crate::models::{NewVersion, ReleasedPatch};
use crate::{JiraClient, Result, VersionResult};

impl JiraClient {
    /// Create a released, unarchived version in `project`
    pub async fn create_version(
        &self,
        name: &str,
        project: &str,
        release_date: NaiveDate,
    ) -> Result<VersionResult> {
        let payload = NewVersion {
            name,
            archived: false,
            released: true,
            release_date: release_date.format("%Y-%m-%d").to_string(),
            project,
        };

        debug!(name, project, release_date = %payload.release_date, "Creating version");

        let request = self.request(Method::POST, "version")?.json(&payload);
        let body = self.execute(request).await?;
        let version: VersionResult = parse_body(&body, "version")?;

        info!(id = %version.id, name, released = version.released, "Created version");
        Ok(version)
    }

    /// Mark an existing version as released
    pub async fn mark_released(&self, id: &str) -> Result<()> {
        debug!(id, "Marking version released");

        let request = self
            .request(Method::PUT, &format!("version/{}", id))?
            .json(&ReleasedPatch { released: true });
        self.execute(request).await?;
        Ok(())
    }
}
