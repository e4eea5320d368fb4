use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, info};

use launchpad_core::project::{DeploymentUpdate, ProjectRecord};

use crate::error::StoreError;

/// The off-chain project store.
///
/// Reads return the current record; writes are limited to deployment
/// metadata and are only made after the matching transaction was mined.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn project(&self, id: &str) -> Result<ProjectRecord, StoreError>;

    async fn record_deployment(&self, id: &str, update: &DeploymentUpdate) -> Result<(), StoreError>;
}

/// REST implementation: `GET {base}/projects/{id}` and
/// `PATCH {base}/projects/{id}/deployment`.
pub struct HttpProjectStore {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl HttpProjectStore {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            client: reqwest::Client::new(),
        }
    }

    /// Bearer token for write endpoints.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn project_url(&self, id: &str) -> String {
        format!("{}/projects/{}", self.base_url, id)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(t) => req.bearer_auth(t),
            None => req,
        }
    }
}

async fn check(url: &str, resp: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(StoreError::Status {
        url: url.to_string(),
        status: status.as_u16(),
        body,
    })
}

fn transport(url: &str, e: reqwest::Error) -> StoreError {
    StoreError::Transport {
        url: url.to_string(),
        reason: e.to_string(),
    }
}

#[async_trait]
impl ProjectStore for HttpProjectStore {
    async fn project(&self, id: &str) -> Result<ProjectRecord, StoreError> {
        let url = self.project_url(id);
        let resp = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| transport(&url, e))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(id.to_string()));
        }
        let resp = check(&url, resp).await?;
        let record: ProjectRecord = resp
            .json()
            .await
            .map_err(|e| StoreError::Decode(format!("project {id}: {e}")))?;
        debug!(project = %id, "project record fetched");
        Ok(record)
    }

    async fn record_deployment(&self, id: &str, update: &DeploymentUpdate) -> Result<(), StoreError> {
        let url = format!("{}/deployment", self.project_url(id));
        let resp = self
            .authorize(self.client.patch(&url))
            .json(update)
            .send()
            .await
            .map_err(|e| transport(&url, e))?;
        check(&url, resp).await?;
        info!(project = %id, ?update, "deployment metadata recorded");
        Ok(())
    }
}
