use anyhow::{Context, Result};
use reqwest::{Client as ReqwestClient, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use shared_types::{Environment, Metadata};
use std::time::Duration;
use tracing::debug;

/// Client for the environment registry API
pub struct EnvironmentClient {
    client: ReqwestClient,
    base_url: String,
}

/// Error body returned by the server
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    details: Option<String>,
}

impl EnvironmentClient {
    /// Create a new client instance
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn collection_url(&self) -> Result<Url> {
        let url = format!("{}/environments", self.base_url);
        Url::parse(&url).with_context(|| format!("Invalid server URL: {url}"))
    }

    fn environment_url(&self, name: &str) -> Result<Url> {
        let mut url = self.collection_url()?;
        url.path_segments_mut()
            .map_err(|()| anyhow::anyhow!("Server URL cannot have a path: {}", self.base_url))?
            .push(name);
        Ok(url)
    }

    fn with_uid(request: RequestBuilder, uid: Option<&str>) -> RequestBuilder {
        match uid.filter(|uid| !uid.is_empty()) {
            Some(uid) => request.query(&[("uid", uid)]),
            None => request,
        }
    }

    /// Turn any non-success status into an error carrying the server's message
    async fn check(response: Response, what: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => match body.details {
                Some(details) => format!("{}: {}", body.error, details),
                None => body.error,
            },
            Err(_) => text,
        };

        if status == StatusCode::NOT_FOUND {
            anyhow::bail!("Environment not found: {} ({})", what, message);
        }
        anyhow::bail!("Request for {} failed with {}: {}", what, status, message)
    }

    /// List the latest version of every environment
    pub async fn list(&self) -> Result<Vec<Environment>> {
        let response = self.client.get(self.collection_url()?).send().await?;
        let response = Self::check(response, "environments").await?;

        Ok(response.json().await?)
    }

    /// Create a new environment, returning its assigned identity
    pub async fn create(&self, env: &Environment) -> Result<Metadata> {
        debug!("Creating environment {}", env.name());

        let response = self
            .client
            .post(self.collection_url()?)
            .json(env)
            .send()
            .await?;
        let response = Self::check(response, env.name()).await?;

        Ok(response.json().await?)
    }

    /// Get an environment, optionally pinned to a uid
    pub async fn get(&self, name: &str, uid: Option<&str>) -> Result<Environment> {
        let request = self.client.get(self.environment_url(name)?);
        let response = Self::with_uid(request, uid).send().await?;
        let response = Self::check(response, name).await?;

        Ok(response.json().await?)
    }

    /// Record a new version of an environment, returning the new identity
    pub async fn update(&self, env: &Environment) -> Result<Metadata> {
        debug!("Updating environment {}", env.name());

        let response = self
            .client
            .put(self.environment_url(env.name())?)
            .json(env)
            .send()
            .await?;
        let response = Self::check(response, env.name()).await?;

        Ok(response.json().await?)
    }

    /// Delete one version of an environment, or all of them when `uid` is `None`.
    ///
    /// `Some("")` is rejected rather than sent, since the server reads an empty
    /// uid as "every version".
    pub async fn delete(&self, name: &str, uid: Option<&str>) -> Result<()> {
        if uid.is_some_and(str::is_empty) {
            anyhow::bail!("Empty uid for {name}; pass None to delete every version");
        }

        let request = self.client.delete(self.environment_url(name)?);
        let response = Self::with_uid(request, uid).send().await?;
        Self::check(response, name).await?;

        Ok(())
    }

    /// Check if the service is healthy
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);

        let response = self.client.get(&url).send().await?;

        Ok(response.status() == StatusCode::OK)
    }
}
