//! Control-plane API: the lookup contract the agent depends on, and the HTTP
//! client that fulfils it.
//!
//! The HTTP client is blocking (`ureq`); each request runs on the tokio
//! blocking pool so callers stay async.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

use wsagent_core::{GitUserData, ProviderId, ServerConfig, Workspace, WorkspaceId};

use crate::error::ClientError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Lookups against the control plane.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// `GET /workspace/{id}`.
    async fn get_workspace(&self, workspace_id: &WorkspaceId) -> Result<Workspace, ClientError>;

    /// `GET /server/config`.
    async fn get_server_config(&self) -> Result<ServerConfig, ClientError>;

    /// `GET /gitprovider/{id}/user-data`. `Ok(None)` when the server has no
    /// identity for the provider.
    async fn get_git_user_data(
        &self,
        provider_id: &ProviderId,
    ) -> Result<Option<GitUserData>, ClientError>;
}

/// HTTP implementation of [`ControlPlane`].
#[derive(Clone)]
pub struct ApiClient {
    base: Url,
    api_key: Option<String>,
    agent: ureq::Agent,
}

impl ApiClient {
    /// Build a client for `base_url`, optionally authenticating with a bearer key.
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, ClientError> {
        let base = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl {
                url: base_url.to_string(),
                message: "not a hierarchical url".to_string(),
            });
        }
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .build();
        Ok(Self {
            base,
            api_key,
            agent,
        })
    }

    /// Absolute URL for `segments` appended to the base path. Segments are
    /// percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl {
                url: self.base.to_string(),
                message: "not a hierarchical url".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get_body(&self, url: &Url) -> Result<String, ClientError> {
        let mut request = self.agent.get(url.as_str());
        if let Some(key) = &self.api_key {
            request = request.set("Authorization", &format!("Bearer {key}"));
        }

        match request.call() {
            Ok(response) => response.into_string().map_err(|e| ClientError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Err(ureq::Error::Status(code, response)) => Err(ClientError::Status {
                url: url.to_string(),
                code,
                body: response.into_string().unwrap_or_default(),
            }),
            Err(ureq::Error::Transport(transport)) => Err(ClientError::Transport {
                url: url.to_string(),
                message: transport.to_string(),
            }),
        }
    }

    fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, ClientError> {
        let body = self.get_body(url)?;
        decode(url, &body)
    }

    async fn blocking<T, F>(&self, call: F) -> Result<T, ClientError>
    where
        T: Send + 'static,
        F: FnOnce(&ApiClient) -> Result<T, ClientError> + Send + 'static,
    {
        let client = self.clone();
        tokio::task::spawn_blocking(move || call(&client))
            .await
            .map_err(|e| ClientError::Join(e.to_string()))?
    }
}

#[async_trait]
impl ControlPlane for ApiClient {
    async fn get_workspace(&self, workspace_id: &WorkspaceId) -> Result<Workspace, ClientError> {
        let url = self.endpoint(&["workspace", &workspace_id.0])?;
        tracing::debug!(%url, "fetching workspace");
        self.blocking(move |client| client.get_json(&url)).await
    }

    async fn get_server_config(&self) -> Result<ServerConfig, ClientError> {
        let url = self.endpoint(&["server", "config"])?;
        tracing::debug!(%url, "fetching server config");
        self.blocking(move |client| client.get_json(&url)).await
    }

    async fn get_git_user_data(
        &self,
        provider_id: &ProviderId,
    ) -> Result<Option<GitUserData>, ClientError> {
        let url = self.endpoint(&["gitprovider", &provider_id.0, "user-data"])?;
        tracing::debug!(%url, "fetching git user data");
        self.blocking(move |client| {
            let body = client.get_body(&url)?;
            if body.trim().is_empty() {
                return Ok(None);
            }
            decode(&url, &body)
        })
        .await
    }
}

fn decode<T: DeserializeOwned>(url: &Url, body: &str) -> Result<T, ClientError> {
    serde_json::from_str(body).map_err(|e| ClientError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}
