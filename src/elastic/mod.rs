//! Elasticsearch HTTP client for the CCR and index administration endpoints
//!
//! [`ElasticClient`] implements [`CcrApi`] over `reqwest`. It only issues the
//! calls; sequencing lives in the resource. Any non-2xx status is turned into
//! [`CcrError::Remote`] carrying the endpoint and the response body.

use async_trait::async_trait;
use ecfollowers_ccr_interface::{CcrApi, CcrError, FollowInfo, FollowRequest, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Response};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::Url;

use crate::config::ProviderConfig;

#[cfg(test)]
pub mod mock;

#[cfg(test)]
pub use mock::{CcrCall, MockCcrApi};

/// Client handle bound to one cluster
#[derive(Clone)]
pub struct ElasticClient {
    http: reqwest::Client,
    base: Url,
    endpoint: String,
    credentials: Option<(String, SecretString)>,
    timeout_secs: u64,
}

impl std::fmt::Debug for ElasticClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticClient")
            .field("endpoint", &self.endpoint)
            .field("authenticated", &self.credentials.is_some())
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ElasticClient {
    /// Build a client from validated settings
    ///
    /// Nothing is sent to the cluster here; connectivity problems surface on
    /// the first call.
    pub fn new(config: &ProviderConfig) -> std::result::Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            base: config.url().clone(),
            endpoint: config.url().to_string(),
            credentials: config
                .credentials()
                .map(|(user, pass)| (user.to_string(), pass.clone())),
            timeout_secs: config.timeout_secs(),
        })
    }

    /// `{base}/{indices joined by ','}/{suffix...}`
    fn index_url(&self, indices: &[&str], suffix: &[&str]) -> Result<Url> {
        let target = indices.join(",");
        if indices.is_empty() || indices.iter().any(|i| i.is_empty()) {
            return Err(CcrError::InvalidEndpoint {
                index: target,
                message: "index name must not be empty".to_string(),
            });
        }

        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| CcrError::InvalidEndpoint {
                    index: target.clone(),
                    message: format!("{} cannot carry index paths", self.endpoint),
                })?;
            segments.pop_if_empty().push(&target);
            segments.extend(suffix);
        }
        Ok(url)
    }

    async fn send(&self, method: Method, url: Url, body: Option<Vec<u8>>) -> Result<Response> {
        let endpoint = url.to_string();
        debug!(%method, endpoint = %endpoint, "Sending request to cluster");

        let mut request = self.http.request(method, url);
        if let Some((username, password)) = &self.credentials {
            request = request.basic_auth(username, Some(password.expose_secret()));
        }
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                CcrError::Timeout {
                    endpoint: endpoint.clone(),
                    secs: self.timeout_secs,
                }
            } else {
                CcrError::Transport {
                    endpoint: endpoint.clone(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
            debug!(endpoint = %endpoint, status = status.as_u16(), "Cluster rejected request");
            return Err(CcrError::Remote {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn send_empty(&self, method: Method, url: Url) -> Result<()> {
        self.send(method, url, None).await.map(|_| ())
    }
}

#[async_trait]
impl CcrApi for ElasticClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn follow(&self, index: &str, request: &FollowRequest) -> Result<()> {
        let body = serde_json::to_vec(request).map_err(|e| CcrError::Payload(e.to_string()))?;
        let url = self.index_url(&[index], &["_ccr", "follow"])?;
        self.send(Method::PUT, url, Some(body)).await.map(|_| ())
    }

    async fn follow_info(&self, indices: &[&str]) -> Result<FollowInfo> {
        let url = self.index_url(indices, &["_ccr", "info"])?;
        let endpoint = url.to_string();
        let response = self.send(Method::GET, url, None).await?;
        response
            .json::<FollowInfo>()
            .await
            .map_err(|e| CcrError::Decode {
                endpoint,
                message: e.to_string(),
            })
    }

    async fn close_index(&self, indices: &[&str]) -> Result<()> {
        let url = self.index_url(indices, &["_close"])?;
        self.send_empty(Method::POST, url).await
    }

    async fn pause_follow(&self, index: &str) -> Result<()> {
        let url = self.index_url(&[index], &["_ccr", "pause_follow"])?;
        self.send_empty(Method::POST, url).await
    }

    async fn unfollow(&self, index: &str) -> Result<()> {
        let url = self.index_url(&[index], &["_ccr", "unfollow"])?;
        self.send_empty(Method::POST, url).await
    }

    async fn delete_index(&self, indices: &[&str]) -> Result<()> {
        let url = self.index_url(indices, &[])?;
        self.send_empty(Method::DELETE, url).await
    }
}
