//! ecfollowers CCR Interface: the remote cluster seam
//!
//! This crate defines the `CcrApi` trait, which abstracts the handful of
//! Elasticsearch Cross-Cluster Replication and index administration calls the
//! follower-index resource needs. The provider crate ships an HTTP
//! implementation; tests use an in-memory recorder.
//!
//! # Operations
//!
//! 1. **Following**: start following a leader index, inspect follow info
//! 2. **Teardown**: close, pause following, unfollow, delete
//!
//! # Example
//!
//! ```rust,no_run
//! use ecfollowers_ccr_interface::{CcrApi, FollowRequest};
//!
//! async fn follow<A: CcrApi>(api: &A) -> ecfollowers_ccr_interface::Result<()> {
//!     let request = FollowRequest::new("eu-cluster", "logs-eu");
//!     api.follow("logs-eu-follow", &request).await?;
//!
//!     let info = api.follow_info(&["logs-eu-follow"]).await?;
//!     println!("following {} entries", info.follower_indices.len());
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a single remote call.
///
/// Every variant that involves the network names the endpoint that was
/// attempted, so callers can surface it without extra bookkeeping.
#[derive(Error, Debug)]
pub enum CcrError {
    #[error("failed to build request payload: {0}")]
    Payload(String),

    #[error("invalid endpoint for {index}: {message}")]
    InvalidEndpoint { index: String, message: String },

    #[error("unexpected error trying to call {endpoint}: {message}")]
    Transport { endpoint: String, message: String },

    #[error("request to {endpoint} timed out after {secs}s")]
    Timeout { endpoint: String, secs: u64 },

    #[error("call to {endpoint} failed with error: [{status}] {body}")]
    Remote {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("could not parse response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}

impl CcrError {
    /// Endpoint the failed call was sent to, if it got that far
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            CcrError::Transport { endpoint, .. }
            | CcrError::Timeout { endpoint, .. }
            | CcrError::Remote { endpoint, .. }
            | CcrError::Decode { endpoint, .. } => Some(endpoint),
            CcrError::Payload(_) | CcrError::InvalidEndpoint { .. } => None,
        }
    }

    /// HTTP status reported by the cluster, for remote errors only
    pub fn status(&self) -> Option<u16> {
        match self {
            CcrError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CcrError>;

/// Body of the start-follow call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowRequest {
    pub remote_cluster: String,
    pub leader_index: String,
}

impl FollowRequest {
    pub fn new(remote_cluster: impl Into<String>, leader_index: impl Into<String>) -> Self {
        Self {
            remote_cluster: remote_cluster.into(),
            leader_index: leader_index.into(),
        }
    }
}

/// Response of the follow-info call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowInfo {
    #[serde(default)]
    pub follower_indices: Vec<FollowerIndexInfo>,
}

/// One follower index as reported by the cluster
///
/// Elasticsearch names the follower `follower_index`; `follow_index` is
/// accepted as well. Fields the resource does not track (status, parameters)
/// are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowerIndexInfo {
    #[serde(alias = "follow_index")]
    pub follower_index: String,
    pub remote_cluster: String,
    pub leader_index: String,
}

/// Cross-Cluster Replication calls against one cluster
///
/// Implementations are shared across concurrently running resource
/// operations and must be `Send + Sync`. Each method is a single remote call;
/// sequencing and error mapping belong to the caller.
///
/// Methods taking a slice of index names address all of them in one call.
#[async_trait]
pub trait CcrApi: Send + Sync {
    /// Base endpoint this handle talks to
    fn endpoint(&self) -> &str;

    /// Turn `index` into a follower of `request.leader_index` on `request.remote_cluster`
    async fn follow(&self, index: &str, request: &FollowRequest) -> Result<()>;

    /// Fetch follower parameters for one or more indices
    async fn follow_info(&self, indices: &[&str]) -> Result<FollowInfo>;

    /// Close one or more indices
    async fn close_index(&self, indices: &[&str]) -> Result<()>;

    /// Pause replication into a follower index
    async fn pause_follow(&self, index: &str) -> Result<()>;

    /// Convert a paused, closed follower into a regular index
    async fn unfollow(&self, index: &str) -> Result<()>;

    /// Delete one or more indices
    async fn delete_index(&self, indices: &[&str]) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_request_body() {
        let body = serde_json::to_string(&FollowRequest::new("eu-cluster", "logs-eu")).unwrap();
        assert_eq!(body, r#"{"remote_cluster":"eu-cluster","leader_index":"logs-eu"}"#);
    }

    #[test]
    fn test_follow_info_accepts_elasticsearch_shape() {
        let body = r#"{
            "follower_indices": [{
                "follower_index": "logs-eu-follow",
                "remote_cluster": "eu-cluster",
                "leader_index": "logs-eu",
                "status": "active",
                "parameters": {"max_read_request_operation_count": 5120}
            }]
        }"#;
        let info: FollowInfo = serde_json::from_str(body).unwrap();
        assert_eq!(info.follower_indices.len(), 1);
        assert_eq!(info.follower_indices[0].follower_index, "logs-eu-follow");
        assert_eq!(info.follower_indices[0].leader_index, "logs-eu");
    }

    #[test]
    fn test_follow_info_accepts_follow_index_alias() {
        let body = r#"{"follower_indices":[{"follow_index":"f","remote_cluster":"r","leader_index":"l"}]}"#;
        let info: FollowInfo = serde_json::from_str(body).unwrap();
        assert_eq!(info.follower_indices[0].follower_index, "f");
    }

    #[test]
    fn test_follow_info_missing_list_is_empty() {
        let info: FollowInfo = serde_json::from_str("{}").unwrap();
        assert!(info.follower_indices.is_empty());
    }

    #[test]
    fn test_error_endpoint_and_status() {
        let err = CcrError::Remote {
            endpoint: "http://localhost:9200/idx/_close".to_string(),
            status: 404,
            body: "index_not_found_exception".to_string(),
        };
        assert_eq!(err.endpoint(), Some("http://localhost:9200/idx/_close"));
        assert_eq!(err.status(), Some(404));
        assert_eq!(
            err.to_string(),
            "call to http://localhost:9200/idx/_close failed with error: [404] index_not_found_exception"
        );

        let err = CcrError::Payload("bad".to_string());
        assert_eq!(err.endpoint(), None);
        assert_eq!(err.status(), None);
    }

    struct Unreachable;

    #[async_trait]
    impl CcrApi for Unreachable {
        fn endpoint(&self) -> &str {
            "http://unreachable:9200"
        }

        async fn follow(&self, _index: &str, _request: &FollowRequest) -> Result<()> {
            Err(self.transport())
        }

        async fn follow_info(&self, _indices: &[&str]) -> Result<FollowInfo> {
            Err(self.transport())
        }

        async fn close_index(&self, _indices: &[&str]) -> Result<()> {
            Err(self.transport())
        }

        async fn pause_follow(&self, _index: &str) -> Result<()> {
            Err(self.transport())
        }

        async fn unfollow(&self, _index: &str) -> Result<()> {
            Err(self.transport())
        }

        async fn delete_index(&self, _indices: &[&str]) -> Result<()> {
            Err(self.transport())
        }
    }

    impl Unreachable {
        fn transport(&self) -> CcrError {
            CcrError::Transport {
                endpoint: self.endpoint().to_string(),
                message: "connection refused".to_string(),
            }
        }
    }

    #[tokio::test]
    async fn test_trait_object_usage() {
        let api: Box<dyn CcrApi> = Box::new(Unreachable);
        let err = api.follow_info(&["idx"]).await.unwrap_err();
        assert_eq!(err.endpoint(), Some("http://unreachable:9200"));
        assert!(err.to_string().contains("connection refused"));
    }
}
