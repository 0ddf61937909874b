//! Tracked record of one follower index

use chrono::{DateTime, Utc};
use ecfollowers_ccr_interface::FollowRequest;
use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, Result};

/// Layout of `last_updated` (RFC 850, always UTC)
const LAST_UPDATED_FORMAT: &str = "%A, %d-%b-%y %H:%M:%S UTC";

/// Declared and tracked state of a follower index
///
/// The same shape serves as the host's plan (with `id` and `last_updated`
/// unknown) and as the tracked record after a lifecycle call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowerIndexModel {
    #[serde(default)]
    pub id: Option<String>,

    /// Elastic index to create as a follower
    pub index: String,

    /// Name of the remote cluster
    pub remote_cluster: String,

    /// Name of the index to follow on the remote cluster
    pub leader_index: String,

    /// Also delete the local index when the follower is removed
    #[serde(default)]
    pub cleanup_index: Option<bool>,

    #[serde(default)]
    pub last_updated: Option<String>,
}

impl FollowerIndexModel {
    pub fn new(
        index: impl Into<String>,
        remote_cluster: impl Into<String>,
        leader_index: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            index: index.into(),
            remote_cluster: remote_cluster.into(),
            leader_index: leader_index.into(),
            cleanup_index: None,
            last_updated: None,
        }
    }

    pub fn with_cleanup_index(mut self, cleanup: bool) -> Self {
        self.cleanup_index = Some(cleanup);
        self
    }

    /// Whether delete should remove the local index; unset means yes
    pub fn cleanup_on_delete(&self) -> bool {
        self.cleanup_index.unwrap_or(true)
    }

    /// Required attributes must be present and non-empty
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("index", &self.index),
            ("remote_cluster", &self.remote_cluster),
            ("leader_index", &self.leader_index),
        ] {
            if value.trim().is_empty() {
                return Err(ProviderError::InvalidRecord(format!(
                    "The {} attribute is required and must not be empty",
                    name
                )));
            }
        }
        Ok(())
    }

    pub fn follow_request(&self) -> FollowRequest {
        FollowRequest::new(&self.remote_cluster, &self.leader_index)
    }

    /// Stamp `last_updated` with the given instant
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_updated = Some(format_last_updated(now));
    }
}

/// Identity of a follower index resource: `{remote_cluster}_{leader_index}_{index}`
pub fn follower_id(remote_cluster: &str, leader_index: &str, index: &str) -> String {
    format!("{}_{}_{}", remote_cluster, leader_index, index)
}

pub fn format_last_updated(now: DateTime<Utc>) -> String {
    now.format(LAST_UPDATED_FORMAT).to_string()
}
