//! In-memory CCR API for unit tests
//!
//! Records every call in order and lets a test fail a chosen operation or
//! replace the follow-info response.

use async_trait::async_trait;
use ecfollowers_ccr_interface::{
    CcrApi, CcrError, FollowInfo, FollowRequest, FollowerIndexInfo, Result,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// One recorded call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CcrCall {
    Follow { index: String, request: FollowRequest },
    FollowInfo { indices: Vec<String> },
    CloseIndex { indices: Vec<String> },
    PauseFollow { index: String },
    Unfollow { index: String },
    DeleteIndex { indices: Vec<String> },
}

impl CcrCall {
    /// Operation name, matching the keys accepted by [`MockCcrApi::fail_on`]
    pub fn name(&self) -> &'static str {
        match self {
            CcrCall::Follow { .. } => "follow",
            CcrCall::FollowInfo { .. } => "follow_info",
            CcrCall::CloseIndex { .. } => "close_index",
            CcrCall::PauseFollow { .. } => "pause_follow",
            CcrCall::Unfollow { .. } => "unfollow",
            CcrCall::DeleteIndex { .. } => "delete_index",
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<CcrCall>,
    followers: HashMap<String, FollowRequest>,
    failing: HashSet<&'static str>,
    info_override: Option<FollowInfo>,
}

/// Recording stand-in for a cluster
///
/// Successful `follow` calls are remembered so a later `follow_info` reports
/// them back, the way a real cluster would.
#[derive(Debug, Clone, Default)]
pub struct MockCcrApi {
    state: Arc<Mutex<MockState>>,
}

impl MockCcrApi {
    pub const ENDPOINT: &'static str = "http://mock-cluster:9200/";

    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call of the named operation fail with a 500
    pub fn fail_on(&self, operation: &'static str) {
        self.state.lock().unwrap().failing.insert(operation);
    }

    /// Answer follow-info with a fixed response
    pub fn set_follow_info(&self, info: FollowInfo) {
        self.state.lock().unwrap().info_override = Some(info);
    }

    /// Pretend the index already follows a leader
    pub fn add_follower(&self, index: &str, remote_cluster: &str, leader_index: &str) {
        self.state.lock().unwrap().followers.insert(
            index.to_string(),
            FollowRequest::new(remote_cluster, leader_index),
        );
    }

    pub fn calls(&self) -> Vec<CcrCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_names(&self) -> Vec<&'static str> {
        self.calls().iter().map(CcrCall::name).collect()
    }

    fn record(&self, call: CcrCall) -> Result<()> {
        let name = call.name();
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.failing.contains(name) {
            return Err(CcrError::Remote {
                endpoint: format!("{}{}", Self::ENDPOINT, name),
                status: 500,
                body: format!("simulated {} failure", name),
            });
        }
        Ok(())
    }
}

fn owned(indices: &[&str]) -> Vec<String> {
    indices.iter().map(|i| i.to_string()).collect()
}

#[async_trait]
impl CcrApi for MockCcrApi {
    fn endpoint(&self) -> &str {
        Self::ENDPOINT
    }

    async fn follow(&self, index: &str, request: &FollowRequest) -> Result<()> {
        self.record(CcrCall::Follow {
            index: index.to_string(),
            request: request.clone(),
        })?;
        self.state
            .lock()
            .unwrap()
            .followers
            .insert(index.to_string(), request.clone());
        Ok(())
    }

    async fn follow_info(&self, indices: &[&str]) -> Result<FollowInfo> {
        self.record(CcrCall::FollowInfo {
            indices: owned(indices),
        })?;
        let state = self.state.lock().unwrap();
        if let Some(info) = &state.info_override {
            return Ok(info.clone());
        }
        let follower_indices = indices
            .iter()
            .filter_map(|index| {
                state.followers.get(*index).map(|f| FollowerIndexInfo {
                    follower_index: index.to_string(),
                    remote_cluster: f.remote_cluster.clone(),
                    leader_index: f.leader_index.clone(),
                })
            })
            .collect();
        Ok(FollowInfo { follower_indices })
    }

    async fn close_index(&self, indices: &[&str]) -> Result<()> {
        self.record(CcrCall::CloseIndex {
            indices: owned(indices),
        })
    }

    async fn pause_follow(&self, index: &str) -> Result<()> {
        self.record(CcrCall::PauseFollow {
            index: index.to_string(),
        })
    }

    async fn unfollow(&self, index: &str) -> Result<()> {
        self.record(CcrCall::Unfollow {
            index: index.to_string(),
        })?;
        self.state.lock().unwrap().followers.remove(index);
        Ok(())
    }

    async fn delete_index(&self, indices: &[&str]) -> Result<()> {
        self.record(CcrCall::DeleteIndex {
            indices: owned(indices),
        })
    }
}
