//! Stub Elasticsearch cluster for integration tests
//!
//! Serves the CCR and index administration endpoints on an ephemeral port and
//! records every request it receives.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header::AUTHORIZATION, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub body: String,
    pub authorization: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    requests: Vec<Recorded>,
    followers: HashMap<String, (String, String)>,
    fail_suffix: Option<String>,
    delay: Option<Duration>,
}

#[derive(Debug, Clone, Default)]
pub struct StubCluster {
    inner: Arc<Mutex<Inner>>,
}

impl StubCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer 500 to every request whose path ends with `suffix`
    pub fn fail_on_suffix(&self, suffix: &str) {
        self.inner.lock().unwrap().fail_suffix = Some(suffix.to_string());
    }

    /// Hold every response for `delay`
    pub fn delay(&self, delay: Duration) {
        self.inner.lock().unwrap().delay = Some(delay);
    }

    pub fn add_follower(&self, index: &str, remote_cluster: &str, leader_index: &str) {
        self.inner.lock().unwrap().followers.insert(
            index.to_string(),
            (remote_cluster.to_string(), leader_index.to_string()),
        );
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.inner.lock().unwrap().requests.clone()
    }

    /// `"METHOD /path"` for each recorded request
    pub fn request_lines(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect()
    }

    /// Bind on 127.0.0.1 and serve in the background; returns the base URL
    pub async fn spawn(&self) -> anyhow::Result<String> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = Router::new().fallback(handle).with_state(self.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok(format!("http://{}", addr))
    }
}

fn acknowledged() -> Response {
    Json(json!({"acknowledged": true})).into_response()
}

async fn handle(
    State(cluster): State<StubCluster>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let delay = {
        let mut inner = cluster.inner.lock().unwrap();
        inner.requests.push(Recorded {
            method: method.clone(),
            path: path.clone(),
            body: String::from_utf8_lossy(&body).into_owned(),
            authorization: headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        });
        inner.delay
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let mut inner = cluster.inner.lock().unwrap();
    if let Some(ref suffix) = inner.fail_suffix {
        if path.ends_with(suffix.as_str()) {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": {"type": "stub_failure", "reason": "forced"}, "status": 500})),
            )
                .into_response();
        }
    }

    let target = path.trim_start_matches('/');
    let (indices, action) = target.split_once('/').unwrap_or((target, ""));

    match (method, action) {
        (Method::PUT, "_ccr/follow") => {
            let request: Value = match serde_json::from_slice(&body) {
                Ok(v) => v,
                Err(_) => return StatusCode::BAD_REQUEST.into_response(),
            };
            let remote = request["remote_cluster"].as_str().unwrap_or_default();
            let leader = request["leader_index"].as_str().unwrap_or_default();
            inner
                .followers
                .insert(indices.to_string(), (remote.to_string(), leader.to_string()));
            Json(json!({
                "follow_index_created": true,
                "follow_index_shards_acked": true,
                "index_following_started": true
            }))
            .into_response()
        }
        (Method::GET, "_ccr/info") => {
            let follower_indices: Vec<Value> = indices
                .split(',')
                .filter_map(|index| {
                    inner.followers.get(index).map(|(remote, leader)| {
                        json!({
                            "follower_index": index,
                            "remote_cluster": remote,
                            "leader_index": leader,
                            "status": "active",
                        })
                    })
                })
                .collect();
            Json(json!({ "follower_indices": follower_indices })).into_response()
        }
        (Method::POST, "_close") | (Method::POST, "_ccr/pause_follow") => acknowledged(),
        (Method::POST, "_ccr/unfollow") => {
            inner.followers.remove(indices);
            acknowledged()
        }
        (Method::DELETE, "") => acknowledged(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}
