//! `follower_index` resource: one CCR follower per record

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use ecfollowers_ccr_interface::{CcrApi, CcrError};
use tracing::{debug, info, warn};

use super::model::{follower_id, FollowerIndexModel};
use super::plan::{plan_change, PlannedChange};
use super::schema::{Attribute, PlanModifier, Schema};
use super::Resource;
use crate::error::{DeleteStage, ProviderError, Result};
use crate::provider::PROVIDER_TYPE_NAME;

const TYPE_SUFFIX: &str = "_follower_index";

/// Manages the follower side of a cross-cluster replication pair
///
/// Create starts following, read refreshes the leader coordinates from the
/// cluster, update only restamps the record, and delete tears the follower
/// down in four gated steps:
///
/// 1. close the index
/// 2. pause following
/// 3. unfollow
/// 4. delete the index, unless `cleanup_index` is false
///
/// A failed step stops the sequence. Steps already done stay done.
#[derive(Clone, Default)]
pub struct FollowerIndexResource {
    client: Option<Arc<dyn CcrApi>>,
}

impl std::fmt::Debug for FollowerIndexResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FollowerIndexResource")
            .field("endpoint", &self.client.as_ref().map(|c| c.endpoint()))
            .finish()
    }
}

impl FollowerIndexResource {
    /// Unconfigured resource; lifecycle calls fail until [`Resource::configure`]
    ///
    /// [`FollowerIndexResource::plan`] and the schema need no client.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Arc<dyn CcrApi>) -> Self {
        Self {
            client: Some(client),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Classify the change from `prior` to `proposed`
    pub fn plan(
        &self,
        prior: Option<&FollowerIndexModel>,
        proposed: &FollowerIndexModel,
    ) -> Result<PlannedChange> {
        let to_value = |model: &FollowerIndexModel| {
            serde_json::to_value(model).map_err(|e| {
                ProviderError::InvalidRecord(format!("Could not encode follower index: {}", e))
            })
        };
        let prior = prior.map(to_value).transpose()?;
        let proposed = to_value(proposed)?;
        Ok(plan_change(&self.schema(), prior.as_ref(), &proposed))
    }

    fn client(&self) -> Result<&dyn CcrApi> {
        self.client
            .as_deref()
            .ok_or_else(|| ProviderError::Unconfigured {
                resource: format!("{}{}", PROVIDER_TYPE_NAME, TYPE_SUFFIX),
            })
    }

    async fn teardown_step<F>(&self, index: &str, stage: DeleteStage, call: F) -> Result<()>
    where
        F: std::future::Future<Output = std::result::Result<(), CcrError>> + Send,
    {
        debug!(index, stage = stage.name(), "Running teardown step");
        call.await.map_err(|source| {
            warn!(
                index,
                stage = stage.name(),
                "Follower teardown stopped; completed steps are not rolled back"
            );
            ProviderError::Delete {
                index: index.to_string(),
                stage,
                source,
            }
        })
    }
}

#[async_trait]
impl Resource for FollowerIndexResource {
    type Model = FollowerIndexModel;

    fn type_name(&self, provider_type_name: &str) -> String {
        format!("{}{}", provider_type_name, TYPE_SUFFIX)
    }

    fn schema(&self) -> Schema {
        Schema::new(vec![
            Attribute::string("id")
                .computed()
                .plan_modifier(PlanModifier::UseStateForUnknown),
            Attribute::string("index")
                .required()
                .plan_modifier(PlanModifier::RequiresReplace)
                .description("Elastic Index to create as a follower."),
            Attribute::string("remote_cluster")
                .required()
                .plan_modifier(PlanModifier::RequiresReplace)
                .description("Name of the remote cluster."),
            Attribute::string("leader_index")
                .required()
                .plan_modifier(PlanModifier::RequiresReplace)
                .description("Name of the index to follow on the remote cluster."),
            Attribute::bool("cleanup_index").optional().description(
                "If set to true, it will also delete the local index when removing the follower. (Defaults to true)",
            ),
            Attribute::string("last_updated").computed(),
        ])
    }

    fn configure(&mut self, client: Arc<dyn CcrApi>) {
        self.client = Some(client);
    }

    async fn create(&self, mut plan: FollowerIndexModel) -> Result<FollowerIndexModel> {
        plan.validate()?;
        let client = self.client()?;

        info!(
            index = %plan.index,
            remote_cluster = %plan.remote_cluster,
            leader_index = %plan.leader_index,
            "Creating follower index"
        );
        client
            .follow(&plan.index, &plan.follow_request())
            .await
            .map_err(|source| ProviderError::Create {
                index: plan.index.clone(),
                source,
            })?;

        plan.id = Some(follower_id(
            &plan.remote_cluster,
            &plan.leader_index,
            &plan.index,
        ));
        plan.touch(Utc::now());
        Ok(plan)
    }

    async fn read(&self, mut state: FollowerIndexModel) -> Result<FollowerIndexModel> {
        let client = self.client()?;

        debug!(index = %state.index, "Reading follower index info");
        let info = client
            .follow_info(&[state.index.as_str()])
            .await
            .map_err(|source| ProviderError::Read {
                index: state.index.clone(),
                source,
            })?;

        let mut entries = info.follower_indices;
        let position = entries
            .iter()
            .position(|e| e.follower_index == state.index)
            .unwrap_or(0);
        if position >= entries.len() {
            return Err(ProviderError::NoFollowInfo { index: state.index });
        }
        let remote = entries.swap_remove(position);

        if remote.leader_index != state.leader_index
            || remote.remote_cluster != state.remote_cluster
        {
            info!(
                index = %state.index,
                remote_cluster = %remote.remote_cluster,
                leader_index = %remote.leader_index,
                "Follower index changed outside of the provider; refreshing record"
            );
        }
        state.leader_index = remote.leader_index;
        state.remote_cluster = remote.remote_cluster;
        Ok(state)
    }

    async fn update(
        &self,
        prior: FollowerIndexModel,
        mut plan: FollowerIndexModel,
    ) -> Result<FollowerIndexModel> {
        self.client()?;
        debug!(index = %plan.index, "Updating follower index record");
        if plan.id.is_none() {
            plan.id = prior.id;
        }
        plan.touch(Utc::now());
        Ok(plan)
    }

    async fn delete(&self, state: FollowerIndexModel) -> Result<()> {
        let client = self.client()?;
        let index = state.index.as_str();
        info!(index, cleanup = state.cleanup_on_delete(), "Deleting follower index");

        self.teardown_step(index, DeleteStage::Close, client.close_index(&[index]))
            .await?;
        self.teardown_step(index, DeleteStage::Pause, client.pause_follow(index))
            .await?;
        self.teardown_step(index, DeleteStage::Unfollow, client.unfollow(index))
            .await?;

        if state.cleanup_on_delete() {
            self.teardown_step(
                index,
                DeleteStage::DeleteIndex,
                client.delete_index(&[index]),
            )
            .await?;
        } else {
            info!(index, "Keeping local index after unfollow");
        }
        Ok(())
    }
}
