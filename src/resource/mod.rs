//! Declarative resources managed by the provider
//!
//! A resource turns a declared state into remote calls and hands back the
//! record the host should persist. Resources hold no state between calls
//! beyond the client handle they were configured with.
//!
//! # Example
//!
//! ```no_run
//! use ecfollowers::config::ProviderSettings;
//! use ecfollowers::provider::EcFollowersProvider;
//! use ecfollowers::resource::{FollowerIndexModel, Resource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = EcFollowersProvider::new();
//!     let connection = provider.configure(ProviderSettings {
//!         url: Some("http://localhost:9200".to_string()),
//!         ..Default::default()
//!     })?;
//!     let resource = provider.follower_index(&connection)?;
//!
//!     let plan = FollowerIndexModel::new("logs-eu-follow", "eu-cluster", "logs-eu");
//!     let state = resource.create(plan).await?;
//!     println!("created {}", state.id.unwrap_or_default());
//!     Ok(())
//! }
//! ```

mod follower_index;
mod model;
pub mod plan;
pub mod schema;

pub use follower_index::FollowerIndexResource;
pub use model::{follower_id, format_last_updated, FollowerIndexModel};
pub use plan::PlannedChange;
pub use schema::{Attribute, AttributeType, PlanModifier, Schema};

use std::sync::Arc;

use async_trait::async_trait;
use ecfollowers_ccr_interface::CcrApi;

use crate::error::Result;

/// Lifecycle contract between the host and one resource type
///
/// Every operation receives the full record it acts on and returns the record
/// to persist. An `Err` means the host keeps whatever it had before the call.
#[async_trait]
pub trait Resource: Send + Sync {
    type Model: Send + Sync + 'static;

    /// Resource type name under the given provider prefix
    fn type_name(&self, provider_type_name: &str) -> String;

    fn schema(&self) -> Schema;

    /// Bind the resource to a cluster client
    fn configure(&mut self, client: Arc<dyn CcrApi>);

    async fn create(&self, plan: Self::Model) -> Result<Self::Model>;

    async fn read(&self, state: Self::Model) -> Result<Self::Model>;

    async fn update(&self, prior: Self::Model, plan: Self::Model) -> Result<Self::Model>;

    async fn delete(&self, state: Self::Model) -> Result<()>;
}
