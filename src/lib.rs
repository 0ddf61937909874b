/*!
 * ecfollowers - Elasticsearch cross-cluster replication followers
 *
 * Declarative management of CCR follower indices:
 * - Start following a leader index on a remote cluster
 * - Refresh the tracked leader coordinates from the cluster
 * - Tear followers down (close, pause, unfollow, optional delete)
 * - Plan classification for in-place updates versus replacement
 */

pub mod config;
pub mod connection;
pub mod diagnostics;
pub mod elastic;
pub mod error;
pub mod logging;
pub mod provider;
pub mod resource;

// Re-export commonly used types
pub use config::{ProviderConfig, ProviderSettings};
pub use connection::ConnectionProvider;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use ecfollowers_ccr_interface::{CcrApi, CcrError, FollowInfo, FollowRequest};
pub use error::{DeleteStage, ProviderError, Result};
pub use provider::{EcFollowersProvider, PROVIDER_TYPE_NAME};
pub use resource::{FollowerIndexModel, FollowerIndexResource, PlannedChange, Resource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
