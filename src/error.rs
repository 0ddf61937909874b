/*!
 * Error types for ecfollowers
 */

use std::io;
use std::path::PathBuf;

use ecfollowers_ccr_interface::CcrError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProviderError>;

/// Exit code constants for structured process exit
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_FATAL: i32 = 2;

/// Step of the follower teardown sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStage {
    Close,
    Pause,
    Unfollow,
    DeleteIndex,
}

impl DeleteStage {
    pub fn name(&self) -> &'static str {
        match self {
            DeleteStage::Close => "close",
            DeleteStage::Pause => "pause",
            DeleteStage::Unfollow => "unfollow",
            DeleteStage::DeleteIndex => "delete",
        }
    }

    fn summary(&self) -> &'static str {
        match self {
            DeleteStage::Close => "Failed to close follower index",
            DeleteStage::Pause => "Failed to pause follower index",
            DeleteStage::Unfollow => "Failed to unfollow follower index",
            DeleteStage::DeleteIndex => "Failed to delete index",
        }
    }
}

impl std::fmt::Display for DeleteStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug)]
pub enum ProviderError {
    /// Provider settings missing or unusable
    #[error("{0}")]
    Config(String),

    /// A lifecycle call reached a resource the provider never configured
    #[error(
        "the {resource} resource was used before the provider configured it. \
         Please report this issue to the provider developers."
    )]
    Unconfigured { resource: String },

    /// Declared or tracked data is not a valid record
    #[error("{0}")]
    InvalidRecord(String),

    #[error("Could not create follower index {index}, {source}")]
    Create {
        index: String,
        #[source]
        source: CcrError,
    },

    #[error("Could not fetch follower index info for {index}, {source}")]
    Read {
        index: String,
        #[source]
        source: CcrError,
    },

    #[error("No data was returned from elasticsearch for follower index {index}")]
    NoFollowInfo { index: String },

    #[error("Could not {stage} follower index {index}, {source}")]
    Delete {
        index: String,
        stage: DeleteStage,
        #[source]
        source: CcrError,
    },

    /// Async runtime could not start or the operation was interrupted
    #[error("{0}")]
    Runtime(String),

    #[error("Could not access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ProviderError {
    /// Short title shown above the detail in diagnostics
    pub fn summary(&self) -> &'static str {
        match self {
            ProviderError::Config(_) => "Invalid provider configuration",
            ProviderError::Unconfigured { .. } => "Unexpected Resource Configure Type",
            ProviderError::InvalidRecord(_) => "Invalid resource data",
            ProviderError::Create { source, .. } => match source {
                CcrError::Payload(_) => "Failed to build payload to create follower index",
                _ => "Failed to create follower index",
            },
            ProviderError::Read { source, .. } => match source {
                CcrError::Decode { .. } => "Failed to parse follower index info",
                _ => "Failed to fetch follower index info",
            },
            ProviderError::NoFollowInfo { .. } => "Failed to fetch follower index info",
            ProviderError::Delete { stage, .. } => stage.summary(),
            ProviderError::Runtime(_) => "Operation did not complete",
            ProviderError::Io { .. } => "Failed to access file",
        }
    }

    /// Teardown stage that failed, for delete errors
    pub fn stage(&self) -> Option<DeleteStage> {
        match self {
            ProviderError::Delete { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Underlying remote-call failure, if any
    pub fn ccr_error(&self) -> Option<&CcrError> {
        match self {
            ProviderError::Create { source, .. }
            | ProviderError::Read { source, .. }
            | ProviderError::Delete { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Setup problems that no retry by the host can fix
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ProviderError::Config(_)
                | ProviderError::Unconfigured { .. }
                | ProviderError::InvalidRecord(_)
        )
    }

    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        if self.is_fatal() {
            EXIT_FATAL
        } else {
            EXIT_FAILED
        }
    }
}
