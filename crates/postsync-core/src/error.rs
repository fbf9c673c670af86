//! Error taxonomy for the sync layer.
//!
//! Every variant is caught at the orchestrator boundary and turned into a
//! single notification string; nothing here is meant to escape a session.

use std::fmt;

/// Step of the publish protocol that produced a storage failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublishStep {
    List,
    Delete,
    Put,
}

impl fmt::Display for PublishStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PublishStep::List => "list",
            PublishStep::Delete => "delete",
            PublishStep::Put => "put",
        };
        f.write_str(name)
    }
}

/// Errors produced by the sync layer.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// `step` tells the operator how far the publish got. A failed `put`
    /// after a successful `delete` means the key is currently absent.
    #[error("Storage error during {step} of {key}: {message}")]
    Storage {
        step: PublishStep,
        key: String,
        message: String,
    },

    #[error("Initialization error: {0}")]
    Initialization(String),

    #[error("Storage client is not initialized")]
    NotInitialized,
}

pub type Result<T> = std::result::Result<T, SyncError>;
