//! Container integration error types

use thiserror::Error;

/// Container integration error types
#[derive(Debug, Error)]
pub enum ContainerError {
    /// Command could not be started or exited non-zero
    #[error("Command '{command}' failed: {output}")]
    CommandFailed { command: String, output: String },

    /// Command did not finish in time
    #[error("Command '{command}' timed out")]
    Timeout { command: String },

    /// Inspect output did not describe a usable macvlan network
    #[error("Invalid network definition '{network}': {reason}")]
    InvalidNetwork { network: String, reason: String },

    /// System error
    #[error("System error: {source}")]
    System {
        #[from]
        source: std::io::Error,
    },

    /// Serialization error
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

/// Result type for container operations
pub type Result<T> = std::result::Result<T, ContainerError>;
