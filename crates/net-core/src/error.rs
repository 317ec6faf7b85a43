//! Error types for network operations

use thiserror::Error;

/// Main error type for network operations
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("System error: {0}")]
    System(#[from] SystemError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl NetworkError {
    /// Shorthand for an adapter call that failed.
    pub fn adapter(operation: impl Into<String>, message: impl ToString) -> Self {
        NetworkError::System(SystemError::Adapter {
            operation: operation.into(),
            message: message.to_string(),
        })
    }
}

/// Configuration and label store errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Label file {path}: {message}")]
    LabelFile { path: String, message: String },

    #[error("Invalid configuration value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Failed to load service configuration: {message}")]
    Load { message: String },
}

/// Request validation errors
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A batch element names neither a MAC address nor a label.
    #[error("error, Mac address or Interface name should be entered")]
    MissingTarget,

    #[error("{message}")]
    Preconditions { message: String },

    #[error("Invalid address {value}")]
    Address { value: String },
}

/// Errors raised while talking to the system services
#[derive(Debug, Error)]
pub enum SystemError {
    #[error("Device not found: {target}")]
    DeviceNotFound { target: String },

    #[error("{operation} failed: {message}")]
    Adapter { operation: String, message: String },
}
