//! Edge Network Configuration
//!
//! Persistent label map and service configuration loading

pub mod labels;
pub mod service;

#[cfg(test)]
mod tests;

pub use labels::{FileLabelStore, LabelStore, DEFAULT_LABEL_FILE};
pub use service::{ListenAddress, ServiceConfig};
