//! Edge Network Validation
//!
//! Precondition checks run before any mutation of a settings batch. Every
//! violation in the batch is collected so the caller gets one complete
//! diagnostic instead of the first failure.

pub mod syntax;

pub use crate::syntax::SyntaxValidator;

use std::sync::Arc;

use log::{info, warn};

use edge_network_core::devices::device_with_mac;
use edge_network_core::error::ValidationError;
use edge_network_core::{NetworkError, NetworkManager};
use edge_shared_types::{Interface, NetworkSettings};

/// Outcome of checking a whole batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreconditionReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl PreconditionReport {
    pub fn message(&self) -> String {
        self.errors.join("; ")
    }

    /// `Ok(())` when valid, otherwise the combined message as an error.
    pub fn into_result(self) -> Result<(), NetworkError> {
        if self.valid {
            Ok(())
        } else {
            Err(ValidationError::Preconditions {
                message: self.message(),
            }
            .into())
        }
    }
}

/// Checks address syntax and device existence for a batch.
pub struct PreconditionValidator {
    nm: Arc<dyn NetworkManager>,
    syntax: SyntaxValidator,
}

impl PreconditionValidator {
    pub fn new(nm: Arc<dyn NetworkManager>) -> Self {
        Self {
            nm,
            syntax: SyntaxValidator::new(),
        }
    }

    /// Validates every element. Adapter failures while looking up devices
    /// are returned as errors, violations go into the report.
    pub async fn verify(&self, settings: &NetworkSettings) -> Result<PreconditionReport, NetworkError> {
        let mut errors = Vec::new();

        for element in &settings.interfaces {
            if element.label.is_empty() {
                self.verify_mac(element, &mut errors).await?;
            }
            if let Some(conf) = &element.static_conf {
                errors.extend(self.syntax.validate_static(conf));
            }
            if let Some(conf) = &element.dns {
                errors.extend(self.syntax.validate_dns(conf));
            }
        }

        let report = PreconditionReport {
            valid: errors.is_empty(),
            errors,
        };
        if report.valid {
            info!("Precondition check passed for {} interface(s)", settings.interfaces.len());
        } else {
            warn!("Precondition check failed: {}", report.message());
        }
        Ok(report)
    }

    async fn verify_mac(&self, element: &Interface, errors: &mut Vec<String>) -> Result<(), NetworkError> {
        let mac = &element.mac_address;
        if !self.syntax.is_valid_mac(mac) {
            errors.push(format!("wrong mac address {}", mac));
        } else if device_with_mac(self.nm.as_ref(), mac).await?.is_none() {
            errors.push(format!("device does not exist: mac address {}", mac));
        }
        Ok(())
    }
}
