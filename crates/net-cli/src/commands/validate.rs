//! Validate command

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Result};
use log::debug;

use edge_network_api::context::AppContext;

use super::read_settings;

/// Runs the precondition checks against a settings file without touching
/// any device.
pub struct ValidateCommand {
    context: Arc<AppContext>,
}

impl ValidateCommand {
    pub fn new(context: Arc<AppContext>) -> Self {
        Self { context }
    }

    pub async fn execute(&self, path: &Path) -> Result<String> {
        let settings = read_settings(path)?;
        debug!("Validating {} interface(s) from {}", settings.interfaces.len(), path.display());

        let report = self.context.service.check_settings(&settings).await?;
        if !report.valid {
            bail!("Settings are invalid: {}", report.message());
        }
        Ok(format!(
            "✓ {} interface(s) in {} are valid",
            settings.interfaces.len(),
            path.display()
        ))
    }
}
