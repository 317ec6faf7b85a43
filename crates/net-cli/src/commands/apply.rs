//! Apply command

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;

use edge_network_api::context::AppContext;

use super::{read_settings, ValidateCommand};

pub struct ApplyCommand {
    context: Arc<AppContext>,
}

impl ApplyCommand {
    pub fn new(context: Arc<AppContext>) -> Self {
        Self { context }
    }

    /// Applies the batch in `path`. With `dry_run` only the precondition
    /// checks run.
    pub async fn execute(&self, path: &Path, dry_run: bool) -> Result<String> {
        if dry_run {
            let summary = ValidateCommand::new(self.context.clone()).execute(path).await?;
            return Ok(format!("{}\nDry-run completed - settings would be applied", summary));
        }

        let settings = read_settings(path)?;
        info!("Applying {} interface(s) from {}", settings.interfaces.len(), path.display());
        self.context
            .service
            .apply_settings(&settings)
            .await
            .context("Failed to apply network settings")?;

        Ok(format!(
            "✓ {} interface(s) applied successfully",
            settings.interfaces.len()
        ))
    }
}
