//! Label map commands

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use edge_network_api::context::AppContext;

use super::OutputFormat;

pub struct LabelsCommand {
    context: Arc<AppContext>,
}

impl LabelsCommand {
    pub fn new(context: Arc<AppContext>) -> Self {
        Self { context }
    }

    pub async fn show(&self, format: OutputFormat) -> Result<String> {
        let labels = self.context.service.get_labels().await?;
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&labels)?),
            OutputFormat::Text => Ok(labels
                .iter()
                .map(|(label, interface)| format!("{:<12} {}", label, interface))
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    /// Replaces the whole label map with the JSON object in `path`.
    pub async fn set(&self, path: &Path) -> Result<String> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read label file: {}", path.display()))?;
        let labels: BTreeMap<String, String> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse label file: {}", path.display()))?;

        self.context.service.set_labels(&labels).await?;
        Ok(format!("✓ {} label(s) stored", labels.len()))
    }
}
