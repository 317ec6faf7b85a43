//! CLI commands

pub mod apply;
pub mod labels;
pub mod list;
pub mod validate;

pub use apply::ApplyCommand;
pub use labels::LabelsCommand;
pub use list::ListCommand;
pub use validate::ValidateCommand;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;

use edge_shared_types::NetworkSettings;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Reads a settings batch in wire JSON from `path`.
pub fn read_settings(path: &Path) -> Result<NetworkSettings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
    NetworkSettings::from_json(&content)
        .with_context(|| format!("Failed to parse settings file: {}", path.display()))
}
