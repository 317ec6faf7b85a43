//! Label map store
//!
//! Maps operator-assigned labels to kernel interface names. The map lives in
//! a small JSON file that is rewritten wholesale on every update and re-read
//! on every lookup, so edits made by other processes are picked up without a
//! restart. Nothing locks the file against concurrent writers.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::fs;

use edge_network_core::{ConfigError, Result};

/// Well-known location of the label map.
pub const DEFAULT_LABEL_FILE: &str = "/var/network.label";

#[async_trait]
pub trait LabelStore: Send + Sync {
    /// Replaces the whole map. Keys and values are stored uppercased.
    async fn set_all(&self, labels: &BTreeMap<String, String>) -> Result<()>;

    async fn get_all(&self) -> Result<BTreeMap<String, String>>;

    /// Interface name for a label; `None` when unknown or unreadable.
    async fn resolve(&self, label: &str) -> Option<String>;

    /// Label assigned to an interface name; `None` when unknown or unreadable.
    async fn reverse_resolve(&self, interface_name: &str) -> Option<String>;
}

/// [`LabelStore`] backed by a JSON object on disk.
#[derive(Debug, Clone)]
pub struct FileLabelStore {
    path: PathBuf,
}

impl FileLabelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file_error(&self, message: impl ToString) -> ConfigError {
        ConfigError::LabelFile {
            path: self.path.display().to_string(),
            message: message.to_string(),
        }
    }

    async fn read_map(&self) -> Result<BTreeMap<String, String>> {
        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| self.file_error(e))?;
        let map = serde_json::from_str(&content).map_err(|e| self.file_error(e))?;
        Ok(map)
    }

    /// Lookups treat an unreadable file as an empty map.
    async fn read_map_lenient(&self) -> BTreeMap<String, String> {
        match self.read_map().await {
            Ok(map) => map,
            Err(e) => {
                warn!("Cannot read label map: {}", e);
                BTreeMap::new()
            }
        }
    }
}

impl Default for FileLabelStore {
    fn default() -> Self {
        Self::new(DEFAULT_LABEL_FILE)
    }
}

/// Uppercases both sides of the map.
pub fn uppercase_map(labels: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    labels
        .iter()
        .map(|(label, interface)| (label.to_uppercase(), interface.to_uppercase()))
        .collect()
}

#[async_trait]
impl LabelStore for FileLabelStore {
    async fn set_all(&self, labels: &BTreeMap<String, String>) -> Result<()> {
        let content = serde_json::to_string(&uppercase_map(labels))?;
        fs::write(&self.path, content)
            .await
            .map_err(|e| self.file_error(e))?;
        info!("Label map written to {} ({} entries)", self.path.display(), labels.len());
        Ok(())
    }

    async fn get_all(&self) -> Result<BTreeMap<String, String>> {
        self.read_map().await
    }

    async fn resolve(&self, label: &str) -> Option<String> {
        let found = self.read_map_lenient().await.remove(&label.to_uppercase());
        if found.is_none() {
            debug!("No interface for label {}", label);
        }
        found
    }

    async fn reverse_resolve(&self, interface_name: &str) -> Option<String> {
        self.read_map_lenient()
            .await
            .into_iter()
            .find(|(_, interface)| interface.eq_ignore_ascii_case(interface_name))
            .map(|(label, _)| label)
    }
}
