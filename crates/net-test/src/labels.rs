//! Label store held in memory

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use edge_network_config::labels::uppercase_map;
use edge_network_config::LabelStore;
use edge_network_core::{ConfigError, Result};

#[derive(Default)]
pub struct MemoryLabelStore {
    labels: Mutex<BTreeMap<String, String>>,
    fail_writes: bool,
}

impl MemoryLabelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_labels(pairs: &[(&str, &str)]) -> Self {
        let labels = pairs
            .iter()
            .map(|(label, interface)| (label.to_string(), interface.to_string()))
            .collect();
        Self {
            labels: Mutex::new(uppercase_map(&labels)),
            fail_writes: false,
        }
    }

    /// Store whose `set_all` always fails.
    pub fn read_only() -> Self {
        Self {
            labels: Mutex::default(),
            fail_writes: true,
        }
    }

    fn snapshot(&self) -> BTreeMap<String, String> {
        match self.labels.lock() {
            Ok(labels) => labels.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl LabelStore for MemoryLabelStore {
    async fn set_all(&self, labels: &BTreeMap<String, String>) -> Result<()> {
        if self.fail_writes {
            return Err(ConfigError::LabelFile {
                path: "<memory>".to_string(),
                message: "read-only".to_string(),
            }
            .into());
        }
        let mut stored = match self.labels.lock() {
            Ok(stored) => stored,
            Err(poisoned) => poisoned.into_inner(),
        };
        *stored = uppercase_map(labels);
        Ok(())
    }

    async fn get_all(&self) -> Result<BTreeMap<String, String>> {
        Ok(self.snapshot())
    }

    async fn resolve(&self, label: &str) -> Option<String> {
        self.snapshot().remove(&label.to_uppercase())
    }

    async fn reverse_resolve(&self, interface_name: &str) -> Option<String> {
        self.snapshot()
            .into_iter()
            .find(|(_, interface)| interface.eq_ignore_ascii_case(interface_name))
            .map(|(label, _)| label)
    }
}
