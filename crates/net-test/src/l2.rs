//! Fixed L2 answers keyed by interface name

use std::collections::HashMap;

use async_trait::async_trait;

use edge_network_core::L2Inspector;
use edge_shared_types::L2Conf;

#[derive(Default)]
pub struct StaticL2 {
    configs: HashMap<String, L2Conf>,
}

impl StaticL2 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, interface: &str, conf: L2Conf) -> Self {
        self.configs.insert(interface.to_string(), conf);
        self
    }
}

#[async_trait]
impl L2Inspector for StaticL2 {
    async fn inspect(&self, interface_name: &str) -> L2Conf {
        self.configs.get(interface_name).cloned().unwrap_or_default()
    }
}
