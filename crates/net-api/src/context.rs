use std::sync::Arc;

use anyhow::Result;
use log::info;

use container_integration::{DockerL2Inspector, ProcessRunner};
use edge_network_config::{FileLabelStore, ServiceConfig};
use edge_network_nm::NmClient;

use crate::service::NetworkService;

#[derive(Clone)]
pub struct AppContext {
    pub config: ServiceConfig,
    pub service: Arc<NetworkService>,
}

impl AppContext {
    pub fn new(config: ServiceConfig, service: Arc<NetworkService>) -> Arc<Self> {
        Arc::new(Self { config, service })
    }

    /// Wires the service to NetworkManager on the system bus, the label
    /// file and the docker CLI.
    pub async fn bootstrap(config: ServiceConfig) -> Result<Arc<Self>> {
        let nm = Arc::new(NmClient::system().await?);
        let labels = Arc::new(FileLabelStore::new(config.label_file.clone()));
        let l2 = Arc::new(DockerL2Inspector::new(
            Arc::new(ProcessRunner::default()),
            config.docker_binary.clone(),
        ));
        info!(
            "Label file {}, settle delay {:?}",
            config.label_file.display(),
            config.settle_delay()
        );

        let service = Arc::new(NetworkService::new(nm, labels, l2, config.settle_delay()));
        Ok(Self::new(config, service))
    }
}
