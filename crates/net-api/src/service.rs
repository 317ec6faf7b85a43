//! Serialized network service
//!
//! Every operation holds one service-wide lock for its whole duration, so
//! reads never observe a half-applied batch and two batches never
//! interleave.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info};
use tokio::sync::Mutex;

use edge_network_apply::{GatewayCoordinator, InterfaceQuery, NetworkApplier};
use edge_network_config::LabelStore;
use edge_network_core::{L2Inspector, NetworkManager};
use edge_network_validate::{PreconditionReport, PreconditionValidator};
use edge_shared_types::{Interface, NetworkSettings};

use crate::error::ServiceError;

pub struct NetworkService {
    lock: Mutex<()>,
    query: InterfaceQuery,
    validator: PreconditionValidator,
    applier: NetworkApplier,
    labels: Arc<dyn LabelStore>,
    settle_delay: Duration,
}

impl NetworkService {
    pub fn new(
        nm: Arc<dyn NetworkManager>,
        labels: Arc<dyn LabelStore>,
        l2: Arc<dyn L2Inspector>,
        settle_delay: Duration,
    ) -> Self {
        let gateway = Arc::new(GatewayCoordinator::new(nm.clone(), labels.clone()));
        Self {
            lock: Mutex::new(()),
            query: InterfaceQuery::new(nm.clone(), labels.clone(), l2, gateway.clone()),
            validator: PreconditionValidator::new(nm.clone()),
            applier: NetworkApplier::new(nm, labels.clone(), gateway),
            labels,
            settle_delay,
        }
    }

    pub async fn get_all_interfaces(&self) -> Result<NetworkSettings, ServiceError> {
        let _guard = self.lock.lock().await;
        debug!("GetAllInterfaces called");
        let interfaces = self.query.get_all().await.map_err(|e| {
            error!("Failed to enumerate interfaces: {}", e);
            ServiceError::internal(e)
        })?;
        Ok(NetworkSettings::new(interfaces))
    }

    pub async fn get_interface_with_mac(&self, mac: &str) -> Result<Interface, ServiceError> {
        let _guard = self.lock.lock().await;
        debug!("GetInterfaceWithMac called for {}", mac);
        self.query
            .get_by_mac(mac)
            .await
            .map_err(ServiceError::internal)?
            .ok_or_else(ServiceError::not_found)
    }

    pub async fn get_interface_with_label(&self, label: &str) -> Result<Interface, ServiceError> {
        let _guard = self.lock.lock().await;
        debug!("GetInterfaceWithLabel called for {}", label);
        self.query
            .get_by_label(label)
            .await
            .map_err(ServiceError::internal)?
            .ok_or_else(ServiceError::not_found)
    }

    /// Runs the precondition checks only.
    pub async fn check_settings(&self, settings: &NetworkSettings) -> Result<PreconditionReport, ServiceError> {
        let _guard = self.lock.lock().await;
        self.validator
            .verify(settings)
            .await
            .map_err(ServiceError::failed_precondition)
    }

    /// Validates, applies and then waits for the settle delay. The delay
    /// follows every batch that reached the engine, failed or not.
    pub async fn apply_settings(&self, settings: &NetworkSettings) -> Result<(), ServiceError> {
        let _guard = self.lock.lock().await;
        info!("ApplySettings called for {} interface(s)", settings.interfaces.len());

        let report = self
            .validator
            .verify(settings)
            .await
            .map_err(ServiceError::failed_precondition)?;
        if !report.valid {
            return Err(ServiceError::failed_precondition(report.message()));
        }

        let result = self.applier.apply(settings).await;
        if !self.settle_delay.is_zero() {
            debug!("Waiting {:?} for settings to settle", self.settle_delay);
            tokio::time::sleep(self.settle_delay).await;
        }

        match result {
            Ok(applied) => {
                info!(
                    "ApplySettings done ({} interface(s), transaction {})",
                    applied.applied, applied.transaction_id
                );
                Ok(())
            }
            Err(e) => {
                error!("ApplySettings failed: {}", e);
                Err(ServiceError::apply_failed(e))
            }
        }
    }

    pub async fn set_labels(&self, labels: &BTreeMap<String, String>) -> Result<(), ServiceError> {
        let _guard = self.lock.lock().await;
        info!("Setting {} label(s)", labels.len());
        self.labels
            .set_all(labels)
            .await
            .map_err(ServiceError::internal)
    }

    pub async fn get_labels(&self) -> Result<BTreeMap<String, String>, ServiceError> {
        let _guard = self.lock.lock().await;
        self.labels.get_all().await.map_err(ServiceError::internal)
    }
}
