//! Observed interface state

use std::sync::Arc;

use log::debug;

use edge_network_config::LabelStore;
use edge_network_core::devices::{connections_for, device_with_interface, device_with_mac, ethernet_devices};
use edge_network_core::{Device, L2Inspector, NetworkManager, Result};
use edge_shared_types::Interface;

use crate::gateway::GatewayCoordinator;
use crate::translate::to_interface;

/// Reports devices as interfaces, enriched with label, L2 reservation and
/// gateway designation.
pub struct InterfaceQuery {
    nm: Arc<dyn NetworkManager>,
    labels: Arc<dyn LabelStore>,
    l2: Arc<dyn L2Inspector>,
    gateway: Arc<GatewayCoordinator>,
}

impl InterfaceQuery {
    pub fn new(
        nm: Arc<dyn NetworkManager>,
        labels: Arc<dyn LabelStore>,
        l2: Arc<dyn L2Inspector>,
        gateway: Arc<GatewayCoordinator>,
    ) -> Self {
        Self {
            nm,
            labels,
            l2,
            gateway,
        }
    }

    pub async fn get_all(&self) -> Result<Vec<Interface>> {
        let gateway_mac = self.gateway.find_gateway_mac().await?;
        let mut interfaces = Vec::new();
        for device in ethernet_devices(self.nm.as_ref()).await? {
            interfaces.push(self.describe(device.as_ref(), gateway_mac.as_deref()).await?);
        }
        Ok(interfaces)
    }

    pub async fn get_by_mac(&self, mac: &str) -> Result<Option<Interface>> {
        match device_with_mac(self.nm.as_ref(), mac).await? {
            Some(device) => self.describe_one(device.as_ref()).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn get_by_label(&self, label: &str) -> Result<Option<Interface>> {
        let Some(interface_name) = self.labels.resolve(label).await else {
            return Ok(None);
        };
        match device_with_interface(self.nm.as_ref(), &interface_name).await? {
            Some(device) => self.describe_one(device.as_ref()).await.map(Some),
            None => Ok(None),
        }
    }

    async fn describe_one(&self, device: &dyn Device) -> Result<Interface> {
        let gateway_mac = self.gateway.find_gateway_mac().await?;
        self.describe(device, gateway_mac.as_deref()).await
    }

    /// Active profile with its live IPv4 state, else the first stored
    /// profile, else just the hardware address.
    async fn describe(&self, device: &dyn Device, gateway_mac: Option<&str>) -> Result<Interface> {
        let mac = device.hw_address().await?;
        let interface_name = device.interface().await?;

        let mut iface = match device.active_connection().await? {
            Some(active) => {
                let settings = active.connection().await?.settings().await?;
                let ip4 = active.ip4_config().await?;
                to_interface(&settings, ip4.as_ref(), &mac)
            }
            None => match connections_for(self.nm.as_ref(), &interface_name).await?.first() {
                Some(connection) => to_interface(&connection.settings().await?, None, &mac),
                None => Interface {
                    mac_address: mac.to_uppercase(),
                    ..Default::default()
                },
            },
        };

        iface.gateway_interface =
            gateway_mac.map_or(false, |gateway| gateway.eq_ignore_ascii_case(&mac));
        iface.l2 = Some(self.l2.inspect(&interface_name).await);
        iface.label = self
            .labels
            .reverse_resolve(&interface_name)
            .await
            .unwrap_or_default();
        debug!("Interface {} ({}) described", interface_name, iface.mac_address);
        iface.interface_name = interface_name;
        Ok(iface)
    }
}
