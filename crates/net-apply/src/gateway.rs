//! Gateway coordination
//!
//! At most one ethernet device should own the default route. The device
//! currently holding it is the one whose active default route has the
//! lowest metric; promoting a new one demotes the profiles of every other
//! device and reactivates them so the change takes effect immediately.

use std::sync::Arc;

use log::{debug, info};
use mac_address::MacAddress;

use edge_network_config::LabelStore;
use edge_network_core::devices::ethernet_devices;
use edge_network_core::error::ValidationError;
use edge_network_core::settings::{format_mac, keys, ROUTE_METRIC_DEMOTED};
use edge_network_core::{
    Connection, ConnectionSettings, Device, NetworkManager, Result, SettingValue,
};
use edge_shared_types::Interface;

/// IPv6 keys dropped from a demoted profile.
const IPV6_STRIPPED_KEYS: [&str; 4] = [
    keys::ADDRESSES,
    keys::ADDRESS_DATA,
    keys::ROUTES,
    keys::ROUTE_DATA,
];

pub struct GatewayCoordinator {
    nm: Arc<dyn NetworkManager>,
    labels: Arc<dyn LabelStore>,
}

impl GatewayCoordinator {
    pub fn new(nm: Arc<dyn NetworkManager>, labels: Arc<dyn LabelStore>) -> Self {
        Self { nm, labels }
    }

    /// Demotes every profile that does not belong to `promoted`.
    ///
    /// Does nothing unless `promoted` carries the gateway flag. Any adapter
    /// error aborts the reconciliation.
    pub async fn demote_others_except(&self, promoted: &Interface) -> Result<()> {
        if !promoted.gateway_interface {
            return Ok(());
        }
        info!(
            "Reconciling gateway priority for {}",
            promoted.target().map(|t| t.to_string()).unwrap_or_default()
        );

        for device in ethernet_devices(self.nm.as_ref()).await? {
            self.reconcile_device(device.as_ref(), promoted).await?;
        }
        Ok(())
    }

    async fn reconcile_device(&self, device: &dyn Device, promoted: &Interface) -> Result<()> {
        let interface_name = device.interface().await?;
        let (active_uuid, active_id) = match device.active_connection().await? {
            Some(active) => (active.uuid().await?, active.id().await?),
            None => (String::new(), String::new()),
        };

        for connection in self.nm.connections().await? {
            let settings = connection.settings().await?;
            if !is_device_profile(&settings, &interface_name, &active_uuid, &active_id) {
                continue;
            }
            self.check_and_demote(connection.as_ref(), settings, device, promoted, &active_uuid)
                .await?;
        }
        Ok(())
    }

    async fn check_and_demote(
        &self,
        connection: &dyn Connection,
        mut settings: ConnectionSettings,
        device: &dyn Device,
        promoted: &Interface,
        active_uuid: &str,
    ) -> Result<()> {
        if settings.mac_bytes().is_none() {
            let perm = device.perm_hw_address().await?;
            let mac = perm
                .parse::<MacAddress>()
                .map_err(|_| ValidationError::Address { value: perm.clone() })?;
            settings.set_mac_address(&mac);
        }
        let profile_mac = settings.mac_bytes().map(format_mac).unwrap_or_default();

        if !self.needs_demotion(promoted, &profile_mac, &settings).await {
            return Ok(());
        }

        demote(&mut settings);
        connection.update(&settings).await?;
        info!("Demoted {} (mac {})", settings, profile_mac);

        // Only the running profile is restarted.
        if active_uuid.is_empty() || settings.uuid() != Some(active_uuid) {
            debug!("{} not active on {}, no reactivation needed", settings, device.path());
            return Ok(());
        }
        if let Some(active) = device.active_connection().await? {
            self.nm.deactivate_connection(active.as_ref()).await?;
            self.nm.activate_connection(connection, device).await?;
            debug!("Reactivated {} on {}", settings, device.path());
        }
        Ok(())
    }

    /// True when the profile belongs to a device other than `promoted`.
    async fn needs_demotion(
        &self,
        promoted: &Interface,
        profile_mac: &str,
        settings: &ConnectionSettings,
    ) -> bool {
        if !promoted.mac_address.is_empty() {
            !promoted.mac_address.eq_ignore_ascii_case(profile_mac)
        } else if !promoted.label.is_empty() {
            let expected = self.labels.resolve(&promoted.label).await.unwrap_or_default();
            !expected.eq_ignore_ascii_case(settings.interface_name().unwrap_or_default())
        } else {
            false
        }
    }

    /// MAC of the device owning the lowest-metric default route. Ties keep
    /// the first device enumerated; devices that fail to report are skipped.
    pub async fn find_gateway_mac(&self) -> Result<Option<String>> {
        let mut best: Option<(String, u32)> = None;

        for device in ethernet_devices(self.nm.as_ref()).await? {
            match device_default_route(device.as_ref()).await {
                Ok(Some((mac, metric))) => {
                    if best.as_ref().map_or(true, |(_, lowest)| metric < *lowest) {
                        best = Some((mac, metric));
                    }
                }
                Ok(None) => {}
                Err(e) => debug!("Skipping {} in gateway scan: {}", device.path(), e),
            }
        }

        if let Some((mac, metric)) = &best {
            debug!("Gateway interface is {} (metric {})", mac, metric);
        }
        Ok(best.map(|(mac, _)| mac))
    }

    pub async fn is_gateway_interface(&self, mac: &str) -> Result<bool> {
        Ok(self
            .find_gateway_mac()
            .await?
            .map_or(false, |gateway| gateway.eq_ignore_ascii_case(mac)))
    }
}

/// Hardware address and default route metric of an active device.
async fn device_default_route(device: &dyn Device) -> Result<Option<(String, u32)>> {
    let mac = device.hw_address().await?;
    let Some(active) = device.active_connection().await? else {
        return Ok(None);
    };
    let Some(config) = active.ip4_config().await? else {
        return Ok(None);
    };
    Ok(config.default_route().map(|route| (mac, route.metric)))
}

/// Profile selection for reconciliation: an ethernet profile bound to the
/// device by name, or an unbound one matching its active connection.
fn is_device_profile(
    settings: &ConnectionSettings,
    interface_name: &str,
    active_uuid: &str,
    active_id: &str,
) -> bool {
    if !settings.is_ethernet() {
        return false;
    }
    match settings.interface_name().filter(|name| !name.is_empty()) {
        Some(name) => name == interface_name,
        None => {
            !active_uuid.is_empty()
                && settings.uuid() == Some(active_uuid)
                && settings.id() == Some(active_id)
        }
    }
}

fn demote(settings: &mut ConnectionSettings) {
    settings.set(
        keys::IPV4,
        keys::ROUTE_METRIC,
        SettingValue::I64(ROUTE_METRIC_DEMOTED),
    );
    for key in IPV6_STRIPPED_KEYS {
        settings.remove(keys::IPV6, key);
    }
}
