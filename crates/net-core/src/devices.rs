//! Ethernet device enumeration and lookup helpers

use std::sync::Arc;

use log::debug;

use crate::nm::{Connection, Device, DeviceType, NetworkManager};
use crate::Result;

/// All devices the backend reports as wired ethernet, in enumeration order.
pub async fn ethernet_devices(nm: &dyn NetworkManager) -> Result<Vec<Arc<dyn Device>>> {
    let mut found = Vec::new();
    for device in nm.devices().await? {
        match device.device_type().await {
            Ok(DeviceType::Ethernet) => found.push(device),
            Ok(_) => {}
            Err(e) => debug!("Skipping device {}: {}", device.path(), e),
        }
    }
    Ok(found)
}

/// Case-insensitive hardware address match. With duplicates the last
/// device in enumeration order wins.
pub async fn device_with_mac(nm: &dyn NetworkManager, mac: &str) -> Result<Option<Arc<dyn Device>>> {
    let mut found = None;
    for device in ethernet_devices(nm).await? {
        let hw = device.hw_address().await.unwrap_or_default();
        if hw.eq_ignore_ascii_case(mac) {
            found = Some(device);
        }
    }
    if found.is_none() {
        debug!("No ethernet device with mac {}", mac);
    }
    Ok(found)
}

/// Case-insensitive interface name match; the first device wins.
pub async fn device_with_interface(
    nm: &dyn NetworkManager,
    interface_name: &str,
) -> Result<Option<Arc<dyn Device>>> {
    for device in ethernet_devices(nm).await? {
        let name = device.interface().await.unwrap_or_default();
        if name.eq_ignore_ascii_case(interface_name) {
            return Ok(Some(device));
        }
    }
    debug!("No ethernet device named {}", interface_name);
    Ok(None)
}

/// Every stored ethernet profile bound to `interface_name`.
///
/// Profiles whose settings cannot be read are skipped.
pub async fn connections_for(
    nm: &dyn NetworkManager,
    interface_name: &str,
) -> Result<Vec<Arc<dyn Connection>>> {
    let mut matching = Vec::new();
    for connection in nm.connections().await? {
        match connection.settings().await {
            Ok(settings) => {
                if settings.interface_name() == Some(interface_name) && settings.is_ethernet() {
                    matching.push(connection);
                }
            }
            Err(e) => debug!("Skipping profile {}: {}", connection.path(), e),
        }
    }
    Ok(matching)
}
