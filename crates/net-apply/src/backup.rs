//! Per-device profile backups
//!
//! A backup is the first stored profile of a device, trimmed to what can be
//! re-added (identity, ethernet and ipv4 sections) and given a new uuid and
//! timestamp. It lives only as long as one transaction.

use log::{debug, info, warn};
use mac_address::MacAddress;
use uuid::Uuid;

use edge_network_core::devices::{connections_for, device_with_mac};
use edge_network_core::settings::{format_mac, keys};
use edge_network_core::{ConnectionSettings, Device, NetworkManager, Result, SettingValue};

use crate::replace::add_and_activate;
use crate::translate::unix_timestamp;

/// Captures a backup of the device's current profile; `None` when the
/// device has no profile.
pub async fn capture(
    nm: &dyn NetworkManager,
    device: &dyn Device,
    interface_name: &str,
) -> Result<Option<ConnectionSettings>> {
    let existing = connections_for(nm, interface_name).await?;
    let Some(first) = existing.first() else {
        info!("No existing profile on {}, nothing to back up", interface_name);
        return Ok(None);
    };

    let mut settings = first.settings().await?;
    if settings.mac_bytes().is_none() {
        fill_mac_from_device(&mut settings, device).await;
    }

    let backup = scrub(&settings);
    info!("Created backup {} of {}", backup, interface_name);
    Ok(Some(backup))
}

async fn fill_mac_from_device(settings: &mut ConnectionSettings, device: &dyn Device) {
    let perm = device.perm_hw_address().await.unwrap_or_default();
    match perm.parse::<MacAddress>() {
        Ok(mac) => settings.set_mac_address(&mac),
        Err(e) => warn!("Cannot set backup mac address from '{}': {}", perm, e),
    }
}

/// Copies only what can be written back, with a fresh uuid and timestamp.
pub fn scrub(settings: &ConnectionSettings) -> ConnectionSettings {
    let mut backup = ConnectionSettings::new();
    backup.ensure_section(keys::CONNECTION);
    for key in [keys::ID, keys::TYPE, keys::INTERFACE_NAME] {
        if let Some(value) = settings.get(keys::CONNECTION, key) {
            backup.set(keys::CONNECTION, key, value.clone());
        }
    }
    backup.set(keys::CONNECTION, keys::UUID, Uuid::new_v4().to_string());
    backup.set(
        keys::CONNECTION,
        keys::TIMESTAMP,
        SettingValue::U64(unix_timestamp()),
    );

    for section in [keys::ETHERNET, keys::IPV4] {
        backup.insert_section(section, settings.section(section).cloned().unwrap_or_default());
    }
    backup
}

/// Re-adds a backup and activates it on the device owning its MAC.
pub async fn restore(nm: &dyn NetworkManager, backup: &ConnectionSettings) -> Result<()> {
    let mac = backup.mac_bytes().map(format_mac).unwrap_or_default();
    let device = if mac.is_empty() {
        None
    } else {
        device_with_mac(nm, &mac).await?
    };
    if device.is_none() {
        debug!("No device for backup {} (mac '{}')", backup, mac);
    }

    add_and_activate(nm, backup, device.as_deref()).await?;
    info!("Restoration completed for {}", mac);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn scrub_keeps_identity_and_ipv4_only() {
        let mut original = ConnectionSettings::new();
        original.set(keys::CONNECTION, keys::ID, "LAN1_static");
        original.set(keys::CONNECTION, keys::TYPE, keys::ETHERNET);
        original.set(keys::CONNECTION, keys::INTERFACE_NAME, "eth0");
        original.set(keys::CONNECTION, keys::UUID, "00000000-0000-0000-0000-000000000001");
        original.set(keys::CONNECTION, "permissions", SettingValue::StrList(Vec::new()));
        original.set(keys::IPV4, keys::METHOD, "manual");
        original.set(keys::IPV6, keys::METHOD, "auto");
        original.set(keys::ETHERNET, keys::MAC_ADDRESS, vec![1u8, 2, 3, 4, 5, 6]);

        let backup = scrub(&original);

        assert_eq!(backup.id(), Some("LAN1_static"));
        assert_eq!(backup.interface_name(), Some("eth0"));
        assert!(backup.is_ethernet());
        assert_ne!(backup.uuid(), original.uuid());
        assert_eq!(backup.get(keys::CONNECTION, "permissions"), None);
        assert_eq!(backup.ipv4_method(), Some("manual"));
        assert!(backup.section(keys::IPV6).is_none());
        assert_eq!(backup.mac_address().as_deref(), Some("01:02:03:04:05:06"));
    }

    #[test]
    fn scrub_creates_missing_sections() {
        let backup = scrub(&ConnectionSettings::new());
        assert_eq!(backup.section(keys::IPV4), Some(&BTreeMap::new()));
        assert_eq!(backup.section(keys::ETHERNET), Some(&BTreeMap::new()));
        assert!(backup.uuid().is_some());
    }
}
