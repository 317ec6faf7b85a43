//! Profile replacement primitives shared by apply and restore

use log::{info, warn};

use edge_network_core::devices::connections_for;
use edge_network_core::{ConnectionSettings, Device, NetworkManager, Result};

/// Deletes every ethernet profile bound to `interface_name`. The first
/// delete failure aborts.
pub async fn delete_profiles(nm: &dyn NetworkManager, interface_name: &str) -> Result<usize> {
    let stale = connections_for(nm, interface_name).await?;
    for connection in &stale {
        connection.delete().await?;
    }
    if !stale.is_empty() {
        info!("Deleted {} profile(s) bound to {}", stale.len(), interface_name);
    }
    Ok(stale.len())
}

/// Adds `settings` as a new profile and activates it on `device`.
///
/// Adding is a hard failure. Activation failing (or no device to activate
/// on) is only logged: the profile stays stored and counts as applied.
pub async fn add_and_activate(
    nm: &dyn NetworkManager,
    settings: &ConnectionSettings,
    device: Option<&dyn Device>,
) -> Result<()> {
    let connection = nm.add_connection(settings).await?;
    info!("Profile {} stored", settings);

    match device {
        Some(device) => {
            if let Err(e) = nm.activate_connection(connection.as_ref(), device).await {
                warn!(
                    "Configuration applied, but could not be activated on {}: {}",
                    device.path(),
                    e
                );
            }
        }
        None => warn!("Configuration applied, but no device to activate {} on", settings),
    }
    Ok(())
}
