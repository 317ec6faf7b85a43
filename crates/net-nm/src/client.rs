//! NetworkManager backend over the system bus

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};
use zbus::zvariant::{ObjectPath, OwnedObjectPath};
use zbus::Connection as Bus;

use edge_network_core::{
    ActiveConnection, Connection, ConnectionSettings, Device, DeviceType, Ip4Config,
    NetworkError, NetworkManager, Result,
};

use crate::convert::{address_data, nameservers, route_data, settings_from_dict, settings_to_dict};
use crate::proxy::{
    ActiveProxy, DeviceProxy, IP4ConfigProxy, ManagerProxy, SettingsConnectionProxy,
    SettingsProxy, WiredProxy,
};

const NO_OBJECT: &str = "/";

fn bus_error(operation: &str) -> impl FnOnce(zbus::Error) -> NetworkError + '_ {
    move |e| NetworkError::adapter(operation, e)
}

fn object_path(path: &str) -> Result<ObjectPath<'_>> {
    ObjectPath::try_from(path).map_err(|e| NetworkError::adapter("ObjectPath", e))
}

/// NetworkManager reached through D-Bus.
#[derive(Clone)]
pub struct NmClient {
    bus: Bus,
}

impl NmClient {
    /// Connects to the system bus.
    pub async fn system() -> Result<Self> {
        let bus = Bus::system().await.map_err(bus_error("Connect"))?;
        info!("Connected to system D-Bus");
        Ok(Self { bus })
    }

    pub fn with_connection(bus: Bus) -> Self {
        Self { bus }
    }

    async fn manager(&self) -> Result<ManagerProxy<'static>> {
        ManagerProxy::new(&self.bus).await.map_err(bus_error("Manager"))
    }

    async fn settings_proxy(&self) -> Result<SettingsProxy<'static>> {
        SettingsProxy::new(&self.bus).await.map_err(bus_error("Settings"))
    }

    fn device(&self, path: OwnedObjectPath) -> Arc<dyn Device> {
        Arc::new(NmDevice {
            bus: self.bus.clone(),
            path: path.to_string(),
        })
    }

    fn connection(&self, path: OwnedObjectPath) -> Arc<dyn Connection> {
        Arc::new(NmConnection {
            bus: self.bus.clone(),
            path: path.to_string(),
        })
    }
}

#[async_trait]
impl NetworkManager for NmClient {
    async fn devices(&self) -> Result<Vec<Arc<dyn Device>>> {
        let paths = self
            .manager()
            .await?
            .get_devices()
            .await
            .map_err(bus_error("GetDevices"))?;
        Ok(paths.into_iter().map(|path| self.device(path)).collect())
    }

    async fn connections(&self) -> Result<Vec<Arc<dyn Connection>>> {
        let paths = self
            .settings_proxy()
            .await?
            .list_connections()
            .await
            .map_err(bus_error("ListConnections"))?;
        Ok(paths.into_iter().map(|path| self.connection(path)).collect())
    }

    async fn add_connection(&self, settings: &ConnectionSettings) -> Result<Arc<dyn Connection>> {
        let path = self
            .settings_proxy()
            .await?
            .add_connection(settings_to_dict(settings))
            .await
            .map_err(bus_error("AddConnection"))?;
        debug!("Added {} as {}", settings, path.as_str());
        Ok(self.connection(path))
    }

    async fn activate_connection(
        &self,
        connection: &dyn Connection,
        device: &dyn Device,
    ) -> Result<Arc<dyn ActiveConnection>> {
        let active = self
            .manager()
            .await?
            .activate_connection(
                &object_path(connection.path())?,
                &object_path(device.path())?,
                &object_path(NO_OBJECT)?,
            )
            .await
            .map_err(bus_error("ActivateConnection"))?;
        Ok(Arc::new(NmActiveConnection {
            bus: self.bus.clone(),
            path: active.to_string(),
        }))
    }

    async fn deactivate_connection(&self, active: &dyn ActiveConnection) -> Result<()> {
        self.manager()
            .await?
            .deactivate_connection(&object_path(active.path())?)
            .await
            .map_err(bus_error("DeactivateConnection"))
    }
}

struct NmDevice {
    bus: Bus,
    path: String,
}

impl NmDevice {
    async fn proxy(&self) -> Result<DeviceProxy<'_>> {
        DeviceProxy::builder(&self.bus)
            .path(self.path.as_str())
            .map_err(bus_error("Device"))?
            .build()
            .await
            .map_err(bus_error("Device"))
    }
}

#[async_trait]
impl Device for NmDevice {
    fn path(&self) -> &str {
        &self.path
    }

    async fn device_type(&self) -> Result<DeviceType> {
        let raw = self
            .proxy()
            .await?
            .device_type()
            .await
            .map_err(bus_error("DeviceType"))?;
        Ok(DeviceType::from(raw))
    }

    async fn hw_address(&self) -> Result<String> {
        self.proxy()
            .await?
            .hw_address()
            .await
            .map_err(bus_error("HwAddress"))
    }

    async fn perm_hw_address(&self) -> Result<String> {
        WiredProxy::builder(&self.bus)
            .path(self.path.as_str())
            .map_err(bus_error("Wired"))?
            .build()
            .await
            .map_err(bus_error("Wired"))?
            .perm_hw_address()
            .await
            .map_err(bus_error("PermHwAddress"))
    }

    async fn interface(&self) -> Result<String> {
        self.proxy()
            .await?
            .interface()
            .await
            .map_err(bus_error("Interface"))
    }

    async fn active_connection(&self) -> Result<Option<Arc<dyn ActiveConnection>>> {
        let path = self
            .proxy()
            .await?
            .active_connection()
            .await
            .map_err(bus_error("ActiveConnection"))?;
        if path.as_str() == NO_OBJECT {
            return Ok(None);
        }
        Ok(Some(Arc::new(NmActiveConnection {
            bus: self.bus.clone(),
            path: path.to_string(),
        })))
    }
}

struct NmConnection {
    bus: Bus,
    path: String,
}

impl NmConnection {
    async fn proxy(&self) -> Result<SettingsConnectionProxy<'_>> {
        SettingsConnectionProxy::builder(&self.bus)
            .path(self.path.as_str())
            .map_err(bus_error("Connection"))?
            .build()
            .await
            .map_err(bus_error("Connection"))
    }
}

#[async_trait]
impl Connection for NmConnection {
    fn path(&self) -> &str {
        &self.path
    }

    async fn settings(&self) -> Result<ConnectionSettings> {
        let dict = self
            .proxy()
            .await?
            .get_settings()
            .await
            .map_err(bus_error("GetSettings"))?;
        Ok(settings_from_dict(&dict))
    }

    async fn update(&self, settings: &ConnectionSettings) -> Result<()> {
        self.proxy()
            .await?
            .update(settings_to_dict(settings))
            .await
            .map_err(bus_error("Update"))
    }

    async fn delete(&self) -> Result<()> {
        self.proxy()
            .await?
            .delete()
            .await
            .map_err(bus_error("Delete"))?;
        debug!("Deleted {}", self.path);
        Ok(())
    }
}

struct NmActiveConnection {
    bus: Bus,
    path: String,
}

impl NmActiveConnection {
    async fn proxy(&self) -> Result<ActiveProxy<'_>> {
        ActiveProxy::builder(&self.bus)
            .path(self.path.as_str())
            .map_err(bus_error("ActiveConnection"))?
            .build()
            .await
            .map_err(bus_error("ActiveConnection"))
    }
}

#[async_trait]
impl ActiveConnection for NmActiveConnection {
    fn path(&self) -> &str {
        &self.path
    }

    async fn id(&self) -> Result<String> {
        self.proxy().await?.id().await.map_err(bus_error("Id"))
    }

    async fn uuid(&self) -> Result<String> {
        self.proxy().await?.uuid().await.map_err(bus_error("Uuid"))
    }

    async fn connection(&self) -> Result<Arc<dyn Connection>> {
        let path = self
            .proxy()
            .await?
            .connection()
            .await
            .map_err(bus_error("Connection"))?;
        Ok(Arc::new(NmConnection {
            bus: self.bus.clone(),
            path: path.to_string(),
        }))
    }

    async fn ip4_config(&self) -> Result<Option<Ip4Config>> {
        let path = self
            .proxy()
            .await?
            .ip4_config()
            .await
            .map_err(bus_error("Ip4Config"))?;
        if path.as_str() == NO_OBJECT {
            return Ok(None);
        }

        let config = IP4ConfigProxy::builder(&self.bus)
            .path(path.as_str())
            .map_err(bus_error("IP4Config"))?
            .build()
            .await
            .map_err(bus_error("IP4Config"))?;

        let addresses = config.address_data().await.map_err(bus_error("AddressData"))?;
        let routes = config.route_data().await.map_err(bus_error("RouteData"))?;
        let dns = config
            .nameserver_data()
            .await
            .map_err(bus_error("NameserverData"))?;
        Ok(Some(Ip4Config {
            addresses: address_data(&addresses),
            gateway: config.gateway().await.map_err(bus_error("Gateway"))?,
            nameservers: nameservers(&dns),
            routes: route_data(&routes),
        }))
    }
}
