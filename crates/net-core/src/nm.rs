//! Network manager capability traits
//!
//! The settings engine only depends on these narrow interfaces so it can
//! run against the system NetworkManager over D-Bus or an in-memory fake.

use std::sync::Arc;

use async_trait::async_trait;

use crate::settings::ConnectionSettings;
use crate::Result;

/// Device kind as reported by the backend (`NMDeviceType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    Ethernet,
    Other(u32),
}

impl From<u32> for DeviceType {
    fn from(value: u32) -> Self {
        match value {
            1 => DeviceType::Ethernet,
            other => DeviceType::Other(other),
        }
    }
}

/// One `address-data` entry of a live IPv4 configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpAddressData {
    pub address: String,
    pub prefix: u32,
}

/// One `route-data` entry of a live IPv4 configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteData {
    pub dest: String,
    pub prefix: u32,
    pub next_hop: String,
    pub metric: u32,
}

impl RouteData {
    pub fn is_default(&self) -> bool {
        self.dest == "0.0.0.0" && self.prefix == 0
    }
}

/// Snapshot of the IPv4 state an active connection currently holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ip4Config {
    pub addresses: Vec<IpAddressData>,
    pub gateway: String,
    pub nameservers: Vec<String>,
    pub routes: Vec<RouteData>,
}

impl Ip4Config {
    pub fn default_route(&self) -> Option<&RouteData> {
        self.routes.iter().find(|route| route.is_default())
    }
}

#[async_trait]
pub trait Device: Send + Sync {
    /// Backend object path, used in log messages.
    fn path(&self) -> &str;
    async fn device_type(&self) -> Result<DeviceType>;
    async fn hw_address(&self) -> Result<String>;
    async fn perm_hw_address(&self) -> Result<String>;
    /// Kernel interface name, e.g. `eth0`.
    async fn interface(&self) -> Result<String>;
    async fn active_connection(&self) -> Result<Option<Arc<dyn ActiveConnection>>>;
}

#[async_trait]
pub trait ActiveConnection: Send + Sync {
    fn path(&self) -> &str;
    async fn id(&self) -> Result<String>;
    async fn uuid(&self) -> Result<String>;
    /// Stored profile backing this activation.
    async fn connection(&self) -> Result<Arc<dyn Connection>>;
    async fn ip4_config(&self) -> Result<Option<Ip4Config>>;
}

/// A persisted connection profile.
#[async_trait]
pub trait Connection: Send + Sync {
    fn path(&self) -> &str;
    async fn settings(&self) -> Result<ConnectionSettings>;
    async fn update(&self, settings: &ConnectionSettings) -> Result<()>;
    async fn delete(&self) -> Result<()>;
}

#[async_trait]
pub trait NetworkManager: Send + Sync {
    async fn devices(&self) -> Result<Vec<Arc<dyn Device>>>;
    /// Every stored profile, active or not.
    async fn connections(&self) -> Result<Vec<Arc<dyn Connection>>>;
    async fn add_connection(&self, settings: &ConnectionSettings) -> Result<Arc<dyn Connection>>;
    async fn activate_connection(
        &self,
        connection: &dyn Connection,
        device: &dyn Device,
    ) -> Result<Arc<dyn ActiveConnection>>;
    async fn deactivate_connection(&self, active: &dyn ActiveConnection) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_type_from_raw() {
        assert_eq!(DeviceType::from(1), DeviceType::Ethernet);
        assert_eq!(DeviceType::from(2), DeviceType::Other(2));
    }

    #[test]
    fn default_route_lookup() {
        let config = Ip4Config {
            routes: vec![
                RouteData {
                    dest: "192.168.1.0".into(),
                    prefix: 24,
                    metric: 100,
                    ..Default::default()
                },
                RouteData {
                    dest: "0.0.0.0".into(),
                    prefix: 0,
                    next_hop: "192.168.1.1".into(),
                    metric: 101,
                },
            ],
            ..Default::default()
        };
        assert_eq!(config.default_route().map(|route| route.metric), Some(101));
        assert!(Ip4Config::default().default_route().is_none());
    }
}
