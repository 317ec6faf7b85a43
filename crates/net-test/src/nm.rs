//! In-memory network manager
//!
//! Keeps devices, stored profiles and active connections in one shared
//! state. Activating a profile synthesises the live IPv4 configuration the
//! way NetworkManager would report it: manual profiles expose their own
//! address, automatic ones a per-device lease, and a default route whose
//! metric follows `ipv4.route-metric` (100 + device index when unset or -1).

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use log::debug;

use edge_network_core::addr::ip_from_u32_le;
use edge_network_core::settings::{keys, METHOD_AUTO};
use edge_network_core::{
    ActiveConnection, Connection, ConnectionSettings, Device, DeviceType, Ip4Config,
    IpAddressData, NetworkError, NetworkManager, Result, RouteData, SettingValue,
};

const ETHERNET: u32 = 1;

/// Adapter operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Devices,
    Settings,
    AddConnection,
    Activate,
    Deactivate,
    Update,
    Delete,
}

#[derive(Debug, Clone)]
struct DeviceState {
    path: String,
    interface: String,
    hw_address: String,
    perm_hw_address: String,
    device_type: u32,
    active: Option<u64>,
    lease: Option<Ip4Config>,
}

#[derive(Debug, Clone)]
struct ActiveState {
    connection: u64,
    device: usize,
    ip4: Option<Ip4Config>,
}

#[derive(Default)]
struct State {
    devices: Vec<DeviceState>,
    connections: BTreeMap<u64, ConnectionSettings>,
    actives: BTreeMap<u64, ActiveState>,
    next_id: u64,
    failures: Vec<(Op, Option<String>)>,
    calls: Vec<String>,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn check(&self, op: Op, interface: Option<&str>) -> Result<()> {
        let injected = self.failures.iter().any(|(failing, target)| {
            *failing == op
                && match (target, interface) {
                    (None, _) => true,
                    (Some(target), Some(interface)) => target == interface,
                    (Some(_), None) => false,
                }
        });
        if injected {
            return Err(NetworkError::adapter(format!("{:?}", op), "injected failure"));
        }
        Ok(())
    }

    fn device_index(&self, path: &str) -> Result<usize> {
        self.devices
            .iter()
            .position(|device| device.path == path)
            .ok_or_else(|| NetworkError::adapter("Device", format!("unknown device {}", path)))
    }

    fn connection(&self, id: u64) -> Result<&ConnectionSettings> {
        self.connections
            .get(&id)
            .ok_or_else(|| NetworkError::adapter("Connection", format!("no such connection {}", id)))
    }

    fn drop_active(&mut self, active: u64) {
        if let Some(state) = self.actives.remove(&active) {
            if let Some(device) = self.devices.get_mut(state.device) {
                if device.active == Some(active) {
                    device.active = None;
                }
            }
        }
    }

    fn activate(&mut self, connection: u64, device: usize) -> Result<u64> {
        let settings = self.connection(connection)?.clone();
        if let Some(previous) = self.devices[device].active {
            self.drop_active(previous);
        }
        let ip4 = live_config(&settings, &self.devices[device], device);
        let id = self.next_id();
        self.actives.insert(
            id,
            ActiveState {
                connection,
                device,
                ip4: Some(ip4),
            },
        );
        self.devices[device].active = Some(id);
        Ok(id)
    }
}

fn live_config(settings: &ConnectionSettings, device: &DeviceState, index: usize) -> Ip4Config {
    let metric = match settings.route_metric() {
        Some(metric) if metric >= 0 => metric as u32,
        _ => 100 + index as u32,
    };

    let mut config = if settings.ipv4_method() == Some(METHOD_AUTO) {
        device.lease.clone().unwrap_or_else(|| Ip4Config {
            addresses: vec![IpAddressData {
                address: format!("10.0.{}.100", index),
                prefix: 24,
            }],
            gateway: format!("10.0.{}.1", index),
            ..Default::default()
        })
    } else {
        let addresses = settings
            .get(keys::IPV4, keys::ADDRESS_DATA)
            .and_then(SettingValue::as_dict_list)
            .unwrap_or_default()
            .iter()
            .map(|entry| IpAddressData {
                address: entry
                    .get(keys::ADDRESS)
                    .and_then(SettingValue::as_str)
                    .unwrap_or_default()
                    .to_string(),
                prefix: entry
                    .get(keys::PREFIX)
                    .and_then(SettingValue::as_i64)
                    .unwrap_or_default() as u32,
            })
            .collect();
        Ip4Config {
            addresses,
            gateway: settings
                .get_str(keys::IPV4, keys::GATEWAY)
                .unwrap_or_default()
                .to_string(),
            ..Default::default()
        }
    };

    if let Some(dns) = settings
        .get(keys::IPV4, keys::DNS)
        .and_then(SettingValue::as_u32_list)
    {
        config.nameservers = dns.iter().map(|ip| ip_from_u32_le(*ip)).collect();
    }

    config.routes.retain(|route| !route.is_default());
    if !config.gateway.is_empty() {
        config.routes.push(RouteData {
            dest: "0.0.0.0".to_string(),
            prefix: 0,
            next_hop: config.gateway.clone(),
            metric,
        });
    }
    config
}

/// Shared-state fake; clones observe the same devices and profiles.
#[derive(Clone, Default)]
pub struct FakeNetworkManager {
    state: Arc<Mutex<State>>,
}

impl FakeNetworkManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Adds a wired device and returns its object path.
    pub fn add_device(&self, interface: &str, mac: &str) -> String {
        self.add_device_with_type(interface, mac, ETHERNET)
    }

    pub fn add_device_with_type(&self, interface: &str, mac: &str, device_type: u32) -> String {
        let mut state = self.lock();
        let path = format!("/org/freedesktop/NetworkManager/Devices/{}", state.devices.len() + 1);
        state.devices.push(DeviceState {
            path: path.clone(),
            interface: interface.to_string(),
            hw_address: mac.to_string(),
            perm_hw_address: mac.to_string(),
            device_type,
            active: None,
            lease: None,
        });
        path
    }

    pub fn set_perm_hw_address(&self, interface: &str, mac: &str) {
        let mut state = self.lock();
        if let Some(device) = state.devices.iter_mut().find(|d| d.interface == interface) {
            device.perm_hw_address = mac.to_string();
        }
    }

    /// Lease handed out when an automatic profile is activated on `interface`.
    pub fn set_dhcp_lease(&self, interface: &str, lease: Ip4Config) {
        let mut state = self.lock();
        if let Some(device) = state.devices.iter_mut().find(|d| d.interface == interface) {
            device.lease = Some(lease);
        }
    }

    /// Stores a profile without going through the adapter surface.
    pub fn insert_connection(&self, settings: ConnectionSettings) -> u64 {
        let mut state = self.lock();
        let id = state.next_id();
        state.connections.insert(id, settings);
        id
    }

    /// Activates a stored profile on the named device.
    pub fn activate_stored(&self, connection: u64, interface: &str) {
        let mut state = self.lock();
        if let Some(index) = state.devices.iter().position(|d| d.interface == interface) {
            let _ = state.activate(connection, index);
        }
    }

    /// Overrides the live IPv4 snapshot of a device's active connection.
    pub fn set_live_config(&self, interface: &str, config: Option<Ip4Config>) {
        let mut state = self.lock();
        let active = state
            .devices
            .iter()
            .find(|d| d.interface == interface)
            .and_then(|d| d.active);
        if let Some(active) = active.and_then(|id| state.actives.get_mut(&id)) {
            active.ip4 = config;
        }
    }

    /// Fails every `op` touching `interface`, or every `op` when `None`.
    /// Adding a profile also matches the target against the profile id.
    pub fn fail(&self, op: Op, interface: Option<&str>) {
        self.lock()
            .failures
            .push((op, interface.map(str::to_string)));
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    /// Stored profiles bound to `interface`, oldest first.
    pub fn profiles_for(&self, interface: &str) -> Vec<ConnectionSettings> {
        self.lock()
            .connections
            .values()
            .filter(|settings| settings.interface_name() == Some(interface))
            .cloned()
            .collect()
    }

    pub fn profile_count(&self) -> usize {
        self.lock().connections.len()
    }

    /// Profile currently active on `interface`.
    pub fn active_profile(&self, interface: &str) -> Option<ConnectionSettings> {
        let state = self.lock();
        let device = state.devices.iter().find(|d| d.interface == interface)?;
        let active = state.actives.get(&device.active?)?;
        state.connections.get(&active.connection).cloned()
    }

    pub fn live_config(&self, interface: &str) -> Option<Ip4Config> {
        let state = self.lock();
        let device = state.devices.iter().find(|d| d.interface == interface)?;
        state.actives.get(&device.active?)?.ip4.clone()
    }

    /// Adapter calls in the order they were made.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    fn record(&self, call: String) {
        debug!("fake nm: {}", call);
        self.lock().calls.push(call);
    }

    fn device_handle(&self, index: usize) -> Option<Arc<dyn Device>> {
        let path = self.lock().devices.get(index)?.path.clone();
        Some(Arc::new(FakeDevice {
            nm: self.clone(),
            index,
            path,
        }))
    }

    fn connection_handle(&self, id: u64) -> Arc<dyn Connection> {
        Arc::new(FakeConnection {
            nm: self.clone(),
            id,
            path: connection_path(id),
        })
    }

    fn active_handle(&self, id: u64) -> Arc<dyn ActiveConnection> {
        Arc::new(FakeActiveConnection {
            nm: self.clone(),
            id,
            path: format!("/org/freedesktop/NetworkManager/ActiveConnection/{}", id),
        })
    }
}

fn connection_path(id: u64) -> String {
    format!("/org/freedesktop/NetworkManager/Settings/{}", id)
}

fn trailing_id(path: &str) -> Result<u64> {
    path.rsplit('/')
        .next()
        .and_then(|id| id.parse().ok())
        .ok_or_else(|| NetworkError::adapter("Lookup", format!("bad object path {}", path)))
}

#[async_trait]
impl NetworkManager for FakeNetworkManager {
    async fn devices(&self) -> Result<Vec<Arc<dyn Device>>> {
        let count = {
            let state = self.lock();
            state.check(Op::Devices, None)?;
            state.devices.len()
        };
        Ok((0..count).filter_map(|index| self.device_handle(index)).collect())
    }

    async fn connections(&self) -> Result<Vec<Arc<dyn Connection>>> {
        let ids: Vec<u64> = self.lock().connections.keys().copied().collect();
        Ok(ids.into_iter().map(|id| self.connection_handle(id)).collect())
    }

    async fn add_connection(&self, settings: &ConnectionSettings) -> Result<Arc<dyn Connection>> {
        self.record(format!("add {}", settings.id().unwrap_or_default()));
        let id = {
            let mut state = self.lock();
            state.check(Op::AddConnection, settings.interface_name())?;
            state.check(Op::AddConnection, settings.id())?;
            let id = state.next_id();
            state.connections.insert(id, settings.clone());
            id
        };
        Ok(self.connection_handle(id))
    }

    async fn activate_connection(
        &self,
        connection: &dyn Connection,
        device: &dyn Device,
    ) -> Result<Arc<dyn ActiveConnection>> {
        let connection_id = trailing_id(connection.path())?;
        let active = {
            let mut state = self.lock();
            let index = state.device_index(device.path())?;
            let interface = state.devices[index].interface.clone();
            state.calls.push(format!("activate {}", interface));
            state.check(Op::Activate, Some(&interface))?;
            state.activate(connection_id, index)?
        };
        Ok(self.active_handle(active))
    }

    async fn deactivate_connection(&self, active: &dyn ActiveConnection) -> Result<()> {
        let id = trailing_id(active.path())?;
        let mut state = self.lock();
        let interface = state
            .actives
            .get(&id)
            .and_then(|a| state.devices.get(a.device))
            .map(|d| d.interface.clone())
            .ok_or_else(|| NetworkError::adapter("Deactivate", "connection not active"))?;
        state.calls.push(format!("deactivate {}", interface));
        state.check(Op::Deactivate, Some(&interface))?;
        state.drop_active(id);
        Ok(())
    }
}

struct FakeDevice {
    nm: FakeNetworkManager,
    index: usize,
    path: String,
}

impl FakeDevice {
    fn read<T>(&self, f: impl FnOnce(&DeviceState) -> T) -> Result<T> {
        let state = self.nm.lock();
        state
            .devices
            .get(self.index)
            .map(f)
            .ok_or_else(|| NetworkError::adapter("Device", "device vanished"))
    }
}

#[async_trait]
impl Device for FakeDevice {
    fn path(&self) -> &str {
        &self.path
    }

    async fn device_type(&self) -> Result<DeviceType> {
        self.read(|d| DeviceType::from(d.device_type))
    }

    async fn hw_address(&self) -> Result<String> {
        self.read(|d| d.hw_address.clone())
    }

    async fn perm_hw_address(&self) -> Result<String> {
        self.read(|d| d.perm_hw_address.clone())
    }

    async fn interface(&self) -> Result<String> {
        self.read(|d| d.interface.clone())
    }

    async fn active_connection(&self) -> Result<Option<Arc<dyn ActiveConnection>>> {
        let active = self.read(|d| d.active)?;
        Ok(active.map(|id| self.nm.active_handle(id)))
    }
}

struct FakeConnection {
    nm: FakeNetworkManager,
    id: u64,
    path: String,
}

#[async_trait]
impl Connection for FakeConnection {
    fn path(&self) -> &str {
        &self.path
    }

    async fn settings(&self) -> Result<ConnectionSettings> {
        let state = self.nm.lock();
        let settings = state.connection(self.id)?;
        state.check(Op::Settings, settings.interface_name())?;
        Ok(settings.clone())
    }

    async fn update(&self, settings: &ConnectionSettings) -> Result<()> {
        let mut state = self.nm.lock();
        state.calls.push(format!("update {}", settings.id().unwrap_or_default()));
        state.check(Op::Update, settings.interface_name())?;
        let stored = state
            .connections
            .get_mut(&self.id)
            .ok_or_else(|| NetworkError::adapter("Update", "no such connection"))?;
        *stored = settings.clone();
        Ok(())
    }

    async fn delete(&self) -> Result<()> {
        let mut state = self.nm.lock();
        let interface = state.connection(self.id)?.interface_name().map(str::to_string);
        state.calls.push(format!("delete {}", interface.as_deref().unwrap_or_default()));
        state.check(Op::Delete, interface.as_deref())?;
        state.connections.remove(&self.id);
        let orphaned: Vec<u64> = state
            .actives
            .iter()
            .filter(|(_, active)| active.connection == self.id)
            .map(|(id, _)| *id)
            .collect();
        for active in orphaned {
            state.drop_active(active);
        }
        Ok(())
    }
}

struct FakeActiveConnection {
    nm: FakeNetworkManager,
    id: u64,
    path: String,
}

impl FakeActiveConnection {
    fn settings(&self) -> Result<(u64, ConnectionSettings)> {
        let state = self.nm.lock();
        let active = state
            .actives
            .get(&self.id)
            .ok_or_else(|| NetworkError::adapter("ActiveConnection", "connection not active"))?;
        Ok((active.connection, state.connection(active.connection)?.clone()))
    }
}

#[async_trait]
impl ActiveConnection for FakeActiveConnection {
    fn path(&self) -> &str {
        &self.path
    }

    async fn id(&self) -> Result<String> {
        Ok(self.settings()?.1.id().unwrap_or_default().to_string())
    }

    async fn uuid(&self) -> Result<String> {
        Ok(self.settings()?.1.uuid().unwrap_or_default().to_string())
    }

    async fn connection(&self) -> Result<Arc<dyn Connection>> {
        let (id, _) = self.settings()?;
        Ok(self.nm.connection_handle(id))
    }

    async fn ip4_config(&self) -> Result<Option<Ip4Config>> {
        let state = self.nm.lock();
        Ok(state.actives.get(&self.id).and_then(|active| active.ip4.clone()))
    }
}
