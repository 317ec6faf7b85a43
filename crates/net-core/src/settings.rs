//! Native connection profile model
//!
//! A profile is a two-level map (`section -> key -> value`) mirroring the
//! `a{sa{sv}}` dictionaries NetworkManager stores. Only the value shapes the
//! engine reads or writes are modelled; adapters drop anything else.

use std::collections::BTreeMap;
use std::fmt;

use mac_address::MacAddress;

/// Section and key names of the profile dictionary.
pub mod keys {
    pub const CONNECTION: &str = "connection";
    pub const IPV4: &str = "ipv4";
    pub const IPV6: &str = "ipv6";
    pub const ETHERNET: &str = "802-3-ethernet";

    pub const ID: &str = "id";
    pub const UUID: &str = "uuid";
    pub const TYPE: &str = "type";
    pub const INTERFACE_NAME: &str = "interface-name";
    pub const TIMESTAMP: &str = "timestamp";

    pub const METHOD: &str = "method";
    pub const GATEWAY: &str = "gateway";
    pub const ADDRESS_DATA: &str = "address-data";
    pub const ADDRESSES: &str = "addresses";
    pub const ROUTES: &str = "routes";
    pub const ROUTE_DATA: &str = "route-data";
    pub const ADDRESS: &str = "address";
    pub const PREFIX: &str = "prefix";
    pub const DNS: &str = "dns";
    pub const IGNORE_AUTO_DNS: &str = "ignore-auto-dns";
    pub const ROUTE_METRIC: &str = "route-metric";

    pub const MAC_ADDRESS: &str = "mac-address";
}

/// `ipv4.method` values
pub const METHOD_AUTO: &str = "auto";
pub const METHOD_MANUAL: &str = "manual";

/// Route metric marking the interface that should own the default route.
pub const ROUTE_METRIC_PREFERRED: i64 = 1;
/// Route metric of every other interface once a gateway has been promoted.
pub const ROUTE_METRIC_DEMOTED: i64 = -1;

/// A single profile value.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Bool(bool),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    Str(String),
    Bytes(Vec<u8>),
    StrList(Vec<String>),
    U32List(Vec<u32>),
    DictList(Vec<BTreeMap<String, SettingValue>>),
}

impl SettingValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            SettingValue::Bytes(value) => Some(value),
            _ => None,
        }
    }

    /// Integer view regardless of the width the backend reported.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SettingValue::I32(value) => Some(i64::from(*value)),
            SettingValue::U32(value) => Some(i64::from(*value)),
            SettingValue::I64(value) => Some(*value),
            SettingValue::U64(value) => i64::try_from(*value).ok(),
            _ => None,
        }
    }

    pub fn as_u32_list(&self) -> Option<&[u32]> {
        match self {
            SettingValue::U32List(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_dict_list(&self) -> Option<&[BTreeMap<String, SettingValue>]> {
        match self {
            SettingValue::DictList(value) => Some(value),
            _ => None,
        }
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Str(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Str(value)
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<Vec<u8>> for SettingValue {
    fn from(value: Vec<u8>) -> Self {
        SettingValue::Bytes(value)
    }
}

/// One connection profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionSettings {
    sections: BTreeMap<String, BTreeMap<String, SettingValue>>,
}

impl ConnectionSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&SettingValue> {
        self.sections.get(section).and_then(|values| values.get(key))
    }

    pub fn get_str(&self, section: &str, key: &str) -> Option<&str> {
        self.get(section, key).and_then(SettingValue::as_str)
    }

    pub fn set(&mut self, section: &str, key: &str, value: impl Into<SettingValue>) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, section: &str, key: &str) -> Option<SettingValue> {
        self.sections
            .get_mut(section)
            .and_then(|values| values.remove(key))
    }

    pub fn section(&self, section: &str) -> Option<&BTreeMap<String, SettingValue>> {
        self.sections.get(section)
    }

    /// Replaces a whole section, creating it when missing.
    pub fn insert_section(&mut self, section: &str, values: BTreeMap<String, SettingValue>) {
        self.sections.insert(section.to_string(), values);
    }

    /// Makes sure a section exists even if it ends up empty.
    pub fn ensure_section(&mut self, section: &str) {
        self.sections.entry(section.to_string()).or_default();
    }

    pub fn sections(&self) -> impl Iterator<Item = (&String, &BTreeMap<String, SettingValue>)> {
        self.sections.iter()
    }

    pub fn id(&self) -> Option<&str> {
        self.get_str(keys::CONNECTION, keys::ID)
    }

    pub fn uuid(&self) -> Option<&str> {
        self.get_str(keys::CONNECTION, keys::UUID)
    }

    pub fn connection_type(&self) -> Option<&str> {
        self.get_str(keys::CONNECTION, keys::TYPE)
    }

    pub fn interface_name(&self) -> Option<&str> {
        self.get_str(keys::CONNECTION, keys::INTERFACE_NAME)
    }

    pub fn is_ethernet(&self) -> bool {
        self.connection_type() == Some(keys::ETHERNET)
    }

    pub fn ipv4_method(&self) -> Option<&str> {
        self.get_str(keys::IPV4, keys::METHOD)
    }

    pub fn route_metric(&self) -> Option<i64> {
        self.get(keys::IPV4, keys::ROUTE_METRIC)
            .and_then(SettingValue::as_i64)
    }

    /// Raw `802-3-ethernet.mac-address` bytes; `None` when absent or empty.
    pub fn mac_bytes(&self) -> Option<&[u8]> {
        self.get(keys::ETHERNET, keys::MAC_ADDRESS)
            .and_then(SettingValue::as_bytes)
            .filter(|bytes| !bytes.is_empty())
    }

    /// Stored link-layer address formatted as uppercase colon-separated hex.
    pub fn mac_address(&self) -> Option<String> {
        self.mac_bytes().map(format_mac)
    }

    pub fn set_mac_address(&mut self, mac: &MacAddress) {
        self.set(keys::ETHERNET, keys::MAC_ADDRESS, mac.bytes().to_vec());
    }
}

/// Uppercase colon hex, e.g. `AA:BB:CC:00:11:22`.
pub fn format_mac(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| format!("{:02X}", byte))
        .collect::<Vec<_>>()
        .join(":")
}

impl fmt::Display for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {})",
            self.id().unwrap_or("<unnamed>"),
            self.interface_name().unwrap_or("-"),
            self.ipv4_method().unwrap_or("-")
        )
    }
}
