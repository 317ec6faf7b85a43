use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{SharedResult, SharedTypeError};

/// Batch of desired interface states; order is apply order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkSettings {
    #[serde(rename = "Interfaces", default)]
    pub interfaces: Vec<Interface>,
}

impl NetworkSettings {
    pub fn new(interfaces: Vec<Interface>) -> Self {
        Self { interfaces }
    }

    pub fn from_json(input: &str) -> SharedResult<Self> {
        Ok(serde_json::from_str(input)?)
    }
}

/// Desired or observed state of one ethernet interface.
///
/// `mac_address` and `label` use the empty string for "not set", which is
/// how they travel on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    #[serde(rename = "GatewayInterface", default)]
    pub gateway_interface: bool,
    #[serde(rename = "MacAddress", default, skip_serializing_if = "String::is_empty")]
    pub mac_address: String,
    #[serde(rename = "DHCP", default)]
    pub dhcp: DhcpMode,
    #[serde(rename = "Static", default, skip_serializing_if = "Option::is_none")]
    pub static_conf: Option<StaticConf>,
    #[serde(rename = "DNSConfig", default, skip_serializing_if = "Option::is_none")]
    pub dns: Option<DnsConf>,
    #[serde(rename = "L2Conf", default, skip_serializing_if = "Option::is_none")]
    pub l2: Option<L2Conf>,
    #[serde(rename = "InterfaceName", default, skip_serializing_if = "String::is_empty")]
    pub interface_name: String,
    #[serde(rename = "Label", default, skip_serializing_if = "String::is_empty")]
    pub label: String,
}

/// How a mutation request identifies its device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target<'a> {
    Mac(&'a str),
    Label(&'a str),
}

impl Interface {
    /// MAC wins over label when both are present.
    pub fn target(&self) -> Option<Target<'_>> {
        if !self.mac_address.is_empty() {
            Some(Target::Mac(&self.mac_address))
        } else if !self.label.is_empty() {
            Some(Target::Label(&self.label))
        } else {
            None
        }
    }

    pub fn is_dhcp(&self) -> bool {
        self.dhcp == DhcpMode::Enabled
    }
}

impl fmt::Display for Target<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Mac(mac) => write!(f, "mac {}", mac),
            Target::Label(label) => write!(f, "label {}", label),
        }
    }
}

/// DHCP mode as carried on the wire (`"enabled"` / `"disabled"`).
///
/// Anything other than `"enabled"` decodes as disabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DhcpMode {
    Enabled,
    #[default]
    Disabled,
}

impl DhcpMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DhcpMode::Enabled => "enabled",
            DhcpMode::Disabled => "disabled",
        }
    }
}

impl From<String> for DhcpMode {
    fn from(value: String) -> Self {
        if value == "enabled" {
            DhcpMode::Enabled
        } else {
            DhcpMode::Disabled
        }
    }
}

impl From<DhcpMode> for String {
    fn from(mode: DhcpMode) -> Self {
        mode.as_str().to_string()
    }
}

impl FromStr for DhcpMode {
    type Err = SharedTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enabled" => Ok(DhcpMode::Enabled),
            "disabled" => Ok(DhcpMode::Disabled),
            other => Err(SharedTypeError::InvalidValue {
                field: "DHCP",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for DhcpMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static IPv4 block, all dotted-decimal strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticConf {
    #[serde(rename = "IPv4", default, skip_serializing_if = "String::is_empty")]
    pub ipv4: String,
    #[serde(rename = "NetMask", default, skip_serializing_if = "String::is_empty")]
    pub netmask: String,
    #[serde(rename = "Gateway", default, skip_serializing_if = "String::is_empty")]
    pub gateway: String,
}

impl StaticConf {
    pub fn new(ipv4: impl Into<String>, netmask: impl Into<String>, gateway: impl Into<String>) -> Self {
        Self {
            ipv4: ipv4.into(),
            netmask: netmask.into(),
            gateway: gateway.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsConf {
    #[serde(rename = "PrimaryDNS", default, skip_serializing_if = "String::is_empty")]
    pub primary: String,
    #[serde(rename = "SecondaryDNS", default, skip_serializing_if = "String::is_empty")]
    pub secondary: String,
}

impl DnsConf {
    pub fn new(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
        }
    }
}

/// Macvlan reservation shared with the container platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct L2Conf {
    #[serde(rename = "StartingAddressIPv4", default, skip_serializing_if = "String::is_empty")]
    pub starting_address: String,
    #[serde(rename = "NetMask", default, skip_serializing_if = "String::is_empty")]
    pub netmask: String,
    #[serde(rename = "Range", default, skip_serializing_if = "String::is_empty")]
    pub range: String,
    #[serde(rename = "Gateway", default, skip_serializing_if = "String::is_empty")]
    pub gateway: String,
    #[serde(rename = "AuxiliaryAddresses", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub auxiliary_addresses: BTreeMap<String, String>,
}

impl L2Conf {
    pub fn is_empty(&self) -> bool {
        *self == L2Conf::default()
    }
}
