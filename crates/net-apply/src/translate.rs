//! Translation between the wire interface model and connection profiles

use std::collections::BTreeMap;

use chrono::Utc;
use log::warn;
use mac_address::MacAddress;
use uuid::Uuid;

use edge_network_core::addr::{ip_to_u32_le, parse_netmask, parse_netmask_size};
use edge_network_core::settings::{keys, METHOD_AUTO, METHOD_MANUAL, ROUTE_METRIC_PREFERRED};
use edge_network_core::{ConnectionSettings, Ip4Config, SettingValue};
use edge_shared_types::{DhcpMode, DnsConf, Interface, StaticConf};

const SUFFIX_DHCP: &str = "dhcp";
const SUFFIX_STATIC: &str = "static";

/// Seconds since the epoch, 0 if the clock is before it.
pub fn unix_timestamp() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or_default()
}

/// Builds a fresh profile for `device_name` from a desired interface state.
///
/// An unparsable MAC leaves `802-3-ethernet.mac-address` empty instead of
/// failing; the profile is still usable through `interface-name`.
pub fn to_profile(desired: &Interface, device_name: &str) -> ConnectionSettings {
    let mut settings = ConnectionSettings::new();
    settings.ensure_section(keys::CONNECTION);
    settings.ensure_section(keys::IPV4);
    settings.ensure_section(keys::ETHERNET);

    if desired.gateway_interface {
        settings.set(
            keys::IPV4,
            keys::ROUTE_METRIC,
            SettingValue::I64(ROUTE_METRIC_PREFERRED),
        );
    }

    let suffix = match desired.dhcp {
        DhcpMode::Enabled => {
            settings.set(keys::IPV4, keys::METHOD, METHOD_AUTO);
            SUFFIX_DHCP
        }
        DhcpMode::Disabled => {
            let conf = desired.static_conf.clone().unwrap_or_default();
            settings.set(keys::IPV4, keys::METHOD, METHOD_MANUAL);
            if !conf.gateway.is_empty() {
                settings.set(keys::IPV4, keys::GATEWAY, conf.gateway.as_str());
            }
            settings.set(keys::IPV4, keys::ADDRESS_DATA, address_data(&conf));
            SUFFIX_STATIC
        }
    };

    if let Some(dns) = &desired.dns {
        if let Some(servers) = dns_list(dns) {
            settings.set(keys::IPV4, keys::DNS, SettingValue::U32List(servers));
            if desired.is_dhcp() {
                settings.set(keys::IPV4, keys::IGNORE_AUTO_DNS, true);
            }
        }
    }

    let name = if desired.label.is_empty() {
        &desired.mac_address
    } else {
        &desired.label
    };
    settings.set(keys::CONNECTION, keys::ID, format!("{}_{}", name, suffix));
    settings.set(keys::CONNECTION, keys::UUID, Uuid::new_v4().to_string());
    settings.set(
        keys::CONNECTION,
        keys::TIMESTAMP,
        SettingValue::U64(unix_timestamp()),
    );
    settings.set(keys::CONNECTION, keys::TYPE, keys::ETHERNET);
    settings.set(keys::CONNECTION, keys::INTERFACE_NAME, device_name);

    match desired.mac_address.parse::<MacAddress>() {
        Ok(mac) => settings.set_mac_address(&mac),
        Err(e) => {
            warn!(
                "Cannot parse mac address '{}' for {}: {}; link-layer address left empty",
                desired.mac_address, device_name, e
            );
            settings.set(keys::ETHERNET, keys::MAC_ADDRESS, Vec::<u8>::new());
        }
    }

    settings
}

fn address_data(conf: &StaticConf) -> SettingValue {
    let prefix = parse_netmask_size(&conf.netmask);
    if prefix == 0 && !conf.netmask.is_empty() && conf.netmask != "0.0.0.0" {
        warn!("Netmask {} is not a valid prefix, using /0", conf.netmask);
    }

    let mut entry = BTreeMap::new();
    entry.insert(keys::ADDRESS.to_string(), SettingValue::Str(conf.ipv4.clone()));
    entry.insert(keys::PREFIX.to_string(), SettingValue::U32(prefix));
    SettingValue::DictList(vec![entry])
}

/// `[primary]` or `[primary, secondary]` in little-endian integer form.
/// A secondary without a primary is dropped.
fn dns_list(dns: &DnsConf) -> Option<Vec<u32>> {
    if dns.primary.is_empty() {
        return None;
    }
    let mut servers = Vec::with_capacity(2);
    for server in [&dns.primary, &dns.secondary] {
        if server.is_empty() {
            continue;
        }
        match ip_to_u32_le(server) {
            Some(value) => servers.push(value),
            None => warn!("Ignoring invalid dns server {}", server),
        }
    }
    (!servers.is_empty()).then_some(servers)
}

/// Reports a stored profile (plus the live IPv4 state, when active) as an
/// interface. `mac` is the device hardware address.
pub fn to_interface(settings: &ConnectionSettings, ip4: Option<&Ip4Config>, mac: &str) -> Interface {
    let mut iface = Interface {
        mac_address: mac.to_uppercase(),
        ..Default::default()
    };

    if settings.ipv4_method() == Some(METHOD_AUTO) {
        iface.dhcp = DhcpMode::Enabled;
        iface.static_conf = Some(static_from_lease(ip4));
    } else {
        iface.dhcp = DhcpMode::Disabled;
        iface.static_conf = Some(static_from_profile(settings));
    }

    iface.gateway_interface = settings.route_metric() == Some(ROUTE_METRIC_PREFERRED);

    if let Some(config) = ip4 {
        iface.dns = Some(compact_dns(&config.nameservers));
    }

    iface
}

fn static_from_lease(ip4: Option<&Ip4Config>) -> StaticConf {
    let mut conf = StaticConf::default();
    if let Some(config) = ip4 {
        if let Some(address) = config.addresses.first() {
            conf.ipv4 = address.address.clone();
            conf.netmask = parse_netmask(address.prefix);
        }
        conf.gateway = config.gateway.clone();
    }
    conf
}

fn static_from_profile(settings: &ConnectionSettings) -> StaticConf {
    let mut conf = StaticConf::default();
    let first = settings
        .get(keys::IPV4, keys::ADDRESS_DATA)
        .and_then(SettingValue::as_dict_list)
        .and_then(|entries| entries.first());

    if let Some(entry) = first {
        if let Some(address) = entry.get(keys::ADDRESS).and_then(SettingValue::as_str) {
            conf.ipv4 = address.to_string();
        }
        if let Some(prefix) = entry
            .get(keys::PREFIX)
            .and_then(SettingValue::as_i64)
            .and_then(|prefix| u32::try_from(prefix).ok())
        {
            conf.netmask = parse_netmask(prefix);
        }
        if let Some(gateway) = settings.get_str(keys::IPV4, keys::GATEWAY) {
            conf.gateway = gateway.to_string();
        }
    }
    conf
}

/// First two non-empty entries, in order.
fn compact_dns(nameservers: &[String]) -> DnsConf {
    let mut servers = nameservers.iter().filter(|server| !server.is_empty());
    DnsConf {
        primary: servers.next().cloned().unwrap_or_default(),
        secondary: servers.next().cloned().unwrap_or_default(),
    }
}
