//! Conversions between profile values and D-Bus variants
//!
//! Only the value shapes the profile model knows about are carried over;
//! anything else NetworkManager reports is dropped when reading.

use std::collections::{BTreeMap, HashMap};

use log::trace;
use zbus::zvariant::{Array, OwnedValue, Value};

use edge_network_core::{ConnectionSettings, IpAddressData, RouteData, SettingValue};

use crate::proxy::{OwnedSettingsDict, SettingsDict};

pub fn to_value(value: &SettingValue) -> Value<'_> {
    match value {
        SettingValue::Bool(v) => Value::from(*v),
        SettingValue::I32(v) => Value::from(*v),
        SettingValue::U32(v) => Value::from(*v),
        SettingValue::I64(v) => Value::from(*v),
        SettingValue::U64(v) => Value::from(*v),
        SettingValue::Str(v) => Value::from(v.as_str()),
        SettingValue::Bytes(v) => Value::from(v.clone()),
        SettingValue::StrList(v) => Value::from(v.clone()),
        SettingValue::U32List(v) => Value::from(v.clone()),
        SettingValue::DictList(entries) => Value::from(
            entries
                .iter()
                .map(|entry| {
                    entry
                        .iter()
                        .map(|(key, value)| (key.clone(), to_value(value)))
                        .collect::<HashMap<String, Value<'_>>>()
                })
                .collect::<Vec<_>>(),
        ),
    }
}

pub fn from_value(value: &Value<'_>) -> Option<SettingValue> {
    match value {
        Value::Bool(v) => Some(SettingValue::Bool(*v)),
        Value::I32(v) => Some(SettingValue::I32(*v)),
        Value::U32(v) => Some(SettingValue::U32(*v)),
        Value::I64(v) => Some(SettingValue::I64(*v)),
        Value::U64(v) => Some(SettingValue::U64(*v)),
        Value::Str(v) => Some(SettingValue::Str(v.to_string())),
        Value::Value(inner) => from_value(inner),
        Value::Array(array) => from_array(array),
        _ => None,
    }
}

fn from_array(array: &Array<'_>) -> Option<SettingValue> {
    let items = array.iter();
    match array.element_signature().as_str() {
        "y" => items
            .map(|item| match item {
                Value::U8(b) => Some(*b),
                _ => None,
            })
            .collect::<Option<Vec<u8>>>()
            .map(SettingValue::Bytes),
        "s" => items
            .map(|item| match item {
                Value::Str(s) => Some(s.to_string()),
                _ => None,
            })
            .collect::<Option<Vec<String>>>()
            .map(SettingValue::StrList),
        "u" => items
            .map(|item| match item {
                Value::U32(n) => Some(*n),
                _ => None,
            })
            .collect::<Option<Vec<u32>>>()
            .map(SettingValue::U32List),
        "a{sv}" => items
            .map(dict_entry)
            .collect::<Option<Vec<_>>>()
            .map(SettingValue::DictList),
        other => {
            trace!("Dropping array of '{}'", other);
            None
        }
    }
}

fn dict_entry(item: &Value<'_>) -> Option<BTreeMap<String, SettingValue>> {
    let owned = OwnedValue::try_from(item.try_clone().ok()?).ok()?;
    let map = HashMap::<String, OwnedValue>::try_from(owned).ok()?;
    Some(
        map.iter()
            .filter_map(|(key, value)| from_value(value).map(|v| (key.clone(), v)))
            .collect(),
    )
}

pub fn settings_to_dict(settings: &ConnectionSettings) -> SettingsDict<'_> {
    settings
        .sections()
        .map(|(section, values)| {
            let values = values
                .iter()
                .map(|(key, value)| (key.as_str(), to_value(value)))
                .collect();
            (section.as_str(), values)
        })
        .collect()
}

pub fn settings_from_dict(dict: &OwnedSettingsDict) -> ConnectionSettings {
    let mut settings = ConnectionSettings::new();
    for (section, values) in dict {
        let converted = values
            .iter()
            .filter_map(|(key, value)| from_value(value).map(|v| (key.clone(), v)))
            .collect();
        settings.insert_section(section, converted);
    }
    settings
}

fn str_field(entry: &HashMap<String, OwnedValue>, key: &str) -> String {
    match entry.get(key).map(|v| &**v) {
        Some(Value::Str(s)) => s.to_string(),
        _ => String::new(),
    }
}

fn u32_field(entry: &HashMap<String, OwnedValue>, key: &str) -> u32 {
    match entry.get(key).map(|v| &**v) {
        Some(Value::U32(n)) => *n,
        _ => 0,
    }
}

pub fn address_data(entries: &[HashMap<String, OwnedValue>]) -> Vec<IpAddressData> {
    entries
        .iter()
        .map(|entry| IpAddressData {
            address: str_field(entry, "address"),
            prefix: u32_field(entry, "prefix"),
        })
        .collect()
}

pub fn route_data(entries: &[HashMap<String, OwnedValue>]) -> Vec<RouteData> {
    entries
        .iter()
        .map(|entry| RouteData {
            dest: str_field(entry, "dest"),
            prefix: u32_field(entry, "prefix"),
            next_hop: str_field(entry, "next-hop"),
            metric: u32_field(entry, "metric"),
        })
        .collect()
}

pub fn nameservers(entries: &[HashMap<String, OwnedValue>]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| str_field(entry, "address"))
        .filter(|address| !address.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use edge_network_core::settings::keys;

    fn roundtrip(value: SettingValue) -> Option<SettingValue> {
        from_value(&to_value(&value))
    }

    #[test]
    fn scalar_and_list_values_survive_the_bus() {
        for value in [
            SettingValue::Bool(true),
            SettingValue::I64(-1),
            SettingValue::U64(1_700_000_000),
            SettingValue::Str("eth0".into()),
            SettingValue::Bytes(vec![0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]),
            SettingValue::U32List(vec![134744072, 67372036]),
        ] {
            assert_eq!(roundtrip(value.clone()), Some(value));
        }
    }

    #[test]
    fn address_data_keeps_entries() {
        let mut entry = BTreeMap::new();
        entry.insert(keys::ADDRESS.to_string(), SettingValue::Str("192.168.1.50".into()));
        entry.insert(keys::PREFIX.to_string(), SettingValue::U32(24));
        let value = SettingValue::DictList(vec![entry]);

        assert_eq!(roundtrip(value.clone()), Some(value));
    }

    #[test]
    fn unsupported_values_are_dropped() {
        assert_eq!(from_value(&Value::from(1.5f64)), None);
        assert_eq!(from_value(&Value::from(vec![1.5f64])), None);
    }

    #[test]
    fn settings_map_to_nested_dicts() {
        let mut settings = ConnectionSettings::new();
        settings.set(keys::CONNECTION, keys::ID, "LAN1_dhcp");
        settings.set(keys::IPV4, keys::METHOD, "auto");

        let dict = settings_to_dict(&settings);
        assert_eq!(dict.len(), 2);
        assert_eq!(
            dict[keys::IPV4].get(keys::METHOD).and_then(from_value),
            Some(SettingValue::Str("auto".into()))
        );
    }
}
