//! Address literal checks

use edge_network_core::addr::parse_ipv4;
use edge_shared_types::{DnsConf, StaticConf};
use mac_address::MacAddress;

/// Stateless syntax checks; each returns the messages for the violations it
/// found.
pub struct SyntaxValidator;

impl SyntaxValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn is_valid_mac(&self, mac: &str) -> bool {
        mac.parse::<MacAddress>().is_ok()
    }

    /// Empty fields are allowed; only present values must parse.
    pub fn validate_static(&self, conf: &StaticConf) -> Vec<String> {
        let mut errors = Vec::new();
        check_ipv4(&conf.ipv4, "wrong ip address", &mut errors);
        check_ipv4(&conf.gateway, "wrong gateway address", &mut errors);
        check_ipv4(&conf.netmask, "wrong netmask address", &mut errors);
        errors
    }

    pub fn validate_dns(&self, conf: &DnsConf) -> Vec<String> {
        let mut errors = Vec::new();
        check_ipv4(&conf.primary, "wrong dns address", &mut errors);
        check_ipv4(&conf.secondary, "wrong dns address", &mut errors);
        errors
    }
}

impl Default for SyntaxValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn check_ipv4(value: &str, message: &str, errors: &mut Vec<String>) {
    if !value.is_empty() && parse_ipv4(value).is_none() {
        errors.push(format!("{} {}", message, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_block_messages() {
        let validator = SyntaxValidator::new();
        let errors = validator.validate_static(&StaticConf::new("192.168.1.300", "255.255.255.0", "gw"));
        assert_eq!(
            errors,
            vec!["wrong ip address 192.168.1.300", "wrong gateway address gw"]
        );
    }

    #[test]
    fn empty_fields_pass() {
        let validator = SyntaxValidator::new();
        assert!(validator.validate_static(&StaticConf::default()).is_empty());
        assert!(validator.validate_dns(&DnsConf::default()).is_empty());
    }

    #[test]
    fn dns_entries_checked_independently() {
        let validator = SyntaxValidator::new();
        let errors = validator.validate_dns(&DnsConf::new("8.8.8", "2001:db8::1"));
        assert_eq!(
            errors,
            vec!["wrong dns address 8.8.8", "wrong dns address 2001:db8::1"]
        );
    }

    #[test]
    fn mac_syntax() {
        let validator = SyntaxValidator::new();
        assert!(validator.is_valid_mac("aa:bb:cc:dd:ee:ff"));
        assert!(!validator.is_valid_mac("aa:bb:cc:dd:ee"));
        assert!(!validator.is_valid_mac(""));
    }
}
