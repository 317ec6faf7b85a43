//! IPv4 address codec
//!
//! Conversions between dotted-decimal strings, 32-bit integers in either
//! byte order, and prefix-length / netmask forms. Malformed input never
//! panics: integer parses yield `None`, netmask formatting yields an empty
//! string.

use std::net::Ipv4Addr;

use ipnet::{ipv4_mask_to_prefix, Ipv4Net};

/// Formats a big-endian (network order) integer, e.g. `0x08080808` -> `"8.8.8.8"`.
pub fn ip_from_u32_be(ip: u32) -> String {
    Ipv4Addr::from(ip.to_be_bytes()).to_string()
}

/// Formats a little-endian (host order on x86) integer.
pub fn ip_from_u32_le(ip: u32) -> String {
    Ipv4Addr::from(ip.to_le_bytes()).to_string()
}

pub fn ip_to_u32_be(ip: &str) -> Option<u32> {
    parse_ipv4(ip).map(|addr| u32::from_be_bytes(addr.octets()))
}

/// Little-endian integer form, the encoding NetworkManager uses for `ipv4.dns`.
pub fn ip_to_u32_le(ip: &str) -> Option<u32> {
    parse_ipv4(ip).map(|addr| u32::from_le_bytes(addr.octets()))
}

pub fn parse_ipv4(ip: &str) -> Option<Ipv4Addr> {
    ip.parse().ok()
}

/// Prefix length of a dotted-decimal netmask.
///
/// Returns 0 for a malformed or non-contiguous mask.
pub fn parse_netmask_size(netmask: &str) -> u32 {
    parse_ipv4(netmask)
        .and_then(|mask| ipv4_mask_to_prefix(mask).ok())
        .map(u32::from)
        .unwrap_or(0)
}

/// Dotted-decimal netmask for a prefix length, or `""` when above 32.
pub fn parse_netmask(prefix: u32) -> String {
    u8::try_from(prefix)
        .ok()
        .and_then(|prefix| Ipv4Net::new(Ipv4Addr::UNSPECIFIED, prefix).ok())
        .map(|net| net.netmask().to_string())
        .unwrap_or_default()
}

/// Number of addresses covered by a prefix (`2^(32 - prefix)`).
pub fn prefix_range(prefix: u32) -> Option<u64> {
    if prefix > 32 {
        return None;
    }
    Some(1u64 << (32 - prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn netmask_conversions() {
        assert_eq!(parse_netmask_size("255.255.255.0"), 24);
        assert_eq!(parse_netmask(24), "255.255.255.0");
        assert_eq!(parse_netmask(33), "");
        assert_eq!(parse_netmask(u32::MAX), "");
        assert_eq!(parse_netmask(0), "0.0.0.0");
        assert_eq!(parse_netmask(32), "255.255.255.255");
    }

    #[test]
    fn malformed_netmask_is_zero() {
        assert_eq!(parse_netmask_size("255.0.255.0"), 0);
        assert_eq!(parse_netmask_size("not-a-mask"), 0);
        assert_eq!(parse_netmask_size(""), 0);
    }

    #[test]
    fn prefix_round_trip() {
        for prefix in 0..=32 {
            assert_eq!(parse_netmask_size(&parse_netmask(prefix)), prefix);
        }
    }

    #[test]
    fn integer_byte_orders() {
        assert_eq!(ip_to_u32_be("8.8.4.4"), Some(0x0808_0404));
        assert_eq!(ip_to_u32_le("8.8.4.4"), Some(0x0404_0808));
        assert_eq!(ip_from_u32_be(0xC0A8_0101), "192.168.1.1");
        assert_eq!(ip_from_u32_le(0x0101_A8C0), "192.168.1.1");
        assert_eq!(ip_to_u32_le("300.1.1.1"), None);
        assert_eq!(ip_to_u32_be("::1"), None);
    }

    #[test]
    fn padded_literals_do_not_parse() {
        assert_eq!(parse_ipv4(" 192.168.1.50"), None);
        assert_eq!(parse_ipv4("192.168.1.1 "), None);
        assert_eq!(parse_netmask_size(" 255.255.255.0"), 0);
    }

    #[test]
    fn integer_round_trip() {
        for ip in ["0.0.0.0", "10.0.0.1", "172.16.254.3", "255.255.255.255"] {
            assert_eq!(ip_from_u32_be(ip_to_u32_be(ip).unwrap()), ip);
            assert_eq!(ip_from_u32_le(ip_to_u32_le(ip).unwrap()), ip);
        }
    }

    #[test]
    fn range_from_prefix() {
        assert_eq!(prefix_range(28), Some(16));
        assert_eq!(prefix_range(32), Some(1));
        assert_eq!(prefix_range(0), Some(1 << 32));
        assert_eq!(prefix_range(40), None);
    }
}
