//! Address codec: textual IPv4/IPv6 addresses and CIDR literals to trie keys.
//!
//! Keys are plain integers. The value `0` doubles as the invalid-input
//! sentinel, so the all-zero address (`0.0.0.0`, `::`) can never be inserted
//! or matched.
//!
//! IPv6 keys only carry the first two colon-delimited groups: the first group
//! lands in the high 32-bit half of the key, the second in the low half.
//! Everything after the second group is ignored.

use std::fmt;
use std::net::IpAddr;

use crate::error::{FilterError, Result};

const CIDR_SEPARATOR: char = '/';
const OCTET_SEPARATOR: char = '.';
const GROUP_SEPARATOR: char = ':';

const OCTET_COUNT: usize = 4;
const OCTET_BITS: u32 = 8;

// we only key on the first two groups of an ipv6 address
const KEYED_GROUP_COUNT: usize = 2;
const GROUP_SHIFT: u32 = 32;

/// Address family of a key, selected by the presence of `:` in the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    V4,
    V6,
}

impl AddressFamily {
    /// Pick the family for a textual address or CIDR literal.
    pub fn detect(text: &str) -> Self {
        if text.contains(GROUP_SEPARATOR) {
            AddressFamily::V6
        } else {
            AddressFamily::V4
        }
    }

    /// Number of key bits walked on lookup.
    pub const fn bit_width(self) -> u32 {
        match self {
            AddressFamily::V4 => 32,
            AddressFamily::V6 => 64,
        }
    }

    /// Parse an address of this family into its key, `0` if invalid.
    pub fn parse_key(self, text: &str) -> u64 {
        match self {
            AddressFamily::V4 => u64::from(parse_ipv4(text)),
            AddressFamily::V6 => parse_ipv6(text),
        }
    }

    fn try_parse_key(self, text: &str) -> Option<u64> {
        match self {
            AddressFamily::V4 => try_parse_ipv4(text).map(u64::from),
            AddressFamily::V6 => try_parse_ipv6(text),
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::V4 => f.write_str("IPv4"),
            AddressFamily::V6 => f.write_str("IPv6"),
        }
    }
}

/// Split a CIDR literal into `(prefix_length, base_address)`.
///
/// Returns `(0, "")` when there is no `/`. A missing or non-numeric prefix
/// length yields `0`, which callers treat as "not a network".
pub fn split_cidr(text: &str) -> (u32, &str) {
    match text.split_once(CIDR_SEPARATOR) {
        Some((base, prefix)) => (parse_prefix_len(prefix).unwrap_or(0), base),
        None => (0, ""),
    }
}

fn parse_prefix_len(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Parse dotted-quad IPv4 text into a big-endian `u32`, `0` if invalid.
pub fn parse_ipv4(text: &str) -> u32 {
    try_parse_ipv4(text).unwrap_or(0)
}

fn try_parse_ipv4(text: &str) -> Option<u32> {
    let mut key = 0u32;
    let mut octets = 0;

    for part in text.split(OCTET_SEPARATOR) {
        if octets == OCTET_COUNT {
            return None;
        }
        key = (key << OCTET_BITS) | u32::from(parse_octet(part)?);
        octets += 1;
    }

    (octets == OCTET_COUNT).then_some(key)
}

fn parse_octet(part: &str) -> Option<u8> {
    // u8::from_str accepts a leading '+', so check digits first
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Parse IPv6 text into a 64-bit key built from its first two groups, `0` if invalid.
///
/// Empty groups (from `::` compression) count as zero.
pub fn parse_ipv6(text: &str) -> u64 {
    try_parse_ipv6(text).unwrap_or(0)
}

fn try_parse_ipv6(text: &str) -> Option<u64> {
    if text.is_empty() || !is_hex_address(text) {
        return None;
    }
    // a lone leading ':' is malformed; "::" is compression
    if text.starts_with(GROUP_SEPARATOR) && !text.starts_with("::") {
        return None;
    }

    let mut groups = text.split(GROUP_SEPARATOR);
    let mut key = 0u64;
    for _ in 0..KEYED_GROUP_COUNT {
        let group = match groups.next() {
            Some(group) if !group.is_empty() => u16::from_str_radix(group, 16).ok()?,
            _ => 0,
        };
        key = (key << GROUP_SHIFT) | u64::from(group);
    }

    Some(key)
}

fn is_hex_address(text: &str) -> bool {
    text.chars()
        .all(|c| c.is_ascii_hexdigit() || c == GROUP_SEPARATOR)
}

/// Derive the trie key of an already parsed address.
///
/// Uses the same layout as the text codec so that `contains("a.b.c.d")` and
/// `contains_ip(a.b.c.d)` always agree.
pub fn key_from_ip(ip: IpAddr) -> (AddressFamily, u64) {
    match ip {
        IpAddr::V4(v4) => (AddressFamily::V4, u64::from(u32::from(v4))),
        IpAddr::V6(v6) => {
            let segments = v6.segments();
            let key = (u64::from(segments[0]) << GROUP_SHIFT) | u64::from(segments[1]);
            (AddressFamily::V6, key)
        }
    }
}

/// A validated CIDR literal, ready for insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cidr {
    pub family: AddressFamily,
    pub key: u64,
    /// Number of key bits to walk. IPv6 prefixes are capped at 64.
    pub prefix_len: u32,
}

impl Cidr {
    /// Parse a CIDR literal, explaining why it is rejected.
    ///
    /// Accepts exactly what the filter inserts: a non-zero prefix length, a
    /// well formed base address whose key is not the all-zero sentinel, and
    /// for IPv4 a prefix of at most 32 bits.
    pub fn parse(text: &str) -> Result<Self> {
        if !text.contains(CIDR_SEPARATOR) {
            return Err(FilterError::MissingSeparator(text.to_string()));
        }

        let (prefix_len, base) = split_cidr(text);
        if prefix_len == 0 {
            return Err(FilterError::InvalidPrefixLength(text.to_string()));
        }
        if base.is_empty() {
            return Err(FilterError::InvalidAddress(text.to_string()));
        }

        let family = AddressFamily::detect(base);
        let key = family
            .try_parse_key(base)
            .ok_or_else(|| FilterError::InvalidAddress(base.to_string()))?;
        if key == 0 {
            return Err(FilterError::ReservedAddress(base.to_string()));
        }

        let prefix_len = match family {
            AddressFamily::V4 if prefix_len > family.bit_width() => {
                return Err(FilterError::PrefixTooLong {
                    family,
                    prefix: prefix_len,
                })
            }
            AddressFamily::V4 => prefix_len,
            AddressFamily::V6 => prefix_len.min(family.bit_width()),
        };

        Ok(Self {
            family,
            key,
            prefix_len,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, Ipv6Addr};

    use super::*;

    #[test]
    fn test_split_cidr() {
        assert_eq!(split_cidr("10.0.0.0/8"), (8, "10.0.0.0"));
        assert_eq!(split_cidr("2a01:578::/32"), (32, "2a01:578::"));
        assert_eq!(split_cidr("10.0.0.0"), (0, ""));
        assert_eq!(split_cidr(""), (0, ""));
    }

    #[test]
    fn test_split_cidr_malformed_prefix_is_zero() {
        assert_eq!(split_cidr("10.0.0.0/"), (0, "10.0.0.0"));
        assert_eq!(split_cidr("10.0.0.0/abc"), (0, "10.0.0.0"));
        assert_eq!(split_cidr("10.0.0.0/+8"), (0, "10.0.0.0"));
        assert_eq!(split_cidr("10.0.0.0/-1"), (0, "10.0.0.0"));
        assert_eq!(split_cidr("10.0.0.0/8/9"), (0, "10.0.0.0"));
        assert_eq!(split_cidr("10.0.0.0/99999999999"), (0, "10.0.0.0"));
    }

    #[test]
    fn test_parse_ipv4() {
        assert_eq!(parse_ipv4("10.0.0.1"), 0x0A00_0001);
        assert_eq!(parse_ipv4("255.255.255.255"), u32::MAX);
        assert_eq!(parse_ipv4("52.93.126.244"), 0x345D_7EF4);
    }

    #[test]
    fn test_parse_ipv4_invalid() {
        assert_eq!(parse_ipv4(""), 0);
        assert_eq!(parse_ipv4("10.0"), 0);
        assert_eq!(parse_ipv4("10.0.0.1.1.1"), 0);
        assert_eq!(parse_ipv4("10.0.0."), 0);
        assert_eq!(parse_ipv4("10..0.1"), 0);
        assert_eq!(parse_ipv4("256.0.0.1"), 0);
        assert_eq!(parse_ipv4("10.0.0.+1"), 0);
        assert_eq!(parse_ipv4("hello, world!"), 0);
        assert_eq!(parse_ipv4("10.0.0.1/8"), 0);
    }

    #[test]
    fn test_parse_ipv4_all_zero_is_sentinel() {
        assert_eq!(parse_ipv4("0.0.0.0"), 0);
        assert_eq!(try_parse_ipv4("0.0.0.0"), Some(0));
    }

    #[test]
    fn test_parse_ipv6_keys_first_two_groups() {
        assert_eq!(parse_ipv6("2a01:578:0:7301::1"), 0x0000_2a01_0000_0578);
        assert_eq!(parse_ipv6("2a01:0578:ffff:ffff::"), 0x0000_2a01_0000_0578);
        assert_eq!(parse_ipv6("2600::1"), 0x0000_2600_0000_0000);
        assert_eq!(parse_ipv6("2600:1f18"), 0x0000_2600_0000_1f18);
    }

    #[test]
    fn test_parse_ipv6_invalid() {
        assert_eq!(parse_ipv6(""), 0);
        assert_eq!(parse_ipv6("::::"), 0);
        assert_eq!(parse_ipv6("::1"), 0);
        assert_eq!(parse_ipv6("2600:h0h0:2::"), 0);
        assert_eq!(parse_ipv6("12345:1::"), 0);
        assert_eq!(parse_ipv6("2600:1::/64"), 0);
        assert_eq!(parse_ipv6(":1::5"), 0);
        assert_eq!(parse_ipv6(":1"), 0);
    }

    #[test]
    fn test_cidr_parse_rejects_single_leading_colon() {
        assert!(matches!(
            Cidr::parse(":1::/64"),
            Err(FilterError::InvalidAddress(_))
        ));
        assert!(matches!(
            Cidr::parse("::/64"),
            Err(FilterError::ReservedAddress(_))
        ));
    }

    #[test]
    fn test_family_detect() {
        assert_eq!(AddressFamily::detect("10.0.0.1"), AddressFamily::V4);
        assert_eq!(AddressFamily::detect("::1"), AddressFamily::V6);
        assert_eq!(AddressFamily::detect("hello"), AddressFamily::V4);
    }

    #[test]
    fn test_key_from_ip_matches_text_codec() {
        let v4 = Ipv4Addr::new(52, 93, 126, 244);
        assert_eq!(
            key_from_ip(IpAddr::V4(v4)),
            (AddressFamily::V4, u64::from(parse_ipv4("52.93.126.244")))
        );

        let v6: Ipv6Addr = "2a01:578:0:7301::1".parse().unwrap();
        assert_eq!(
            key_from_ip(IpAddr::V6(v6)),
            (AddressFamily::V6, parse_ipv6("2a01:578:0:7301::1"))
        );
    }

    #[test]
    fn test_cidr_parse() {
        let cidr = Cidr::parse("10.0.0.0/8").unwrap();
        assert_eq!(cidr.family, AddressFamily::V4);
        assert_eq!(cidr.key, 0x0A00_0000);
        assert_eq!(cidr.prefix_len, 8);
    }

    #[test]
    fn test_cidr_parse_clamps_ipv6_prefix() {
        let cidr = Cidr::parse("2a01:578:0:7301::1/128").unwrap();
        assert_eq!(cidr.family, AddressFamily::V6);
        assert_eq!(cidr.prefix_len, 64);
    }

    #[test]
    fn test_cidr_parse_errors() {
        assert!(matches!(
            Cidr::parse("10.0.0.1"),
            Err(FilterError::MissingSeparator(_))
        ));
        assert!(matches!(
            Cidr::parse("10.0.0.0/0"),
            Err(FilterError::InvalidPrefixLength(_))
        ));
        assert!(matches!(
            Cidr::parse("10.0.0.0/x"),
            Err(FilterError::InvalidPrefixLength(_))
        ));
        assert!(matches!(
            Cidr::parse("/8"),
            Err(FilterError::InvalidAddress(_))
        ));
        assert!(matches!(
            Cidr::parse("10.0/8"),
            Err(FilterError::InvalidAddress(_))
        ));
        assert!(matches!(
            Cidr::parse("0.0.0.0/8"),
            Err(FilterError::ReservedAddress(_))
        ));
        assert!(matches!(
            Cidr::parse("::/16"),
            Err(FilterError::ReservedAddress(_))
        ));
        assert!(matches!(
            Cidr::parse("10.0.0.0/33"),
            Err(FilterError::PrefixTooLong { prefix: 33, .. })
        ));
    }
}
