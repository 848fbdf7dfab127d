//! Bogon/reserved address classification.
//!
//! A bogon is an address that is never globally routable: private ranges,
//! loopback, link-local, multicast, reserved space, the unspecified address,
//! and limited broadcast. Blacklisting one of these would at best be useless
//! and at worst break local networking, so the mapper discards them
//! unconditionally.
//!
//! Classification is a pure predicate with no state. Unparseable input is
//! fail-closed: if we cannot tell what an address is, it is treated as bogon.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Classify a textual address. Unparseable input counts as bogon.
#[must_use]
pub fn is_bogon(text: &str) -> bool {
    text.trim()
        .parse::<IpAddr>()
        .map_or(true, is_bogon_addr)
}

/// Classify a parsed address.
#[must_use]
pub fn is_bogon_addr(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_bogon_v4(v4),
        IpAddr::V6(v6) => is_bogon_v6(v6),
    }
}

/// IPv4 bogon check: RFC 1918 private, loopback, link-local, multicast,
/// 240.0.0.0/4 reserved, 0.0.0.0 and 255.255.255.255.
#[must_use]
pub fn is_bogon_v4(ip: Ipv4Addr) -> bool {
    ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local()
        || ip.is_multicast()
        || ip.is_broadcast()
        || ip.is_unspecified()
        || ip.octets()[0] >= 240
}

/// IPv6 bogon check: loopback, unspecified, multicast, unique-local
/// (fc00::/7), link-local (fe80::/10), documentation (2001:db8::/32).
#[must_use]
pub fn is_bogon_v6(ip: Ipv6Addr) -> bool {
    let seg = ip.segments();
    ip.is_loopback()
        || ip.is_unspecified()
        || ip.is_multicast()
        || (seg[0] & 0xfe00) == 0xfc00
        || (seg[0] & 0xffc0) == 0xfe80
        || (seg[0] == 0x2001 && seg[1] == 0x0db8)
}
