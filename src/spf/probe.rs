//! Probe address selection.
//!
//! Offline validation needs a client address that the record under test is
//! expected to authorize. It is taken from the record's first `ip4:` or
//! `ip6:` mechanism: a bare address is used as is, while for a CIDR range the
//! written address is advanced by one host to stand in for a live address
//! inside the advertised range.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Derives a probe address from the first `ip4:`/`ip6:` mechanism of `txt`.
///
/// Returns `None` when the record has no such mechanism or its address does
/// not parse; callers then fall back to a configured test address.
///
/// # Examples
///
/// ```
/// use spf_flatten::spf::extract_probe_address;
///
/// assert_eq!(
///     extract_probe_address("v=spf1 ip4:192.0.2.1/32").unwrap().to_string(),
///     "192.0.2.2"
/// );
/// assert_eq!(
///     extract_probe_address("v=spf1 ip4:192.0.2.1").unwrap().to_string(),
///     "192.0.2.1"
/// );
/// ```
pub fn extract_probe_address(txt: &str) -> Option<IpAddr> {
    for token in txt.split_whitespace() {
        let term = token
            .strip_prefix(|c: char| matches!(c, '+' | '-' | '~' | '?'))
            .unwrap_or(token);
        let Some((name, value)) = term.split_once(':') else {
            continue;
        };

        if name.eq_ignore_ascii_case("ip4") {
            return probe_ip4(value).map(IpAddr::V4);
        }
        if name.eq_ignore_ascii_case("ip6") {
            return probe_ip6(value).map(IpAddr::V6);
        }
    }
    None
}

fn probe_ip4(value: &str) -> Option<Ipv4Addr> {
    match value.split_once('/') {
        Some((addr, _)) => {
            let addr: Ipv4Addr = addr.parse().ok()?;
            Some(Ipv4Addr::from(u32::from(addr).wrapping_add(1)))
        }
        None => value.parse().ok(),
    }
}

fn probe_ip6(value: &str) -> Option<Ipv6Addr> {
    match value.split_once('/') {
        Some((addr, _)) => {
            let addr: Ipv6Addr = addr.parse().ok()?;
            Some(Ipv6Addr::from(u128::from(addr).wrapping_add(1)))
        }
        None => value.parse().ok(),
    }
}
