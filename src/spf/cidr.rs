//! CIDR prefix matching.
//!
//! Shared by the `ip4`, `ip6`, `a` and `mx` mechanisms. A prefix longer than
//! the address width never matches; a zero prefix matches every address.

use std::net::{Ipv4Addr, Ipv6Addr};

/// `true` when `ip` shares the leading `prefix` bits of `network`.
pub(crate) fn ip4_in_network(ip: Ipv4Addr, network: Ipv4Addr, prefix: u8) -> bool {
    let Some(host_bits) = 32u32.checked_sub(u32::from(prefix)) else {
        return false;
    };
    let mask = u32::MAX.checked_shl(host_bits).unwrap_or(0);
    ((u32::from(ip) ^ u32::from(network)) & mask) == 0
}

/// IPv6 counterpart of [`ip4_in_network`].
pub(crate) fn ip6_in_network(ip: Ipv6Addr, network: Ipv6Addr, prefix: u8) -> bool {
    let Some(host_bits) = 128u32.checked_sub(u32::from(prefix)) else {
        return false;
    };
    let mask = u128::MAX.checked_shl(host_bits).unwrap_or(0);
    ((u128::from(ip) ^ u128::from(network)) & mask) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ip4_subnet() {
        let net: Ipv4Addr = "192.168.1.0".parse().unwrap();
        assert!(ip4_in_network("192.168.1.100".parse().unwrap(), net, 24));
        assert!(!ip4_in_network("192.168.2.1".parse().unwrap(), net, 24));
    }

    #[test]
    fn test_ip4_prefix_edges() {
        let ip: Ipv4Addr = "10.0.0.1".parse().unwrap();
        assert!(ip4_in_network(ip, "192.168.1.0".parse().unwrap(), 0));
        assert!(ip4_in_network(ip, ip, 32));
        assert!(!ip4_in_network(ip, ip, 33));
    }

    #[test]
    fn test_ip6_subnet() {
        let net: Ipv6Addr = "2001:db8::".parse().unwrap();
        assert!(ip6_in_network("2001:db8:0:0:ffff::1".parse().unwrap(), net, 64));
        assert!(!ip6_in_network("2001:db8:0:1::1".parse().unwrap(), net, 64));
    }

    #[test]
    fn test_ip6_prefix_edges() {
        let ip: Ipv6Addr = "::1".parse().unwrap();
        assert!(ip6_in_network(ip, "2001:db8::".parse().unwrap(), 0));
        assert!(ip6_in_network(ip, ip, 128));
        assert!(!ip6_in_network(ip, ip, 129));
    }
}
