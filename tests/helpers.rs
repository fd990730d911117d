// Shared test helpers for building simulated zones.
//
// This module provides the template zones used across the integration tests.

use std::net::IpAddr;

use spf_flatten::dns::SimulatedResolver;

/// `count` consecutive `ip4:192.168.<n>.0/24` mechanisms.
#[allow(dead_code)] // Used by other test files
pub fn class_c_ranges(count: usize) -> Vec<String> {
    (0..count).map(|n| format!("ip4:192.168.{n}.0/24")).collect()
}

/// Parses an address literal.
#[allow(dead_code)] // Used by other test files
pub fn ip(s: &str) -> IpAddr {
    s.parse().expect("valid address literal")
}

/// A template domain whose policy spreads `count` /24 ranges across two
/// included providers, mirroring a typical hosted-mail setup.
#[allow(dead_code)] // Used by other test files
pub fn provider_zone(template: &str, count: usize) -> SimulatedResolver {
    let ranges = class_c_ranges(count);
    let (first, second) = ranges.split_at(count / 2);

    let mut zone = SimulatedResolver::new();
    zone.set_txt(
        template,
        [
            "google-site-verification=abc123".to_string(),
            "v=spf1 include:_spf.mail.example include:spf.relay.example -all".to_string(),
        ],
    );
    zone.set_txt(
        "_spf.mail.example",
        [format!("v=spf1 {} ~all", first.join(" "))],
    );
    zone.set_txt(
        "spf.relay.example",
        [format!("v=spf1 {} ?all", second.join(" "))],
    );
    zone
}
