//! DNS resolver capability.
//!
//! This module provides the TXT/address lookup abstraction the SPF stages are
//! written against, with two implementations:
//! - [`NetworkResolver`]: blocking lookups through `hickory-resolver`
//! - [`SimulatedResolver`]: an in-memory zone used for offline validation and tests
//!
//! There is no process-wide default resolver; every entry point takes the
//! resolver it should use as a parameter.

use std::net::IpAddr;

use crate::error_handling::LookupError;

mod network;
mod simulated;

// Re-export public API
pub use network::NetworkResolver;
pub use simulated::SimulatedResolver;

/// Pluggable DNS lookups used by the parser, flattener and evaluator.
///
/// Implementations must fail with [`LookupError::NotFound`] when a name has no
/// data of the requested type, and [`LookupError::Transport`] for anything else.
pub trait TxtResolver {
    /// Returns every TXT string published at `domain`, in answer order.
    fn lookup_txt(&self, domain: &str) -> Result<Vec<String>, LookupError>;

    /// Returns the A and AAAA addresses of `domain`.
    fn lookup_ip(&self, domain: &str) -> Result<Vec<IpAddr>, LookupError>;

    /// Returns the MX exchange names of `domain`, most preferred first.
    ///
    /// Resolvers without MX data report none.
    fn lookup_mx(&self, _domain: &str) -> Result<Vec<String>, LookupError> {
        Ok(Vec::new())
    }
}

/// Canonical form of a domain name used as a lookup key: surrounding dots
/// trimmed, ASCII lowercase.
pub(crate) fn normalize_name(domain: &str) -> String {
    domain.trim_matches('.').to_ascii_lowercase()
}
