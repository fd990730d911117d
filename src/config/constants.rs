//! Configuration constants.
//!
//! This module contains the limits and defaults used across the flatten,
//! split and validate stages.

// SPF packing
/// Byte budget for the mechanism content packed into one generated sub-record.
///
/// Only the mechanisms' own lengths count against it; the single-space
/// separators and the `v=spf1 ` / ` ~all` framing do not.
pub const SPF_BYTE_BUDGET: usize = 255;

/// Version tag that opens every SPF TXT record.
pub const SPF_VERSION_TAG: &str = "v=spf1";

/// Terminal directive appended to every generated record.
pub const SPF_TERMINAL_DIRECTIVE: &str = "~all";

/// Prefix of generated sub-record names (`_spf<N>.<update domain>`).
pub const SPF_SUBDOMAIN_PREFIX: &str = "_spf";

// Include traversal
/// Maximum include nesting followed while flattening.
/// Deeper chains are rejected instead of recursing without bound.
pub const MAX_INCLUDE_DEPTH: usize = 10;

// RFC 7208 evaluation limits
/// Maximum number of DNS-querying terms per `check_host()` evaluation (RFC 7208 4.6.4).
pub const MAX_DNS_LOOKUPS: usize = 10;
/// Maximum number of lookups returning no answer (RFC 7208 4.6.4).
pub const MAX_VOID_LOOKUPS: usize = 2;
/// Maximum number of MX names examined by one `mx` mechanism.
pub const MAX_MX_NAMES: usize = 10;

// Offline validation identities
/// HELO identity presented to the evaluator during offline validation.
pub const VALIDATION_HELO: &str = "helo";
/// Local part of the synthetic sender address (`sender@<domain>`).
pub const VALIDATION_SENDER_LOCAL_PART: &str = "sender";

// Network operation timeouts
/// DNS query timeout in seconds
pub const DNS_TIMEOUT_SECS: u64 = 10;
/// DNS query attempts before giving up
pub const DNS_ATTEMPTS: usize = 2;
