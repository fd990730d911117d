//! Network-backed resolver.
//!
//! Wraps the blocking `hickory_resolver::Resolver` and maps its answers and
//! failures onto the [`TxtResolver`] contract.

use std::net::IpAddr;
use std::time::Duration;

use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::Resolver;

use super::TxtResolver;
use crate::config::{DNS_ATTEMPTS, DNS_TIMEOUT_SECS};
use crate::error_handling::{InitializationError, LookupError};

/// Resolver issuing real DNS queries.
///
/// Calls block the current thread; timeouts and retries are governed by the
/// resolver options chosen at construction.
pub struct NetworkResolver {
    resolver: Resolver,
}

impl NetworkResolver {
    /// Creates a resolver with the default upstream configuration and
    /// [`DNS_TIMEOUT_SECS`] / [`DNS_ATTEMPTS`].
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::DnsResolverError` if the underlying
    /// resolver cannot be constructed.
    pub fn new() -> Result<Self, InitializationError> {
        let mut opts = ResolverOpts::default();
        opts.timeout = Duration::from_secs(DNS_TIMEOUT_SECS);
        opts.attempts = DNS_ATTEMPTS;
        // Names are always fully qualified; never append search domains
        opts.ndots = 0;
        Self::with_config(ResolverConfig::default(), opts)
    }

    /// Creates a resolver with explicit upstream configuration and options.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::DnsResolverError` if the underlying
    /// resolver cannot be constructed.
    pub fn with_config(
        config: ResolverConfig,
        opts: ResolverOpts,
    ) -> Result<Self, InitializationError> {
        let resolver = Resolver::new(config, opts)
            .map_err(|e| InitializationError::DnsResolverError(e.to_string()))?;
        Ok(Self { resolver })
    }
}

impl std::fmt::Debug for NetworkResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkResolver").finish_non_exhaustive()
    }
}

/// Maps a hickory failure onto the lookup error contract.
///
/// "No records" (including NXDOMAIN) is `NotFound`; everything else is a
/// transport failure and is logged.
fn classify_error(domain: &str, e: &ResolveError) -> LookupError {
    match e.kind() {
        ResolveErrorKind::NoRecordsFound { .. } => LookupError::NotFound {
            domain: domain.to_string(),
        },
        _ => {
            let message = e.to_string();
            if message.contains("timeout") || message.contains("timed out") {
                log::warn!("DNS lookup timed out for {domain}: {e}");
            } else {
                log::warn!("DNS lookup failed for {domain}: {e}");
            }
            LookupError::Transport {
                domain: domain.to_string(),
                message,
            }
        }
    }
}

impl TxtResolver for NetworkResolver {
    fn lookup_txt(&self, domain: &str) -> Result<Vec<String>, LookupError> {
        let lookup = self
            .resolver
            .txt_lookup(domain)
            .map_err(|e| classify_error(domain, &e))?;
        let records: Vec<String> = lookup
            .iter()
            .map(|txt| {
                // A TXT answer may be split into several character-strings
                txt.iter()
                    .map(|bytes| String::from_utf8_lossy(bytes).to_string())
                    .collect::<Vec<String>>()
                    .join("")
            })
            .collect();
        log::debug!("TXT {domain}: {} answer(s)", records.len());
        Ok(records)
    }

    fn lookup_ip(&self, domain: &str) -> Result<Vec<IpAddr>, LookupError> {
        let lookup = self
            .resolver
            .lookup_ip(domain)
            .map_err(|e| classify_error(domain, &e))?;
        Ok(lookup.iter().collect())
    }

    fn lookup_mx(&self, domain: &str) -> Result<Vec<String>, LookupError> {
        let lookup = self
            .resolver
            .mx_lookup(domain)
            .map_err(|e| classify_error(domain, &e))?;
        let mut mx_records: Vec<(u16, String)> = lookup
            .iter()
            .map(|mx| {
                let exchange = mx.exchange().to_utf8();
                (mx.preference(), exchange.trim_end_matches('.').to_string())
            })
            .collect();
        // Lower preference = higher priority
        mx_records.sort_by_key(|(priority, _)| *priority);
        Ok(mx_records.into_iter().map(|(_, name)| name).collect())
    }
}
