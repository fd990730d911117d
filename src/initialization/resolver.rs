//! DNS resolver initialization.

use crate::dns::NetworkResolver;
use crate::error_handling::InitializationError;

/// Initializes the network resolver used for the template domain lookups.
///
/// Uses the default upstream configuration with the timeout and attempt
/// count from [`crate::config`]. Offline validation never goes through this
/// resolver.
///
/// # Errors
///
/// Returns `InitializationError::DnsResolverError` if the resolver cannot be
/// constructed.
pub fn init_resolver() -> Result<NetworkResolver, InitializationError> {
    let resolver = NetworkResolver::new()?;
    log::debug!("DNS resolver initialized");
    Ok(resolver)
}
