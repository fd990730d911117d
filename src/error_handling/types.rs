//! Error type definitions.
//!
//! This module defines all error types used throughout the application.

use std::net::IpAddr;

use log::SetLoggerError;
use thiserror::Error;

use crate::spf::SpfResult;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the DNS resolver.
    #[error("DNS resolver initialization error: {0}")]
    DnsResolverError(String),
}

/// A resolver failed to produce TXT (or address) data for a domain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The name has no data of the requested type, or does not exist.
    #[error("lookup {domain}: domain not found")]
    NotFound {
        /// Queried name
        domain: String,
    },

    /// The transport failed (timeout, server failure, malformed answer).
    #[error("lookup {domain}: {message}")]
    Transport {
        /// Queried name
        domain: String,
        /// Transport error text
        message: String,
    },
}

/// Error types for SPF flattening.
///
/// Any of these aborts the whole flatten; no partial mechanism list is kept.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlattenError {
    /// A nested lookup failed.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// An include chain returned to a domain already being expanded.
    #[error("include loop detected at {domain}")]
    IncludeLoop {
        /// Domain that was re-entered
        domain: String,
    },

    /// Include nesting exceeded the configured maximum depth.
    #[error("include chain too deep at {domain} (depth {depth})")]
    TooDeep {
        /// Domain that would have been expanded past the limit
        domain: String,
        /// Nesting depth reached
        depth: usize,
    },

    /// An include carries a `-`, `~` or `?` qualifier, which inlining
    /// cannot preserve.
    #[error("cannot flatten qualified include {mechanism}")]
    QualifiedInclude {
        /// Mechanism as published
        mechanism: String,
    },
}

/// A generated record did not evaluate to `pass` against the simulated zone.
///
/// Lookup-budget exhaustion surfaces here as a `permerror` result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The record published at `domain` evaluated to `result` for `probe`.
    #[error("invalid record for domain: {domain} (probe {probe} evaluated to {result})")]
    InvalidRecord {
        /// Record name that failed
        domain: String,
        /// Outcome of the evaluation
        result: SpfResult,
        /// Address the record was probed with
        probe: IpAddr,
    },
}

impl ValidationError {
    /// Record name that failed validation.
    pub fn domain(&self) -> &str {
        match self {
            ValidationError::InvalidRecord { domain, .. } => domain,
        }
    }
}

/// Error types for zone publishing.
#[derive(Error, Debug)]
pub enum PublishError {
    /// Writing the record to its destination failed.
    #[error("failed to publish TXT record {name}: {source}")]
    Io {
        /// Record name being written
        name: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The zone backend rejected the change.
    #[error("zone rejected TXT record {name}: {message}")]
    Rejected {
        /// Record name being written
        name: String,
        /// Backend error text
        message: String,
    },
}
