//! spf_flatten library: SPF include flattening and offline validation
//!
//! This library resolves an SPF policy's nested `include:` mechanisms into a
//! single flat mechanism pool, repacks that pool into DNS-TXT-sized
//! `_spf<N>` sub-records plus a top-level record that includes them, and
//! checks the generated set for RFC 7208 compliance against an in-memory
//! zone before anything is published.
//!
//! # Example
//!
//! ```
//! use spf_flatten::dns::SimulatedResolver;
//! use spf_flatten::{run_flatten, Config};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut zone = SimulatedResolver::new();
//! zone.set_txt("example.com", ["v=spf1 include:_spf.example.com -all"]);
//! zone.set_txt("_spf.example.com", ["v=spf1 ip4:192.0.2.0/24 ~all"]);
//!
//! let config = Config::new("example.com", "example.net", "192.0.2.1".parse()?);
//! let report = run_flatten(&config, &zone)?;
//!
//! assert_eq!(
//!     report.records.get("example.net"),
//!     Some("v=spf1 include:_spf1.example.net ~all")
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! Everything is synchronous and each call owns its working state, so
//! independent runs may execute on separate threads.

#![warn(missing_docs)]

pub mod config;
pub mod dns;
mod error_handling;
pub mod initialization;
pub mod publish;
pub mod spf;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel, OutputFormat};
pub use error_handling::{
    FlattenError, InitializationError, LookupError, PublishError, ValidationError,
};
pub use run::{run_flatten, FlattenReport};

// Internal run module (contains the flatten/split/validate pipeline)
mod run {
    use std::time::Instant;

    use anyhow::{Context, Result};
    use log::info;
    use serde::Serialize;

    use crate::config::Config;
    use crate::dns::TxtResolver;
    use crate::spf::{flatten_domain, records_are_valid, split_records_with_budget, TxtRecordSet};

    /// Results of a flatten run.
    #[derive(Debug, Clone, Serialize)]
    pub struct FlattenReport {
        /// Validated records, sub-records first and the top-level record last
        pub records: TxtRecordSet,
        /// Number of mechanisms in the flattened pool
        pub mechanism_count: usize,
        /// Elapsed time in seconds
        pub elapsed_seconds: f64,
    }

    /// Flattens, splits and validates the SPF policy described by `config`.
    ///
    /// The template domain's policy is read through `resolver`; validation
    /// always runs against a private in-memory zone. The returned records
    /// are ready to hand to a [`ZonePublisher`](crate::publish::ZonePublisher).
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The template domain or any included domain cannot be resolved
    /// - The include graph loops or is nested too deeply
    /// - Any generated record does not evaluate to `pass`
    ///
    /// The underlying [`FlattenError`](crate::FlattenError) or
    /// [`ValidationError`](crate::ValidationError) can be recovered with
    /// `downcast_ref`.
    pub fn run_flatten<R: TxtResolver + ?Sized>(
        config: &Config,
        resolver: &R,
    ) -> Result<FlattenReport> {
        let start = Instant::now();

        let mechanisms = flatten_domain(resolver, &config.template_domain).with_context(|| {
            format!("Failed to flatten SPF policy of {}", config.template_domain)
        })?;
        info!(
            "Flattened {} into {} mechanism(s)",
            config.template_domain,
            mechanisms.len()
        );

        let records =
            split_records_with_budget(&mechanisms, &config.update_domain, config.byte_budget);
        info!(
            "Split into {} record(s) for {}",
            records.len(),
            config.update_domain
        );

        records_are_valid(&records, config.test_ip, &config.update_domain)
            .context("Generated records failed validation")?;

        Ok(FlattenReport {
            records,
            mechanism_count: mechanisms.len(),
            elapsed_seconds: start.elapsed().as_secs_f64(),
        })
    }
}
