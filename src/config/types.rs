//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::net::IpAddr;

use clap::{Parser, ValueEnum};

use crate::config::constants::SPF_BYTE_BUDGET;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Output format for the accepted record set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Zone-file style lines: `<name>\tTXT\t"<value>"`
    Zone,
    /// A single JSON object mapping record name to TXT value
    Json,
}

/// Command-line options and configuration.
///
/// Every domain and address option can also be supplied through the
/// environment variable named next to it.
///
/// # Examples
///
/// ```bash
/// # Flatten the SPF policy of example.net into records published under example.com
/// spf_flatten --template-domain example.net --update-domain example.com --test-ip 192.0.2.10
///
/// # Same, configured from the environment and printed as JSON
/// TEMPLATE_DOMAIN=example.net UPDATE_DOMAIN=example.com TEST_IP=192.0.2.10 spf_flatten --output json
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "spf_flatten",
    about = "Flattens an SPF policy into size-bounded TXT records and validates them offline."
)]
pub struct Config {
    /// Domain whose published SPF policy is flattened
    #[arg(long, env = "TEMPLATE_DOMAIN")]
    pub template_domain: String,

    /// Domain the flattened records are generated for
    #[arg(long, env = "UPDATE_DOMAIN")]
    pub update_domain: String,

    /// Fallback probe address used for records without ip4/ip6 mechanisms.
    ///
    /// Must be covered by one of the flattened ranges, otherwise the
    /// top-level record cannot validate.
    #[arg(long, env = "TEST_IP")]
    pub test_ip: IpAddr,

    /// Byte budget for mechanism content per generated sub-record
    #[arg(long, default_value_t = SPF_BYTE_BUDGET)]
    pub byte_budget: usize,

    /// Output format: zone|json
    #[arg(long, value_enum, default_value_t = OutputFormat::Zone)]
    pub output: OutputFormat,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Config {
    /// Builds a configuration programmatically with default budget, output and logging.
    pub fn new(
        template_domain: impl Into<String>,
        update_domain: impl Into<String>,
        test_ip: IpAddr,
    ) -> Self {
        Self {
            template_domain: template_domain.into(),
            update_domain: update_domain.into(),
            test_ip,
            byte_budget: SPF_BYTE_BUDGET,
            output: OutputFormat::Zone,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}
