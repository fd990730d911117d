//! Process-level setup.
//!
//! This module provides the functions the binary calls before any work runs:
//! - Logger (plain or JSON, level from the CLI)
//! - Network DNS resolver
//!
//! Library code never initializes global state on its own.

mod logger;
mod resolver;

// Re-export public API
pub use logger::init_logger_with;
pub use resolver::init_resolver;
