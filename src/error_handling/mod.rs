//! Error handling.
//!
//! This module provides typed errors for each stage of a run:
//! - **Lookup**: a resolver could not produce TXT data for a domain
//! - **Flatten**: include expansion failed (lookup failure, loop, excessive depth)
//! - **Validation**: a generated record did not evaluate to `pass`
//! - **Publish**: the zone publisher rejected or failed to write a record
//!
//! All of them are terminal for the run in progress. The pipeline wraps them
//! with `anyhow` context; callers that need the offending domain can
//! downcast to the typed error.

mod types;

// Re-export public API
pub use types::{FlattenError, InitializationError, LookupError, PublishError, ValidationError};
