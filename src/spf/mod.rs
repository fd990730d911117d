//! SPF flattening pipeline.
//!
//! The stages run in a fixed order:
//! 1. [`lookup_spf`] parses a domain's TXT answers into an [`SpfRecord`]
//! 2. [`flatten`] recursively inlines every `include:` into one mechanism pool
//! 3. [`split_records`] packs the pool into size-bounded `_spf<N>` sub-records
//!    and a top-level record that includes them
//! 4. [`records_are_valid`] replays the generated set through an in-memory
//!    zone and requires every record to evaluate to `pass`
//!
//! Every stage that needs DNS takes a [`TxtResolver`](crate::dns::TxtResolver)
//! argument.

mod cidr;
mod eval;
mod flatten;
mod probe;
mod record;
mod record_set;
mod split;
mod term;
mod validate;

// Re-export public API
pub use eval::{SpfEvaluator, SpfResult};
pub use flatten::{flatten, flatten_domain};
pub use probe::extract_probe_address;
pub use record::{lookup_spf, SpfRecord};
pub use record_set::TxtRecordSet;
pub use split::{
    render_record, split_records, split_records_with_budget, sub_record_name, take_bucket,
};
pub use validate::{
    check_record, check_records, record_is_valid, records_are_valid, seed_resolver,
};
