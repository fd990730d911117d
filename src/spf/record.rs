//! SPF record parsing.
//!
//! Turns the raw TXT answers of a domain into the ordered mechanism list the
//! flattener works on. Only the version tag is interpreted here; every other
//! token is carried verbatim.

use crate::config::SPF_VERSION_TAG;
use crate::dns::TxtResolver;
use crate::error_handling::LookupError;

/// Ordered mechanisms of one SPF policy, version tag excluded.
///
/// Order is significant: evaluation and flattening both depend on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpfRecord {
    /// Mechanism and modifier tokens in published order
    pub mechanisms: Vec<String>,
}

impl SpfRecord {
    /// Creates a record from already-split mechanism tokens.
    pub fn new<I, S>(mechanisms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mechanisms: mechanisms.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds a record from the TXT answers published at `domain`.
    ///
    /// Every answer containing `v=spf1` is selected; its first whitespace
    /// separated token is discarded and the rest are appended in order.
    /// Several SPF answers for one name are merged in answer order rather
    /// than rejected; a warning is logged when that happens.
    ///
    /// # Arguments
    ///
    /// * `domain` - Name the answers were published at (used for logging)
    /// * `answers` - TXT strings in answer order
    pub fn from_txt_answers<S: AsRef<str>>(domain: &str, answers: &[S]) -> Self {
        let mut mechanisms = Vec::new();
        let mut spf_answers = 0;

        for answer in answers.iter().map(AsRef::as_ref) {
            if !answer.contains(SPF_VERSION_TAG) {
                continue;
            }
            spf_answers += 1;
            mechanisms.extend(answer.split_whitespace().skip(1).map(str::to_string));
        }

        if spf_answers > 1 {
            log::warn!(
                "{domain} publishes {spf_answers} SPF records; merging their mechanisms in answer order"
            );
        }

        Self { mechanisms }
    }

    /// Returns `true` if the record carries no mechanisms.
    pub fn is_empty(&self) -> bool {
        self.mechanisms.is_empty()
    }
}

/// Looks up the TXT answers of `domain` and parses them into an [`SpfRecord`].
///
/// # Errors
///
/// Propagates the resolver's [`LookupError`] unchanged.
pub fn lookup_spf<R: TxtResolver + ?Sized>(
    resolver: &R,
    domain: &str,
) -> Result<SpfRecord, LookupError> {
    let answers = resolver.lookup_txt(domain)?;
    let record = SpfRecord::from_txt_answers(domain, answers.as_slice());
    if record.is_empty() {
        log::debug!("{domain} publishes no SPF mechanisms");
    }
    Ok(record)
}
