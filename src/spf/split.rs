//! Record splitting.
//!
//! Packs a flat mechanism pool into consecutive buckets under a byte budget
//! and renders each bucket as a `_spf<N>.<update domain>` sub-record, plus a
//! top-level record that includes them all in bucket order.
//!
//! Only the mechanisms' own byte lengths count against the budget. The
//! separators between them do not, so a bucket of `k` mechanisms may render
//! up to `k - 1` bytes over budget; a single mechanism longer than the budget
//! gets a bucket of its own. Neither case is an error.

use crate::config::{
    SPF_BYTE_BUDGET, SPF_SUBDOMAIN_PREFIX, SPF_TERMINAL_DIRECTIVE, SPF_VERSION_TAG,
};

use super::record_set::TxtRecordSet;

/// Returns the number of leading `mechanisms` that form the next bucket.
///
/// This is the longest prefix whose summed byte lengths stay within
/// `budget`, or `1` when the first mechanism alone exceeds it. Returns `0`
/// only for empty input.
pub fn take_bucket<S: AsRef<str>>(mechanisms: &[S], budget: usize) -> usize {
    let mut used = 0;
    for (count, mechanism) in mechanisms.iter().enumerate() {
        let len = mechanism.as_ref().len();
        if used + len > budget {
            return count.max(1);
        }
        used += len;
    }
    mechanisms.len()
}

/// Name of the `index`-th (1-based) generated sub-record.
pub fn sub_record_name(index: usize, update_domain: &str) -> String {
    format!("{SPF_SUBDOMAIN_PREFIX}{index}.{update_domain}")
}

/// Renders `mechanisms` as a complete SPF TXT value ending in `~all`.
pub fn render_record<S: AsRef<str>>(mechanisms: &[S]) -> String {
    let mut value = String::from(SPF_VERSION_TAG);
    for mechanism in mechanisms {
        value.push(' ');
        value.push_str(mechanism.as_ref());
    }
    value.push(' ');
    value.push_str(SPF_TERMINAL_DIRECTIVE);
    value
}

/// Splits `mechanisms` into sub-records with the default [`SPF_BYTE_BUDGET`].
///
/// See [`split_records_with_budget`].
pub fn split_records<S: AsRef<str>>(mechanisms: &[S], update_domain: &str) -> TxtRecordSet {
    split_records_with_budget(mechanisms, update_domain, SPF_BYTE_BUDGET)
}

/// Splits `mechanisms` into size-bounded sub-records plus a top-level record.
///
/// Mechanisms are never reordered, only partitioned. Bucket `N` (1-based, in
/// allocation order) is stored under `_spf<N>.<update_domain>`; the
/// top-level record is stored under `update_domain` and includes every
/// sub-record in bucket order. Empty input yields only `v=spf1 ~all`.
///
/// # Arguments
///
/// * `mechanisms` - Flat mechanism pool, typically the flattener's output
/// * `update_domain` - Domain the records are generated for
/// * `budget` - Byte budget for mechanism content per sub-record
pub fn split_records_with_budget<S: AsRef<str>>(
    mechanisms: &[S],
    update_domain: &str,
    budget: usize,
) -> TxtRecordSet {
    let mut records = TxtRecordSet::new();
    let mut includes = Vec::new();
    let mut remaining = mechanisms;

    while !remaining.is_empty() {
        let take = take_bucket(remaining, budget);
        let (bucket, rest) = remaining.split_at(take);

        let content_len: usize = bucket.iter().map(|m| m.as_ref().len()).sum();
        if content_len > budget {
            log::warn!(
                "{} is {content_len} bytes, over the {budget}-byte budget; placed in its own record",
                bucket[0].as_ref()
            );
        }

        let name = sub_record_name(includes.len() + 1, update_domain);
        let value = render_record(bucket);
        log::debug!("{name}: {} mechanism(s), {} bytes", bucket.len(), value.len());

        records.insert(name.clone(), value);
        includes.push(format!("include:{name}"));
        remaining = rest;
    }

    records.insert(update_domain, render_record(&includes));
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class_c_ranges(count: usize) -> Vec<String> {
        (0..count).map(|n| format!("ip4:192.168.{n}.0/24")).collect()
    }

    #[test]
    fn test_take_bucket_sums_individual_lengths() {
        let words = ["Hello", "World", "This", "Is", "Golang", "Programming"];
        // 5 + 5 + 4 + 2 = 16; adding "Golang" would reach 22
        assert_eq!(take_bucket(&words, 20), 4);
    }

    #[test]
    fn test_take_bucket_exact_fit() {
        assert_eq!(take_bucket(&["aaaa", "bbbb"], 8), 2);
        assert_eq!(take_bucket(&["aaaa", "bbbb"], 7), 1);
    }

    #[test]
    fn test_take_bucket_oversized_first_mechanism() {
        let long = "x".repeat(300);
        assert_eq!(take_bucket(&[long.as_str(), "ip4:192.0.2.1"], 255), 1);
    }

    #[test]
    fn test_take_bucket_empty() {
        let empty: [&str; 0] = [];
        assert_eq!(take_bucket(&empty, 255), 0);
    }

    #[test]
    fn test_split_sixteen_class_c_ranges() {
        let records = split_records(&class_c_ranges(16), "example.com");

        let expected: TxtRecordSet = [
            (
                "_spf1.example.com",
                "v=spf1 ip4:192.168.0.0/24 ip4:192.168.1.0/24 ip4:192.168.2.0/24 ip4:192.168.3.0/24 ip4:192.168.4.0/24 ip4:192.168.5.0/24 ip4:192.168.6.0/24 ip4:192.168.7.0/24 ip4:192.168.8.0/24 ip4:192.168.9.0/24 ip4:192.168.10.0/24 ip4:192.168.11.0/24 ip4:192.168.12.0/24 ~all",
            ),
            (
                "_spf2.example.com",
                "v=spf1 ip4:192.168.13.0/24 ip4:192.168.14.0/24 ip4:192.168.15.0/24 ~all",
            ),
            (
                "example.com",
                "v=spf1 include:_spf1.example.com include:_spf2.example.com ~all",
            ),
        ]
        .into_iter()
        .collect();

        assert_eq!(records, expected);
    }

    #[test]
    fn test_split_empty_input_yields_top_level_only() {
        let empty: Vec<String> = Vec::new();
        let records = split_records(&empty, "example.com");

        assert_eq!(records.len(), 1);
        assert_eq!(records.get("example.com"), Some("v=spf1 ~all"));
    }

    #[test]
    fn test_split_oversized_mechanism_gets_own_record() {
        let long = format!("exists:{}.example.com", "a".repeat(260));
        let mechanisms = vec!["ip4:192.0.2.1".to_string(), long.clone(), "ip4:192.0.2.2".to_string()];
        let records = split_records(&mechanisms, "example.com");

        assert_eq!(records.get("_spf1.example.com"), Some("v=spf1 ip4:192.0.2.1 ~all"));
        assert_eq!(
            records.get("_spf2.example.com").map(str::to_string),
            Some(format!("v=spf1 {long} ~all"))
        );
        assert_eq!(records.get("_spf3.example.com"), Some("v=spf1 ip4:192.0.2.2 ~all"));
    }

    #[test]
    fn test_split_names_are_consecutive_and_top_level_last() {
        let records = split_records_with_budget(&class_c_ranges(5), "example.com", 40);
        let names: Vec<&str> = records.names().collect();
        assert_eq!(
            names,
            vec![
                "_spf1.example.com",
                "_spf2.example.com",
                "_spf3.example.com",
                "example.com"
            ]
        );
        assert_eq!(
            records.get("example.com"),
            Some("v=spf1 include:_spf1.example.com include:_spf2.example.com include:_spf3.example.com ~all")
        );
    }

    #[test]
    fn test_render_record() {
        assert_eq!(render_record(&["ip4:192.0.2.1", "mx"]), "v=spf1 ip4:192.0.2.1 mx ~all");
        let empty: [&str; 0] = [];
        assert_eq!(render_record(&empty), "v=spf1 ~all");
    }
}
