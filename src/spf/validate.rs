//! Offline validation of a generated record set.
//!
//! Before anything is published, the records are loaded into a private
//! [`SimulatedResolver`] and each one is evaluated with `check_host()` against
//! an address it should authorize. Nothing here touches the network.

use std::net::IpAddr;

use super::eval::{SpfEvaluator, SpfResult};
use super::probe::extract_probe_address;
use super::record_set::TxtRecordSet;
use crate::config::{VALIDATION_HELO, VALIDATION_SENDER_LOCAL_PART};
use crate::dns::{SimulatedResolver, TxtResolver};
use crate::error_handling::ValidationError;

/// Evaluates the SPF policy of `domain` for `ip` with the synthetic HELO and
/// sender identities used during validation.
pub fn check_record<R: TxtResolver + ?Sized>(resolver: &R, ip: IpAddr, domain: &str) -> SpfResult {
    let sender = format!("{VALIDATION_SENDER_LOCAL_PART}@{domain}");
    SpfEvaluator::new(resolver).check_host(ip, VALIDATION_HELO, &sender, domain)
}

/// Returns `true` when `domain` authorizes `ip` (the evaluation passes).
pub fn record_is_valid<R: TxtResolver + ?Sized>(resolver: &R, ip: IpAddr, domain: &str) -> bool {
    check_record(resolver, ip, domain) == SpfResult::Pass
}

/// Builds the in-memory zone `records` will be validated against.
///
/// Every record is published as the single TXT answer of its name and the
/// update domain resolves to `fallback_ip`.
pub fn seed_resolver(
    records: &TxtRecordSet,
    fallback_ip: IpAddr,
    update_domain: &str,
) -> SimulatedResolver {
    let mut resolver = SimulatedResolver::new();
    for (name, value) in records.iter() {
        resolver.set_txt(name, [value]);
    }
    resolver.set_ip(update_domain, vec![fallback_ip]);
    resolver
}

/// Checks that every record in `records` passes SPF evaluation.
///
/// Records are checked in set order. Each one is probed with the address
/// derived from its first `ip4:`/`ip6:` mechanism, or `fallback_ip` when it
/// has none. Checking stops at the first record that does not pass.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidRecord`] naming the first failing
/// record, the address it was probed with and the result it produced.
pub fn records_are_valid(
    records: &TxtRecordSet,
    fallback_ip: IpAddr,
    update_domain: &str,
) -> Result<(), ValidationError> {
    let resolver = seed_resolver(records, fallback_ip, update_domain);
    check_records(&resolver, records, fallback_ip)
}

/// Evaluates every record of `records` through `resolver`, in set order,
/// stopping at the first one that does not pass.
///
/// [`records_are_valid`] calls this with a zone seeded from `records`.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidRecord`] for the first failing record.
pub fn check_records<R: TxtResolver + ?Sized>(
    resolver: &R,
    records: &TxtRecordSet,
    fallback_ip: IpAddr,
) -> Result<(), ValidationError> {
    for (domain, value) in records.iter() {
        let probe = extract_probe_address(value).unwrap_or(fallback_ip);
        let result = check_record(resolver, probe, domain);
        if result != SpfResult::Pass {
            log::warn!("Record for {domain} is invalid: probe {probe} evaluated to {result}");
            return Err(ValidationError::InvalidRecord {
                domain: domain.to_string(),
                result,
                probe,
            });
        }
        log::info!("Record for {domain} is valid (probe {probe})");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::LookupError;
    use std::cell::RefCell;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_single_level_record() {
        let mut resolver = SimulatedResolver::new();
        resolver.set_txt("domain1", ["v=spf1 ip4:1.1.1.1 ~all"]);
        resolver.set_ip("domain1", vec![ip("1.1.1.1")]);

        assert!(record_is_valid(&resolver, ip("1.1.1.1"), "domain1"));
        assert!(!record_is_valid(&resolver, ip("192.168.1.1"), "domain1"));
        assert!(record_is_valid(&resolver, ip("1.1.1.1"), "domain1"));
    }

    #[test]
    fn test_two_level_record() {
        let mut resolver = SimulatedResolver::new();
        resolver.set_txt("domain1", ["v=spf1 include:_spf1.domain1 ~all"]);
        resolver.set_txt("_spf1.domain1", ["v=spf1 ip4:1.1.1.1 -all"]);

        assert!(record_is_valid(&resolver, ip("1.1.1.1"), "domain1"));
        assert_eq!(
            check_record(&resolver, ip("192.168.1.1"), "domain1"),
            SpfResult::SoftFail
        );
    }

    #[test]
    fn test_too_many_includes_is_invalid() {
        let mut resolver = SimulatedResolver::new();
        let mut record = String::from("v=spf1");
        for n in 1..=11 {
            let name = format!("_spf{n}.domain1");
            let value = if n == 11 {
                "v=spf1 ip4:1.1.1.1 -all"
            } else {
                "v=spf1 ip4:1.1.1.2 -all"
            };
            resolver.set_txt(&name, [value]);
            record.push_str(&format!(" include:{name}"));
        }
        record.push_str(" ~all");
        resolver.set_txt("domain1", [record]);

        assert_eq!(
            check_record(&resolver, ip("1.1.1.1"), "domain1"),
            SpfResult::PermError
        );
    }

    fn split_set() -> TxtRecordSet {
        let mut records = TxtRecordSet::new();
        records.insert("_spf1.domain1", "v=spf1 ip4:1.1.1.0/24 ~all");
        records.insert("_spf2.domain1", "v=spf1 ip6:AAAA:AAAA:AAAA::/36 ~all");
        records.insert(
            "domain1",
            "v=spf1 include:_spf1.domain1 include:_spf2.domain1 ~all",
        );
        records
    }

    #[test]
    fn test_records_are_valid() {
        assert_eq!(records_are_valid(&split_set(), ip("1.1.1.1"), "domain1"), Ok(()));
    }

    #[test]
    fn test_bogus_include_names_failing_domain() {
        let mut records = split_set();
        records.insert("domain1", "v=spf1 include:bogus ~all");

        let err = records_are_valid(&records, ip("1.1.1.1"), "domain1").unwrap_err();
        assert_eq!(err.domain(), "domain1");
        let ValidationError::InvalidRecord { result, probe, .. } = err;
        assert_eq!(result, SpfResult::PermError);
        assert_eq!(probe, ip("1.1.1.1"));
    }

    /// Records every TXT name asked of the wrapped zone.
    struct RecordingResolver {
        zone: SimulatedResolver,
        queried: RefCell<Vec<String>>,
    }

    impl TxtResolver for RecordingResolver {
        fn lookup_txt(&self, domain: &str) -> Result<Vec<String>, LookupError> {
            self.queried.borrow_mut().push(domain.to_string());
            self.zone.lookup_txt(domain)
        }

        fn lookup_ip(&self, domain: &str) -> Result<Vec<IpAddr>, LookupError> {
            self.zone.lookup_ip(domain)
        }
    }

    #[test]
    fn test_first_failure_stops_checking() {
        let mut records = TxtRecordSet::new();
        records.insert("_spf1.domain1", "v=spf1 include:missing.domain1 ~all");
        records.insert("_spf2.domain1", "v=spf1 ip4:1.1.1.0/24 ~all");
        records.insert("domain1", "v=spf1 include:_spf2.domain1 ~all");

        let resolver = RecordingResolver {
            zone: seed_resolver(&records, ip("1.1.1.1"), "domain1"),
            queried: RefCell::new(Vec::new()),
        };
        let err = check_records(&resolver, &records, ip("1.1.1.1")).unwrap_err();

        assert_eq!(err.domain(), "_spf1.domain1");
        assert_eq!(
            resolver.queried.into_inner(),
            vec!["_spf1.domain1", "missing.domain1"]
        );
    }

    #[test]
    fn test_check_records_visits_every_record_when_valid() {
        let records = split_set();
        let resolver = RecordingResolver {
            zone: seed_resolver(&records, ip("1.1.1.1"), "domain1"),
            queried: RefCell::new(Vec::new()),
        };
        assert_eq!(check_records(&resolver, &records, ip("1.1.1.1")), Ok(()));

        let queried = resolver.queried.into_inner();
        for name in records.names() {
            assert!(queried.iter().any(|q| q == name), "{name} was not evaluated");
        }
    }

    #[test]
    fn test_probe_outside_top_level_range_fails() {
        let mut records = TxtRecordSet::new();
        records.insert("domain1", "v=spf1 ip4:10.0.0.0/24 ~all");

        // The fallback address is irrelevant once the record names a range
        assert_eq!(records_are_valid(&records, ip("192.0.2.1"), "domain1"), Ok(()));

        records.insert("domain1", "v=spf1 ip4:10.0.0.7/32 ~all");
        let err = records_are_valid(&records, ip("10.0.0.7"), "domain1").unwrap_err();
        let ValidationError::InvalidRecord { result, probe, .. } = err;
        assert_eq!(probe, ip("10.0.0.8"));
        assert_eq!(result, SpfResult::SoftFail);
    }

    #[test]
    fn test_seed_resolver_answers_each_record() {
        let resolver = seed_resolver(&split_set(), ip("1.1.1.1"), "domain1");

        assert_eq!(
            resolver.lookup_txt("_spf1.domain1").unwrap(),
            vec!["v=spf1 ip4:1.1.1.0/24 ~all".to_string()]
        );
        assert_eq!(resolver.lookup_ip("domain1").unwrap(), vec![ip("1.1.1.1")]);
        assert!(resolver.lookup_ip("_spf1.domain1").is_err());
    }
}
