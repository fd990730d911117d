//! RFC 7208 `check_host()` evaluation.
//!
//! A compact evaluator used to confirm that generated records authorize the
//! addresses they advertise. It reads DNS exclusively through a
//! [`TxtResolver`], so it runs just as well against the in-memory zone used
//! for offline validation as against the network.
//!
//! Macro strings are not expanded, and `ptr` never matches because the
//! resolver capability has no reverse lookups. Both still count against the
//! DNS lookup budget.

use std::net::IpAddr;

use strum_macros::{Display, EnumIter};

use super::cidr::{ip4_in_network, ip6_in_network};
use super::term::{is_spf_record, parse_record, Mechanism, ParsedRecord, Qualifier};
use crate::config::{MAX_DNS_LOOKUPS, MAX_MX_NAMES, MAX_VOID_LOOKUPS};
use crate::dns::TxtResolver;
use crate::error_handling::LookupError;

/// Outcome of an SPF evaluation (RFC 7208 Section 2.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum SpfResult {
    /// No SPF record was found
    None,
    /// The record explicitly makes no assertion
    Neutral,
    /// The client is authorized
    Pass,
    /// The client is not authorized
    Fail,
    /// The client is probably not authorized
    SoftFail,
    /// A transient DNS failure occurred
    TempError,
    /// The record is malformed or exceeded a processing limit
    PermError,
}

/// Result of a matched directive.
fn qualifier_result(qualifier: Qualifier) -> SpfResult {
    match qualifier {
        Qualifier::Pass => SpfResult::Pass,
        Qualifier::Fail => SpfResult::Fail,
        Qualifier::SoftFail => SpfResult::SoftFail,
        Qualifier::Neutral => SpfResult::Neutral,
    }
}

/// SPF evaluator bound to a resolver.
pub struct SpfEvaluator<'a, R: TxtResolver + ?Sized> {
    resolver: &'a R,
}

impl<'a, R: TxtResolver + ?Sized> SpfEvaluator<'a, R> {
    /// Creates an evaluator that performs every lookup through `resolver`.
    pub fn new(resolver: &'a R) -> Self {
        Self { resolver }
    }

    /// Evaluates the SPF policy of `domain` for a message from `client_ip`.
    ///
    /// `helo` and `sender` identify the SMTP session; without macro
    /// expansion they only appear in the evaluation log.
    pub fn check_host(&self, client_ip: IpAddr, helo: &str, sender: &str, domain: &str) -> SpfResult {
        let mut ctx = EvalContext::new(client_ip);
        let result = self.evaluate(&mut ctx, domain);
        log::debug!(
            "check_host({client_ip}, {domain}) helo={helo} sender={sender}: {result} after {} lookup(s)",
            ctx.dns_lookups
        );
        result
    }

    fn evaluate(&self, ctx: &mut EvalContext, domain: &str) -> SpfResult {
        let record = match self.select_record(domain) {
            Ok(Some(record)) => record,
            Ok(None) => return SpfResult::None,
            Err(result) => return result,
        };

        for (qualifier, mechanism) in &record.directives {
            match self.evaluate_mechanism(mechanism, domain, ctx) {
                MechanismResult::Match => return qualifier_result(*qualifier),
                MechanismResult::NoMatch => continue,
                MechanismResult::TempError => return SpfResult::TempError,
                MechanismResult::PermError => return SpfResult::PermError,
            }
        }

        // redirect only applies when no mechanism matched
        if let Some(target) = &record.redirect {
            if !ctx.count_lookup() {
                return SpfResult::PermError;
            }
            return match self.evaluate(ctx, target) {
                SpfResult::None => SpfResult::PermError,
                other => other,
            };
        }

        SpfResult::Neutral
    }

    /// Fetches and parses the single SPF record of `domain`.
    ///
    /// `Ok(None)` means the domain has no SPF record; `Err` carries the
    /// result the evaluation must end with.
    fn select_record(&self, domain: &str) -> Result<Option<ParsedRecord>, SpfResult> {
        let answers = match self.resolver.lookup_txt(domain) {
            Ok(answers) => answers,
            Err(LookupError::NotFound { .. }) => return Ok(None),
            Err(e) => {
                log::debug!("{e}");
                return Err(SpfResult::TempError);
            }
        };

        let mut records = answers.iter().filter(|txt| is_spf_record(txt));
        let Some(txt) = records.next() else {
            return Ok(None);
        };
        if records.next().is_some() {
            log::debug!("{domain} publishes more than one SPF record");
            return Err(SpfResult::PermError);
        }

        parse_record(txt).map(Some).map_err(|e| {
            log::debug!("{domain}: {e}");
            SpfResult::PermError
        })
    }

    fn evaluate_mechanism(
        &self,
        mechanism: &Mechanism,
        domain: &str,
        ctx: &mut EvalContext,
    ) -> MechanismResult {
        match mechanism {
            Mechanism::All => MechanismResult::Match,

            Mechanism::Include(target) => {
                if !ctx.count_lookup() {
                    return MechanismResult::PermError;
                }
                match self.evaluate(ctx, target) {
                    SpfResult::Pass => MechanismResult::Match,
                    SpfResult::Fail | SpfResult::SoftFail | SpfResult::Neutral => {
                        MechanismResult::NoMatch
                    }
                    SpfResult::TempError => MechanismResult::TempError,
                    SpfResult::PermError | SpfResult::None => MechanismResult::PermError,
                }
            }

            Mechanism::A {
                domain: target,
                prefix4,
                prefix6,
            } => {
                if !ctx.count_lookup() {
                    return MechanismResult::PermError;
                }
                let target = target.as_deref().unwrap_or(domain);
                self.match_host(ctx, target, *prefix4, *prefix6)
            }

            Mechanism::Mx {
                domain: target,
                prefix4,
                prefix6,
            } => {
                if !ctx.count_lookup() {
                    return MechanismResult::PermError;
                }
                let target = target.as_deref().unwrap_or(domain);
                self.match_mx(ctx, target, *prefix4, *prefix6)
            }

            Mechanism::Ptr(_) => {
                if !ctx.count_lookup() {
                    return MechanismResult::PermError;
                }
                MechanismResult::NoMatch
            }

            Mechanism::Ip4(network, prefix) => match ctx.client_ip {
                IpAddr::V4(client) if ip4_in_network(client, *network, *prefix) => {
                    MechanismResult::Match
                }
                _ => MechanismResult::NoMatch,
            },

            Mechanism::Ip6(network, prefix) => match ctx.client_ip {
                IpAddr::V6(client) if ip6_in_network(client, *network, *prefix) => {
                    MechanismResult::Match
                }
                _ => MechanismResult::NoMatch,
            },

            Mechanism::Exists(target) => {
                if !ctx.count_lookup() {
                    return MechanismResult::PermError;
                }
                match self.resolver.lookup_ip(target) {
                    Ok(addrs) if addrs.iter().any(IpAddr::is_ipv4) => MechanismResult::Match,
                    Ok(_) | Err(LookupError::NotFound { .. }) => ctx.void_lookup(),
                    Err(_) => MechanismResult::TempError,
                }
            }
        }
    }

    /// Matches the client against the addresses of `host`.
    fn match_host(
        &self,
        ctx: &mut EvalContext,
        host: &str,
        prefix4: u8,
        prefix6: u8,
    ) -> MechanismResult {
        let addrs = match self.resolver.lookup_ip(host) {
            Ok(addrs) if addrs.is_empty() => return ctx.void_lookup(),
            Ok(addrs) => addrs,
            Err(LookupError::NotFound { .. }) => return ctx.void_lookup(),
            Err(_) => return MechanismResult::TempError,
        };

        let matched = addrs.iter().any(|addr| match (ctx.client_ip, addr) {
            (IpAddr::V4(client), IpAddr::V4(a)) => ip4_in_network(client, *a, prefix4),
            (IpAddr::V6(client), IpAddr::V6(a)) => ip6_in_network(client, *a, prefix6),
            _ => false,
        });
        if matched {
            MechanismResult::Match
        } else {
            MechanismResult::NoMatch
        }
    }

    fn match_mx(
        &self,
        ctx: &mut EvalContext,
        domain: &str,
        prefix4: u8,
        prefix6: u8,
    ) -> MechanismResult {
        let hosts = match self.resolver.lookup_mx(domain) {
            Ok(hosts) if hosts.is_empty() => return ctx.void_lookup(),
            Ok(hosts) => hosts,
            Err(LookupError::NotFound { .. }) => return ctx.void_lookup(),
            Err(_) => return MechanismResult::TempError,
        };
        if hosts.len() > MAX_MX_NAMES {
            return MechanismResult::PermError;
        }

        for host in &hosts {
            match self.match_host(ctx, host, prefix4, prefix6) {
                MechanismResult::NoMatch => continue,
                other => return other,
            }
        }
        MechanismResult::NoMatch
    }
}

/// Per-evaluation counters shared across include and redirect recursion.
struct EvalContext {
    client_ip: IpAddr,
    dns_lookups: usize,
    void_lookups: usize,
}

impl EvalContext {
    fn new(client_ip: IpAddr) -> Self {
        Self {
            client_ip,
            dns_lookups: 0,
            void_lookups: 0,
        }
    }

    /// Counts one DNS-querying term; `false` once the budget is exceeded.
    fn count_lookup(&mut self) -> bool {
        self.dns_lookups += 1;
        self.dns_lookups <= MAX_DNS_LOOKUPS
    }

    fn void_lookup(&mut self) -> MechanismResult {
        self.void_lookups += 1;
        if self.void_lookups > MAX_VOID_LOOKUPS {
            MechanismResult::PermError
        } else {
            MechanismResult::NoMatch
        }
    }
}

enum MechanismResult {
    Match,
    NoMatch,
    TempError,
    PermError,
}
