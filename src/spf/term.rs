//! SPF term grammar (RFC 7208 Section 4.6 and 5).
//!
//! Parses a complete `v=spf1` record into directives and the `redirect`
//! modifier for evaluation. Macro strings are carried unexpanded.

use std::net::{Ipv4Addr, Ipv6Addr};

use thiserror::Error;

/// Qualifier prefix on a directive. Defaults to Pass if omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Qualifier {
    Pass,     // +
    Fail,     // -
    SoftFail, // ~
    Neutral,  // ?
}

impl Qualifier {
    /// Splits a qualifier prefix off `term`. No prefix means Pass.
    fn parse_prefix(term: &str) -> (Qualifier, &str) {
        match term.as_bytes().first() {
            Some(b'+') => (Qualifier::Pass, &term[1..]),
            Some(b'-') => (Qualifier::Fail, &term[1..]),
            Some(b'~') => (Qualifier::SoftFail, &term[1..]),
            Some(b'?') => (Qualifier::Neutral, &term[1..]),
            _ => (Qualifier::Pass, term),
        }
    }
}

/// SPF mechanism (RFC 7208 Section 5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Mechanism {
    All,
    Include(String),
    A {
        domain: Option<String>,
        prefix4: u8,
        prefix6: u8,
    },
    Mx {
        domain: Option<String>,
        prefix4: u8,
        prefix6: u8,
    },
    Ptr(Option<String>),
    Ip4(Ipv4Addr, u8),
    Ip6(Ipv6Addr, u8),
    Exists(String),
}

/// A parsed `v=spf1` record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ParsedRecord {
    pub directives: Vec<(Qualifier, Mechanism)>,
    pub redirect: Option<String>,
}

/// Syntax errors. Every one of them evaluates to `permerror`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum TermError {
    #[error("invalid SPF version: expected 'v=spf1'")]
    InvalidVersion,
    #[error("unknown mechanism: {0}")]
    UnknownMechanism(String),
    #[error("missing required argument for {0}")]
    MissingArgument(String),
    #[error("invalid address in {0}")]
    InvalidAddress(String),
    #[error("invalid CIDR prefix in {0}")]
    InvalidCidr(String),
    #[error("duplicate modifier: {0}")]
    DuplicateModifier(String),
}

/// Returns `true` if `txt` is an SPF record by its version tag.
pub(crate) fn is_spf_record(txt: &str) -> bool {
    txt.split_whitespace()
        .next()
        .is_some_and(|tag| tag.eq_ignore_ascii_case("v=spf1"))
}

/// Parses a complete SPF record, version tag included.
pub(crate) fn parse_record(txt: &str) -> Result<ParsedRecord, TermError> {
    let mut terms = txt.split_whitespace();
    if !terms.next().is_some_and(|tag| tag.eq_ignore_ascii_case("v=spf1")) {
        return Err(TermError::InvalidVersion);
    }

    let mut record = ParsedRecord::default();
    let mut seen_exp = false;

    for term in terms {
        // name "=" macro-string; a '=' before any ':' or '/' marks a modifier
        if let Some((name, value)) = modifier_parts(term) {
            if name.eq_ignore_ascii_case("redirect") {
                if record.redirect.is_some() {
                    return Err(TermError::DuplicateModifier(term.to_string()));
                }
                record.redirect = Some(value.to_string());
            } else if name.eq_ignore_ascii_case("exp") {
                if seen_exp {
                    return Err(TermError::DuplicateModifier(term.to_string()));
                }
                seen_exp = true;
            }
            // Unknown modifiers are ignored (RFC 7208 6)
            continue;
        }

        let (qualifier, body) = Qualifier::parse_prefix(term);
        record.directives.push((qualifier, parse_mechanism(body)?));
    }

    Ok(record)
}

fn modifier_parts(term: &str) -> Option<(&str, &str)> {
    let (name, value) = term.split_once('=')?;
    let is_name = name.starts_with(|c: char| c.is_ascii_alphabetic())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    is_name.then_some((name, value))
}

fn parse_mechanism(body: &str) -> Result<Mechanism, TermError> {
    let name_end = body.find(|c: char| c == ':' || c == '/').unwrap_or(body.len());
    let (name, rest) = body.split_at(name_end);

    match name.to_ascii_lowercase().as_str() {
        "all" if rest.is_empty() => Ok(Mechanism::All),
        "include" => required_domain(name, rest).map(Mechanism::Include),
        "exists" => required_domain(name, rest).map(Mechanism::Exists),
        "ptr" => Ok(Mechanism::Ptr(optional_domain(rest))),
        "a" | "mx" => {
            let (domain_part, prefix4, prefix6) = parse_dual_cidr(body, rest)?;
            let domain = optional_domain(domain_part);
            if name.eq_ignore_ascii_case("a") {
                Ok(Mechanism::A {
                    domain,
                    prefix4,
                    prefix6,
                })
            } else {
                Ok(Mechanism::Mx {
                    domain,
                    prefix4,
                    prefix6,
                })
            }
        }
        "ip4" => {
            let value = rest
                .strip_prefix(':')
                .ok_or_else(|| TermError::MissingArgument(body.to_string()))?;
            let (addr, prefix) = split_prefix(body, value, 32)?;
            let addr = addr
                .parse()
                .map_err(|_| TermError::InvalidAddress(body.to_string()))?;
            Ok(Mechanism::Ip4(addr, prefix))
        }
        "ip6" => {
            let value = rest
                .strip_prefix(':')
                .ok_or_else(|| TermError::MissingArgument(body.to_string()))?;
            let (addr, prefix) = split_prefix(body, value, 128)?;
            let addr = addr
                .parse()
                .map_err(|_| TermError::InvalidAddress(body.to_string()))?;
            Ok(Mechanism::Ip6(addr, prefix))
        }
        _ => Err(TermError::UnknownMechanism(body.to_string())),
    }
}

fn required_domain(name: &str, rest: &str) -> Result<String, TermError> {
    rest.strip_prefix(':')
        .filter(|domain| !domain.is_empty())
        .map(str::to_string)
        .ok_or_else(|| TermError::MissingArgument(name.to_string()))
}

fn optional_domain(rest: &str) -> Option<String> {
    rest.strip_prefix(':')
        .filter(|domain| !domain.is_empty())
        .map(str::to_string)
}

/// Splits `addr[/prefix]`, checking the prefix against `max`.
fn split_prefix<'a>(body: &str, value: &'a str, max: u8) -> Result<(&'a str, u8), TermError> {
    match value.split_once('/') {
        Some((addr, prefix)) => {
            let prefix: u8 = prefix
                .parse()
                .map_err(|_| TermError::InvalidCidr(body.to_string()))?;
            if prefix > max {
                return Err(TermError::InvalidCidr(body.to_string()));
            }
            Ok((addr, prefix))
        }
        None => Ok((value, max)),
    }
}

/// Parses the `[:domain][/cidr4][//cidr6]` tail of `a`/`mx`.
fn parse_dual_cidr<'a>(body: &str, rest: &'a str) -> Result<(&'a str, u8, u8), TermError> {
    let mut domain_part = rest;
    let mut prefix6 = 128;
    let mut prefix4 = 32;

    if let Some(pos) = domain_part.find("//") {
        prefix6 = domain_part[pos + 2..]
            .parse()
            .map_err(|_| TermError::InvalidCidr(body.to_string()))?;
        if prefix6 > 128 {
            return Err(TermError::InvalidCidr(body.to_string()));
        }
        domain_part = &domain_part[..pos];
    }
    if let Some(pos) = domain_part.rfind('/') {
        prefix4 = domain_part[pos + 1..]
            .parse()
            .map_err(|_| TermError::InvalidCidr(body.to_string()))?;
        if prefix4 > 32 {
            return Err(TermError::InvalidCidr(body.to_string()));
        }
        domain_part = &domain_part[..pos];
    }

    Ok((domain_part, prefix4, prefix6))
}
