//! In-memory resolver.
//!
//! Holds a domain → TXT strings map and a domain → addresses map. Lookups are
//! pure map reads, so a seeded instance answers deterministically and never
//! touches the network. Each validation run builds and owns its own instance.

use std::collections::HashMap;
use std::net::IpAddr;

use super::{normalize_name, TxtResolver};
use crate::error_handling::LookupError;

/// Resolver answering from seeded maps.
#[derive(Debug, Clone, Default)]
pub struct SimulatedResolver {
    txt: HashMap<String, Vec<String>>,
    ip: HashMap<String, Vec<IpAddr>>,
}

impl SimulatedResolver {
    /// Creates an empty resolver; every lookup fails with `NotFound`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the TXT answers for `domain`, replacing any previous ones.
    pub fn set_txt<I, S>(&mut self, domain: &str, records: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.txt.insert(
            normalize_name(domain),
            records.into_iter().map(Into::into).collect(),
        );
    }

    /// Sets the addresses for `domain`, replacing any previous ones.
    pub fn set_ip(&mut self, domain: &str, addrs: Vec<IpAddr>) {
        self.ip.insert(normalize_name(domain), addrs);
    }
}

impl TxtResolver for SimulatedResolver {
    fn lookup_txt(&self, domain: &str) -> Result<Vec<String>, LookupError> {
        self.txt
            .get(&normalize_name(domain))
            .cloned()
            .ok_or_else(|| LookupError::NotFound {
                domain: domain.to_string(),
            })
    }

    fn lookup_ip(&self, domain: &str) -> Result<Vec<IpAddr>, LookupError> {
        self.ip
            .get(&normalize_name(domain))
            .cloned()
            .ok_or_else(|| LookupError::NotFound {
                domain: domain.to_string(),
            })
    }
}
