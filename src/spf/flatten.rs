//! Include flattening.
//!
//! Expands every `include:` depth-first, in place, and drops `all`
//! directives, producing one flat ordered mechanism pool. The traversal
//! tracks the chain of domains being expanded so that an include loop or an
//! excessively deep chain fails instead of recursing without bound.

use crate::config::MAX_INCLUDE_DEPTH;
use crate::dns::{normalize_name, TxtResolver};
use crate::error_handling::FlattenError;

use super::record::{lookup_spf, SpfRecord};

/// Flattens `record`, resolving its includes through `resolver`.
///
/// - `include:<d>` is replaced by the flattened mechanisms of `<d>`
/// - any mechanism containing `all` is dropped
/// - everything else is kept verbatim, in place
///
/// # Errors
///
/// Fails fast on the first nested lookup failure, include loop, chain
/// deeper than [`MAX_INCLUDE_DEPTH`], or `-`/`~`/`?` qualified include.
/// No partial result is returned.
pub fn flatten<R: TxtResolver + ?Sized>(
    resolver: &R,
    record: &SpfRecord,
) -> Result<Vec<String>, FlattenError> {
    let mut flattener = Flattener::new(resolver);
    flattener.expand(record, 0)?;
    Ok(flattener.finish())
}

/// Looks up the SPF record of `domain` and flattens it.
///
/// Unlike [`flatten`], `domain` itself is part of the loop guard, so a
/// chain that includes the starting domain again is reported as a loop.
///
/// # Errors
///
/// See [`flatten`]; the initial lookup failure is reported the same way.
pub fn flatten_domain<R: TxtResolver + ?Sized>(
    resolver: &R,
    domain: &str,
) -> Result<Vec<String>, FlattenError> {
    let record = lookup_spf(resolver, domain)?;
    let mut flattener = Flattener::new(resolver);
    flattener.path.push(normalize_name(domain));
    flattener.expand(&record, 0)?;
    Ok(flattener.finish())
}

/// Working state of one flatten call. Owned per call, never shared.
struct Flattener<'a, R: TxtResolver + ?Sized> {
    resolver: &'a R,
    /// Domains on the include chain currently being expanded
    path: Vec<String>,
    flattened: Vec<String>,
}

impl<'a, R: TxtResolver + ?Sized> Flattener<'a, R> {
    fn new(resolver: &'a R) -> Self {
        Self {
            resolver,
            path: Vec::new(),
            flattened: Vec::new(),
        }
    }

    fn expand(&mut self, record: &SpfRecord, depth: usize) -> Result<(), FlattenError> {
        for mechanism in &record.mechanisms {
            if let Some(domain) = include_target(mechanism) {
                if mechanism.starts_with(|c: char| matches!(c, '-' | '~' | '?')) {
                    return Err(FlattenError::QualifiedInclude {
                        mechanism: mechanism.clone(),
                    });
                }
                self.expand_include(domain, depth + 1)?;
            } else if mechanism.contains("all") {
                continue;
            } else {
                self.flattened.push(mechanism.clone());
            }
        }
        Ok(())
    }

    fn expand_include(&mut self, domain: &str, depth: usize) -> Result<(), FlattenError> {
        let key = normalize_name(domain);
        if self.path.contains(&key) {
            return Err(FlattenError::IncludeLoop {
                domain: domain.to_string(),
            });
        }
        if depth > MAX_INCLUDE_DEPTH {
            return Err(FlattenError::TooDeep {
                domain: domain.to_string(),
                depth,
            });
        }

        log::debug!("Expanding include {domain} (depth {depth})");
        let record = lookup_spf(self.resolver, domain)?;

        self.path.push(key);
        let result = self.expand(&record, depth);
        self.path.pop();
        result
    }

    fn finish(self) -> Vec<String> {
        self.flattened
    }
}

/// Returns the target of an `include:` mechanism, with or without a qualifier.
///
/// Only unqualified and `+` includes may be inlined; the caller rejects the
/// others.
fn include_target(mechanism: &str) -> Option<&str> {
    let unqualified = mechanism
        .strip_prefix(|c: char| matches!(c, '+' | '-' | '~' | '?'))
        .unwrap_or(mechanism);
    let (name, target) = unqualified.split_once(':')?;
    name.eq_ignore_ascii_case("include").then_some(target)
}
