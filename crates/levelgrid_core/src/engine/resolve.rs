//! Seed-time expansion of `As <Level>` references in capability text.
//!
//! # Responsibility
//! - Expand descriptions of the form `"As L3, plus ..."` by substituting the
//!   referenced level's description for the same criterion.
//! - Report which base capabilities each description was expanded from, so
//!   the seeder can persist explicit reference links.
//!
//! # Invariants
//! - Resolution is single-hop and single-pass: a description that references
//!   another referencing description stays unresolved, and self-references
//!   cannot loop.
//! - An unresolvable reference is left verbatim and never fails resolution.
//! - Expansion happens once, before persistence; the expanded text is the
//!   stored description.

use crate::model::matrix::Capability;
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

// Matches the shorthand token as written in prose: "As L3", "As L1-L2".
// The captured level token is lowercased to form the referenced level id,
// consistent with how level ids are minted from names.
static REFERENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"As (L\d+(?:-L\d+)?)").expect("valid reference regex"));

/// One capability after reference expansion, with resolution metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCapability {
    /// The capability with its description fully expanded.
    pub capability: Capability,
    /// Distinct `(job_level_id, criterion_id)` keys substituted into the text.
    pub resolved_bases: Vec<(String, String)>,
    /// Level tokens whose base description could not be found.
    pub unresolved_tokens: Vec<String>,
}

impl ResolvedCapability {
    /// The single base key this description was expanded from, when exactly
    /// one distinct base was substituted. Used for explicit reference links.
    pub fn sole_base(&self) -> Option<&(String, String)> {
        match self.resolved_bases.as_slice() {
            [base] => Some(base),
            _ => None,
        }
    }
}

/// Expands every `As <Level>` occurrence across the given capabilities.
///
/// First pass collects base descriptions (those containing no reference
/// pattern) keyed by `(job_level_id, criterion_id)`. Second pass substitutes
/// each occurrence with the base for `(referenced level, same criterion)`,
/// leaving the literal text in place when no base exists.
pub fn resolve_references(capabilities: &[Capability]) -> Vec<ResolvedCapability> {
    let mut bases: HashMap<(&str, &str), &str> = HashMap::new();
    for capability in capabilities {
        if !REFERENCE_RE.is_match(&capability.description) {
            bases.insert(
                (
                    capability.job_level_id.as_str(),
                    capability.criterion_id.as_str(),
                ),
                capability.description.as_str(),
            );
        }
    }

    capabilities
        .iter()
        .map(|capability| resolve_one(capability, &bases))
        .collect()
}

fn resolve_one(
    capability: &Capability,
    bases: &HashMap<(&str, &str), &str>,
) -> ResolvedCapability {
    let mut resolved_bases: Vec<(String, String)> = Vec::new();
    let mut unresolved_tokens: Vec<String> = Vec::new();

    let expanded = REFERENCE_RE.replace_all(&capability.description, |caps: &regex::Captures| {
        let token = &caps[1];
        let referenced_level_id = token.to_lowercase();
        let key = (
            referenced_level_id.as_str(),
            capability.criterion_id.as_str(),
        );
        match bases.get(&key) {
            Some(base) => {
                let resolved_key = (referenced_level_id.clone(), capability.criterion_id.clone());
                if !resolved_bases.contains(&resolved_key) {
                    resolved_bases.push(resolved_key);
                }
                (*base).to_string()
            }
            None => {
                warn!(
                    "event=reference_resolve module=engine status=unresolved level_token={token} job_level_id={} criterion_id={}",
                    capability.job_level_id, capability.criterion_id
                );
                unresolved_tokens.push(token.to_string());
                caps[0].to_string()
            }
        }
    });

    let mut capability = capability.clone();
    capability.description = expanded.into_owned();

    ResolvedCapability {
        capability,
        resolved_bases,
        unresolved_tokens,
    }
}

#[cfg(test)]
mod tests {
    use super::REFERENCE_RE;

    #[test]
    fn reference_pattern_captures_simple_and_range_tokens() {
        let caps = REFERENCE_RE.captures("As L3, plus mentors others").unwrap();
        assert_eq!(&caps[1], "L3");

        let caps = REFERENCE_RE.captures("As L1-L2 with more scope").unwrap();
        assert_eq!(&caps[1], "L1-L2");
    }

    #[test]
    fn reference_pattern_ignores_prose_that_merely_starts_with_as() {
        assert!(!REFERENCE_RE.is_match("As Lead, sets direction"));
        assert!(!REFERENCE_RE.is_match("Acts as a multiplier for the team"));
    }

    #[test]
    fn reference_pattern_requires_digits_after_the_level_letter() {
        assert!(!REFERENCE_RE.is_match("As L, unclear"));
        assert!(REFERENCE_RE.is_match("As L10, operates org-wide"));
    }
}
