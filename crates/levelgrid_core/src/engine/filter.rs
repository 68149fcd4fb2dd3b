//! Cumulative filter evaluation over the capability collection.
//!
//! # Responsibility
//! - Apply a `MatrixFilters` specification with AND semantics across
//!   predicate kinds and set-membership within a kind.
//! - Reject malformed filter documents at the boundary, before the engine
//!   sees them.
//!
//! # Invariants
//! - An absent or empty predicate places no restriction; it never means
//!   "exclude everything".
//! - A capability whose `criterion_id` resolves to no known criterion is
//!   excluded, never a panic.
//! - Output preserves input order; display order is the assembler's concern.

use crate::model::matrix::{Capability, Criterion, MatrixFilters};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Boundary rejection for filter documents of the wrong shape.
#[derive(Debug)]
pub struct MalformedFilterError {
    message: String,
}

impl Display for MalformedFilterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "malformed filter document: {}", self.message)
    }
}

impl Error for MalformedFilterError {}

/// Parses a JSON filter document, rejecting wrong shapes (e.g. a string where
/// an array is expected) before they can reach the engine.
pub fn parse_filters(input: &str) -> Result<MatrixFilters, MalformedFilterError> {
    serde_json::from_str(input).map_err(|err| MalformedFilterError {
        message: err.to_string(),
    })
}

/// Returns the capabilities satisfying every supplied predicate.
pub fn filter_capabilities(
    capabilities: &[Capability],
    criteria: &[Criterion],
    filters: &MatrixFilters,
) -> Vec<Capability> {
    let criteria_by_id: HashMap<&str, &Criterion> = criteria
        .iter()
        .map(|criterion| (criterion.id.as_str(), criterion))
        .collect();

    let levels = active_set(&filters.levels);
    let categories = active_set(&filters.categories);
    let sub_categories = active_set(&filters.sub_categories);
    let search = normalized_search(filters.search.as_deref());

    capabilities
        .iter()
        .filter(|capability| {
            if let Some(levels) = &levels {
                if !levels.contains(capability.job_level_id.as_str()) {
                    return false;
                }
            }

            if categories.is_some() || sub_categories.is_some() {
                let Some(criterion) = criteria_by_id.get(capability.criterion_id.as_str()) else {
                    return false;
                };
                if let Some(categories) = &categories {
                    if !categories.contains(criterion.category.as_str()) {
                        return false;
                    }
                }
                if let Some(sub_categories) = &sub_categories {
                    if !sub_categories.contains(criterion.sub_category.as_str()) {
                        return false;
                    }
                }
            }

            if let Some(search) = &search {
                if !capability.description.to_lowercase().contains(search) {
                    return false;
                }
            }

            true
        })
        .cloned()
        .collect()
}

/// Trims and lowercases a search term. Blank input means "no restriction".
pub fn normalized_search(search: Option<&str>) -> Option<String> {
    let trimmed = search?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_lowercase())
}

fn active_set(values: &Option<Vec<String>>) -> Option<HashSet<&str>> {
    let values = values.as_ref()?;
    if values.is_empty() {
        return None;
    }
    Some(values.iter().map(String::as_str).collect())
}
