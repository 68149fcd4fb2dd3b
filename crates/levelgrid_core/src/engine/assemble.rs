//! Display-grid assembly for filtered capability sets.
//!
//! # Responsibility
//! - Reshape a filtered capability set into the nested
//!   category → sub-category → level grid used for rendering.
//! - Compute the visible level set for the query.
//!
//! # Invariants
//! - Groups emptied by filtering are pruned, not shown as empty rows.
//! - Sub-categories are ordered lexicographically; categories keep first-seen
//!   order over the filtered set.
//! - A missing cell is absent from the map; absence means "no description
//!   available", not an error.
//! - Duplicate `(job_level_id, criterion_id)` cells resolve deterministically:
//!   the capability with the greatest id wins.

use crate::model::matrix::{Capability, Criterion, JobLevel, MatrixFilters};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

/// One sub-category row: level id → capability description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubCategoryGroup {
    pub sub_category: String,
    pub cells: BTreeMap<String, String>,
}

/// One category block, sub-categories in lexicographic order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryGroup {
    pub category: String,
    pub sub_categories: Vec<SubCategoryGroup>,
}

/// The assembled display grid plus the column set of the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssembledMatrix {
    /// Level ids forming the matrix columns, ordered by rank. Restricted to
    /// the `levels` predicate when one is supplied, independent of whether
    /// every column has data.
    pub visible_levels: Vec<String>,
    /// Category blocks in first-seen order over the filtered capabilities.
    pub categories: Vec<CategoryGroup>,
}

/// Builds the nested grid from an already-filtered capability set.
pub fn assemble_matrix(
    filtered: &[Capability],
    criteria: &[Criterion],
    job_levels: &[JobLevel],
    filters: &MatrixFilters,
) -> AssembledMatrix {
    let criteria_by_id: HashMap<&str, &Criterion> = criteria
        .iter()
        .map(|criterion| (criterion.id.as_str(), criterion))
        .collect();

    // category → sub_category → level id → (winning id, description)
    let mut category_order: Vec<String> = Vec::new();
    let mut grid: HashMap<String, BTreeMap<String, BTreeMap<String, (i64, String)>>> =
        HashMap::new();

    for capability in filtered {
        let Some(criterion) = criteria_by_id.get(capability.criterion_id.as_str()) else {
            continue;
        };

        if !grid.contains_key(&criterion.category) {
            category_order.push(criterion.category.clone());
        }
        let cell = grid
            .entry(criterion.category.clone())
            .or_default()
            .entry(criterion.sub_category.clone())
            .or_default()
            .entry(capability.job_level_id.clone());

        cell.and_modify(|existing| {
            if capability.id >= existing.0 {
                *existing = (capability.id, capability.description.clone());
            }
        })
        .or_insert_with(|| (capability.id, capability.description.clone()));
    }

    let categories = category_order
        .into_iter()
        .filter_map(|category| {
            let sub_categories = grid.remove(&category)?;
            Some(CategoryGroup {
                category,
                sub_categories: sub_categories
                    .into_iter()
                    .map(|(sub_category, cells)| SubCategoryGroup {
                        sub_category,
                        cells: cells
                            .into_iter()
                            .map(|(level_id, (_, description))| (level_id, description))
                            .collect(),
                    })
                    .collect(),
            })
        })
        .collect();

    AssembledMatrix {
        visible_levels: visible_levels(job_levels, filters),
        categories,
    }
}

/// The level ids forming the matrix columns, ordered by `rank` then id.
///
/// Ids in the `levels` predicate that match no known level are dropped.
pub fn visible_levels(job_levels: &[JobLevel], filters: &MatrixFilters) -> Vec<String> {
    let restriction: Option<HashSet<&str>> = match &filters.levels {
        Some(levels) if !levels.is_empty() => {
            Some(levels.iter().map(String::as_str).collect())
        }
        _ => None,
    };

    let mut levels: Vec<&JobLevel> = job_levels
        .iter()
        .filter(|level| match &restriction {
            Some(ids) => ids.contains(level.id.as_str()),
            None => true,
        })
        .collect();
    levels.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.id.cmp(&b.id)));
    levels.into_iter().map(|level| level.id.clone()).collect()
}
