//! Career-matrix domain model.
//!
//! # Responsibility
//! - Define the canonical records every other module consumes: job levels,
//!   criteria, capabilities, edit history and overview content.
//! - Define the request/response shapes of the query surface (filters,
//!   `MatrixData`) and the administrative create inputs.
//!
//! # Invariants
//! - Records are immutable once created; a change is a new record with a new
//!   `created_at`. No in-place mutation API exists on this layer.
//! - `JobLevel::rank` is the only source of level ordering. Ordering is never
//!   derived from id or name strings.
//! - Wire field names (`jobLevels`, `subCategories`, `order`, ...) match the
//!   external API and bulk-load payload format.

use serde::{Deserialize, Serialize};

/// One rung of the career ladder, e.g. `l3` or `tl1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobLevel {
    /// Stable slug, unique across all levels (e.g. `"l1-l2"`, `"tl1"`).
    pub id: String,
    /// Display label (e.g. `"L1 / L2"`, `"TL1"`).
    pub name: String,
    /// Role family this level belongs to (e.g. `"Engineer"`).
    pub primary_title: String,
    /// One-sentence description of the level.
    pub description_summary: String,
    /// Optional progression guidance; `None` means no guidance given.
    pub trajectory_note: Option<String>,
    /// Explicit display rank, set at creation. Drives all level ordering.
    #[serde(default)]
    pub rank: i64,
    /// Creation time in epoch milliseconds. Assigned by the store.
    #[serde(default)]
    pub created_at: i64,
}

impl JobLevel {
    /// Builds a level record as it exists before persistence.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        primary_title: impl Into<String>,
        description_summary: impl Into<String>,
        trajectory_note: Option<String>,
        rank: i64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            primary_title: primary_title.into(),
            description_summary: description_summary.into(),
            trajectory_note,
            rank,
            created_at: 0,
        }
    }
}

/// One evaluation axis, identified by a (category, sub-category) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    /// Stable slug, unique across all criteria (e.g. `"craft-technical-expertise"`).
    pub id: String,
    /// Coarse grouping (e.g. `"Craft"`).
    pub category: String,
    /// Specific axis within the category (e.g. `"Technical Expertise"`).
    pub sub_category: String,
    #[serde(default)]
    pub created_at: i64,
}

impl Criterion {
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        sub_category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            sub_category: sub_category.into(),
            created_at: 0,
        }
    }
}

/// The expected-behavior text for one (job level, criterion) cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    /// Surrogate row id. Assigned by the store; 0 before persistence.
    #[serde(default)]
    pub id: i64,
    /// References `JobLevel::id`.
    pub job_level_id: String,
    /// References `Criterion::id`.
    pub criterion_id: String,
    /// Cell text. Stored fully expanded; see `engine::resolve`.
    pub description: String,
    /// Explicit link to the base capability this description was expanded
    /// from, when the seed-time resolver substituted exactly one base.
    #[serde(default)]
    pub references_capability_id: Option<i64>,
    #[serde(default)]
    pub created_at: i64,
}

impl Capability {
    pub fn new(
        job_level_id: impl Into<String>,
        criterion_id: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            job_level_id: job_level_id.into(),
            criterion_id: criterion_id.into(),
            description: description.into(),
            references_capability_id: None,
            created_at: 0,
        }
    }
}

/// Append-only log entry describing a change to the matrix content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditHistoryEntry {
    #[serde(default)]
    pub id: i64,
    /// Calendar date of the edit, ISO 8601 `YYYY-MM-DD` (sortable as text).
    pub date: String,
    pub description: String,
    #[serde(default)]
    pub created_at: i64,
}

/// Kind discriminator for overview rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverviewKind {
    Goal,
    Principle,
}

/// One goal or principle line from the framework overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverviewContent {
    #[serde(default)]
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: OverviewKind,
    pub content: String,
    /// Display rank within its kind, ascending.
    pub order: i64,
    #[serde(default)]
    pub created_at: i64,
}

/// Cumulative (AND) filter specification for matrix queries.
///
/// Every field is optional; an absent or empty field places no restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixFilters {
    /// Job level ids to keep.
    pub levels: Option<Vec<String>>,
    /// Category names to keep.
    pub categories: Option<Vec<String>>,
    /// Sub-category names to keep.
    #[serde(rename = "subCategories")]
    pub sub_categories: Option<Vec<String>>,
    /// Case-insensitive substring test against capability descriptions.
    pub search: Option<String>,
}

/// Goals and principles split out of the overview rows, each in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverviewSections {
    pub goals: Vec<String>,
    pub principles: Vec<String>,
}

/// The full query response, and also the bulk-load payload shape.
///
/// `job_levels` and `criteria` are always the complete collections; filters
/// only narrow `capabilities`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixData {
    #[serde(rename = "jobLevels")]
    pub job_levels: Vec<JobLevel>,
    pub criteria: Vec<Criterion>,
    pub capabilities: Vec<Capability>,
    #[serde(rename = "editHistory")]
    pub edit_history: Vec<EditHistoryEntry>,
    pub overview: OverviewSections,
}

/// Input for `create_job_level`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateJobLevelInput {
    pub id: String,
    pub name: String,
    pub primary_title: String,
    pub description_summary: String,
    pub trajectory_note: Option<String>,
    /// Explicit display rank; see `JobLevel::rank`.
    pub rank: i64,
}

/// Input for `create_criterion`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCriterionInput {
    pub id: String,
    pub category: String,
    pub sub_category: String,
}

/// Input for `create_capability`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCapabilityInput {
    pub job_level_id: String,
    pub criterion_id: String,
    pub description: String,
}
