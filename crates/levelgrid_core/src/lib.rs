//! Core engine for the career-level matrix.
//! This crate is the single source of truth for matrix assembly and query
//! invariants: reference resolution, cumulative filtering, grid assembly and
//! the facade external callers invoke.

pub mod db;
pub mod engine;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use engine::assemble::{assemble_matrix, AssembledMatrix, CategoryGroup, SubCategoryGroup};
pub use engine::filter::{filter_capabilities, parse_filters, MalformedFilterError};
pub use engine::resolve::{resolve_references, ResolvedCapability};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::matrix::{
    Capability, CreateCapabilityInput, CreateCriterionInput, CreateJobLevelInput, Criterion,
    EditHistoryEntry, JobLevel, MatrixData, MatrixFilters, OverviewContent, OverviewKind,
    OverviewSections,
};
pub use repo::matrix_repo::{MatrixRepository, SqliteMatrixRepository};
pub use repo::{RepoError, RepoResult};
pub use service::matrix_service::{
    FallbackDataProvider, MatrixService, SeedSummary, ServiceError,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
