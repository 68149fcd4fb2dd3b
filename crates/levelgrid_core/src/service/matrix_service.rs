//! Query facade over the matrix repository and engine.
//!
//! # Responsibility
//! - Compose filter evaluation and grid assembly with the stored collections
//!   into the single response object external callers consume.
//! - Own the administrative write entry points and the bulk seed path.
//!
//! # Invariants
//! - `job_levels` and `criteria` in a response are always the full
//!   collections; filters only narrow `capabilities`.
//! - Read failures propagate unchanged unless an explicit fallback provider
//!   was configured; write failures never fall back.
//! - The seed path persists in dependency order: levels and criteria before
//!   the capabilities that reference them.

use crate::engine::assemble::{assemble_matrix, AssembledMatrix};
use crate::engine::filter::{filter_capabilities, parse_filters, MalformedFilterError};
use crate::engine::resolve::resolve_references;
use crate::model::matrix::{
    Capability, CreateCapabilityInput, CreateCriterionInput, CreateJobLevelInput, Criterion,
    EditHistoryEntry, JobLevel, MatrixData, MatrixFilters, OverviewContent, OverviewKind,
    OverviewSections,
};
use crate::repo::matrix_repo::MatrixRepository;
use crate::repo::RepoError;
use log::{info, warn};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Facade-level error for matrix queries and writes.
#[derive(Debug)]
pub enum ServiceError {
    Repo(RepoError),
    MalformedFilter(MalformedFilterError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::MalformedFilter(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::MalformedFilter(err) => Some(err),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<MalformedFilterError> for ServiceError {
    fn from(value: MalformedFilterError) -> Self {
        Self::MalformedFilter(value)
    }
}

/// Explicit collaborator consulted when a primary store read fails.
///
/// Configured per service instance, never global state. Providers return a
/// complete payload; the filter engine still runs over it, so the response
/// contract is identical on both paths.
pub trait FallbackDataProvider {
    fn matrix_data(&self) -> MatrixData;
}

/// Counts reported by a completed bulk seed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub job_levels: usize,
    pub criteria: usize,
    pub capabilities: usize,
    pub edit_history: usize,
    pub overview: usize,
    /// Capabilities whose description was expanded from a base capability.
    pub resolved_references: usize,
    /// Reference tokens left verbatim because no base description existed.
    pub unresolved_references: usize,
}

/// Single entry point for matrix queries, writes and bulk loading.
pub struct MatrixService<R: MatrixRepository> {
    repo: R,
    fallback: Option<Box<dyn FallbackDataProvider>>,
}

impl<R: MatrixRepository> MatrixService<R> {
    /// Creates a facade using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            fallback: None,
        }
    }

    /// Configures the fallback provider consulted on failed store reads.
    pub fn with_fallback(mut self, provider: Box<dyn FallbackDataProvider>) -> Self {
        self.fallback = Some(provider);
        self
    }

    /// Returns the full response payload for one query.
    ///
    /// `job_levels` and `criteria` are always complete; `capabilities` is
    /// narrowed by the filter engine; `edit_history` is newest-first;
    /// `overview` is split by kind in display order.
    pub fn get_matrix_data(
        &self,
        filters: Option<&MatrixFilters>,
    ) -> Result<MatrixData, ServiceError> {
        let unrestricted = MatrixFilters::default();
        let filters = filters.unwrap_or(&unrestricted);
        let mut data = self.load_snapshot()?;

        data.capabilities = filter_capabilities(&data.capabilities, &data.criteria, filters);
        sort_edit_history(&mut data.edit_history);
        Ok(data)
    }

    /// Parses a JSON filter document and runs `get_matrix_data` with it.
    ///
    /// Wrong-shaped documents are rejected here, before the engine runs.
    pub fn get_matrix_data_from_json(
        &self,
        filters_json: Option<&str>,
    ) -> Result<MatrixData, ServiceError> {
        let filters = match filters_json {
            Some(json) => Some(parse_filters(json)?),
            None => None,
        };
        self.get_matrix_data(filters.as_ref())
    }

    /// Composes filter evaluation and grid assembly over one snapshot.
    pub fn assemble_matrix(
        &self,
        filters: Option<&MatrixFilters>,
    ) -> Result<AssembledMatrix, ServiceError> {
        let unrestricted = MatrixFilters::default();
        let filters = filters.unwrap_or(&unrestricted);
        let data = self.load_snapshot()?;

        let filtered = filter_capabilities(&data.capabilities, &data.criteria, filters);
        Ok(assemble_matrix(
            &filtered,
            &data.criteria,
            &data.job_levels,
            filters,
        ))
    }

    /// Flat capability search for incremental/typeahead use.
    ///
    /// `query` is the search predicate; a `search` field inside `filters` is
    /// ignored on this path.
    pub fn search_capabilities(
        &self,
        query: &str,
        filters: Option<&MatrixFilters>,
    ) -> Result<Vec<Capability>, ServiceError> {
        let mut effective = filters.cloned().unwrap_or_default();
        effective.search = Some(query.to_string());

        let data = self.load_snapshot()?;
        Ok(filter_capabilities(
            &data.capabilities,
            &data.criteria,
            &effective,
        ))
    }

    /// Creates one job level. Fails with `DuplicateId` when the id is taken.
    pub fn create_job_level(&self, input: &CreateJobLevelInput) -> Result<JobLevel, ServiceError> {
        let level = self.repo.create_job_level(input)?;
        info!(
            "event=job_level_create module=service status=ok id={} rank={}",
            level.id, level.rank
        );
        Ok(level)
    }

    /// Creates one criterion. Fails with `DuplicateId` when the id is taken.
    pub fn create_criterion(
        &self,
        input: &CreateCriterionInput,
    ) -> Result<Criterion, ServiceError> {
        let criterion = self.repo.create_criterion(input)?;
        info!(
            "event=criterion_create module=service status=ok id={}",
            criterion.id
        );
        Ok(criterion)
    }

    /// Creates one capability. Fails with `MissingReference` before any row
    /// is written when either referenced id does not exist.
    pub fn create_capability(
        &self,
        input: &CreateCapabilityInput,
    ) -> Result<Capability, ServiceError> {
        let capability = self.repo.create_capability(input)?;
        info!(
            "event=capability_create module=service status=ok id={} job_level_id={} criterion_id={}",
            capability.id, capability.job_level_id, capability.criterion_id
        );
        Ok(capability)
    }

    /// Loads a full payload into the store.
    ///
    /// Runs the reference resolver over the capabilities first, then persists
    /// in dependency order: job levels, criteria, resolved capabilities, edit
    /// history, overview content. A failed insert fails the seed.
    pub fn seed(&self, data: &MatrixData) -> Result<SeedSummary, ServiceError> {
        info!(
            "event=seed module=service status=start job_levels={} criteria={} capabilities={}",
            data.job_levels.len(),
            data.criteria.len(),
            data.capabilities.len()
        );
        let mut summary = SeedSummary::default();

        // Payloads distilled from display data often carry no ranks at all;
        // payload position is the authored order in that case.
        let positional_ranks = data.job_levels.iter().all(|level| level.rank == 0);
        for (index, level) in data.job_levels.iter().enumerate() {
            let rank = if positional_ranks {
                index as i64 + 1
            } else {
                level.rank
            };
            self.repo.create_job_level(&CreateJobLevelInput {
                id: level.id.clone(),
                name: level.name.clone(),
                primary_title: level.primary_title.clone(),
                description_summary: level.description_summary.clone(),
                trajectory_note: level.trajectory_note.clone(),
                rank,
            })?;
            summary.job_levels += 1;
        }

        for criterion in &data.criteria {
            self.repo.create_criterion(&CreateCriterionInput {
                id: criterion.id.clone(),
                category: criterion.category.clone(),
                sub_category: criterion.sub_category.clone(),
            })?;
            summary.criteria += 1;
        }

        let resolved = resolve_references(&data.capabilities);
        let mut ids_by_pair: HashMap<(String, String), i64> = HashMap::new();
        let mut pending_links: Vec<(i64, (String, String))> = Vec::new();

        for item in &resolved {
            let created = self.repo.create_capability(&CreateCapabilityInput {
                job_level_id: item.capability.job_level_id.clone(),
                criterion_id: item.capability.criterion_id.clone(),
                description: item.capability.description.clone(),
            })?;
            summary.capabilities += 1;
            summary.unresolved_references += item.unresolved_tokens.len();
            if !item.resolved_bases.is_empty() {
                summary.resolved_references += 1;
            }

            ids_by_pair.insert(
                (
                    created.job_level_id.clone(),
                    created.criterion_id.clone(),
                ),
                created.id,
            );
            if let Some(base) = item.sole_base() {
                pending_links.push((created.id, base.clone()));
            }
        }

        for (capability_id, base_key) in pending_links {
            if let Some(&referenced_id) = ids_by_pair.get(&base_key) {
                if referenced_id != capability_id {
                    self.repo
                        .link_capability_reference(capability_id, referenced_id)?;
                }
            }
        }

        for entry in &data.edit_history {
            self.repo
                .insert_edit_history(&entry.date, &entry.description)?;
            summary.edit_history += 1;
        }

        for (index, goal) in data.overview.goals.iter().enumerate() {
            self.repo
                .insert_overview_content(OverviewKind::Goal, goal, index as i64 + 1)?;
            summary.overview += 1;
        }
        let goal_count = data.overview.goals.len();
        for (index, principle) in data.overview.principles.iter().enumerate() {
            self.repo.insert_overview_content(
                OverviewKind::Principle,
                principle,
                (goal_count + index) as i64 + 1,
            )?;
            summary.overview += 1;
        }

        info!(
            "event=seed module=service status=ok capabilities={} resolved_references={} unresolved_references={}",
            summary.capabilities, summary.resolved_references, summary.unresolved_references
        );
        Ok(summary)
    }

    fn load_snapshot(&self) -> Result<MatrixData, ServiceError> {
        match self.read_store() {
            Ok(data) => Ok(data),
            Err(err) => match &self.fallback {
                Some(provider) => {
                    warn!(
                        "event=matrix_read module=service status=fallback error={err}"
                    );
                    Ok(provider.matrix_data())
                }
                None => Err(err.into()),
            },
        }
    }

    fn read_store(&self) -> Result<MatrixData, RepoError> {
        Ok(MatrixData {
            job_levels: self.repo.list_job_levels()?,
            criteria: self.repo.list_criteria()?,
            capabilities: self.repo.list_capabilities()?,
            edit_history: self.repo.list_edit_history()?,
            overview: split_overview(&self.repo.list_overview_content()?),
        })
    }
}

/// Splits ordered overview rows into their goal/principle sections.
fn split_overview(rows: &[OverviewContent]) -> OverviewSections {
    let mut sections = OverviewSections::default();
    for row in rows {
        match row.kind {
            OverviewKind::Goal => sections.goals.push(row.content.clone()),
            OverviewKind::Principle => sections.principles.push(row.content.clone()),
        }
    }
    sections
}

fn sort_edit_history(entries: &mut [EditHistoryEntry]) {
    entries.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| b.id.cmp(&a.id))
    });
}
