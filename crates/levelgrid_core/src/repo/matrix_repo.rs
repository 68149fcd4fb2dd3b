//! Matrix storage contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide validated single-row creates and deterministic full-collection
//!   reads over the five matrix tables.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `create_capability` verifies both referenced dimension rows exist before
//!   inserting; nothing is written on a failed validation.
//! - Duplicate `(job_level_id, criterion_id)` pairs are tolerated with a
//!   warning, never a hard failure.
//! - Every list read carries an explicit ORDER BY; callers can rely on the
//!   order being stable across calls.

use crate::model::matrix::{
    Capability, CreateCapabilityInput, CreateCriterionInput, CreateJobLevelInput, Criterion,
    EditHistoryEntry, JobLevel, OverviewContent, OverviewKind,
};
use crate::repo::{RepoError, RepoResult};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension, Row};

const JOB_LEVEL_SELECT_SQL: &str = "SELECT
    id,
    name,
    primary_title,
    description_summary,
    trajectory_note,
    rank,
    created_at
FROM job_levels";

const CAPABILITY_SELECT_SQL: &str = "SELECT
    id,
    job_level_id,
    criterion_id,
    description,
    references_capability_id,
    created_at
FROM capabilities";

/// Storage contract the query facade is written against.
pub trait MatrixRepository {
    /// Creates one job level. Fails with `DuplicateId` when the id is taken.
    fn create_job_level(&self, input: &CreateJobLevelInput) -> RepoResult<JobLevel>;
    /// Creates one criterion. Fails with `DuplicateId` when the id is taken.
    fn create_criterion(&self, input: &CreateCriterionInput) -> RepoResult<Criterion>;
    /// Creates one capability after verifying both referenced rows exist.
    fn create_capability(&self, input: &CreateCapabilityInput) -> RepoResult<Capability>;
    /// Appends one edit-history entry.
    fn insert_edit_history(&self, date: &str, description: &str) -> RepoResult<EditHistoryEntry>;
    /// Inserts one overview row with its display rank.
    fn insert_overview_content(
        &self,
        kind: OverviewKind,
        content: &str,
        order: i64,
    ) -> RepoResult<OverviewContent>;
    /// Records the explicit base link a description was expanded from.
    fn link_capability_reference(
        &self,
        capability_id: i64,
        referenced_capability_id: i64,
    ) -> RepoResult<()>;

    /// All job levels, ordered by rank then id.
    fn list_job_levels(&self) -> RepoResult<Vec<JobLevel>>;
    /// All criteria, ordered by id.
    fn list_criteria(&self) -> RepoResult<Vec<Criterion>>;
    /// All capabilities, ordered by id.
    fn list_capabilities(&self) -> RepoResult<Vec<Capability>>;
    /// All edit-history entries, newest first by date, then created_at, then id.
    fn list_edit_history(&self) -> RepoResult<Vec<EditHistoryEntry>>;
    /// All overview rows, ascending by display rank, ties by id.
    fn list_overview_content(&self) -> RepoResult<Vec<OverviewContent>>;
}

/// SQLite-backed matrix repository.
pub struct SqliteMatrixRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMatrixRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn id_exists(&self, table: &str, id: &str) -> RepoResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                &format!("SELECT 1 FROM {table} WHERE id = ?1;"),
                [id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

impl MatrixRepository for SqliteMatrixRepository<'_> {
    fn create_job_level(&self, input: &CreateJobLevelInput) -> RepoResult<JobLevel> {
        let id = require_id(&input.id, "job level")?;
        if self.id_exists("job_levels", id)? {
            return Err(RepoError::DuplicateId {
                entity: "job level",
                id: id.to_string(),
            });
        }

        self.conn.execute(
            "INSERT INTO job_levels (
                id,
                name,
                primary_title,
                description_summary,
                trajectory_note,
                rank
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                id,
                input.name.as_str(),
                input.primary_title.as_str(),
                input.description_summary.as_str(),
                input.trajectory_note.as_deref(),
                input.rank,
            ],
        )?;

        let level = self.conn.query_row(
            &format!("{JOB_LEVEL_SELECT_SQL} WHERE id = ?1;"),
            [id],
            parse_job_level_row,
        )?;
        Ok(level)
    }

    fn create_criterion(&self, input: &CreateCriterionInput) -> RepoResult<Criterion> {
        let id = require_id(&input.id, "criterion")?;
        if self.id_exists("criteria", id)? {
            return Err(RepoError::DuplicateId {
                entity: "criterion",
                id: id.to_string(),
            });
        }

        self.conn.execute(
            "INSERT INTO criteria (id, category, sub_category) VALUES (?1, ?2, ?3);",
            params![id, input.category.as_str(), input.sub_category.as_str()],
        )?;

        let criterion = self.conn.query_row(
            "SELECT id, category, sub_category, created_at FROM criteria WHERE id = ?1;",
            [id],
            parse_criterion_row,
        )?;
        Ok(criterion)
    }

    fn create_capability(&self, input: &CreateCapabilityInput) -> RepoResult<Capability> {
        if !self.id_exists("job_levels", &input.job_level_id)? {
            return Err(RepoError::MissingReference {
                entity: "job level",
                id: input.job_level_id.clone(),
            });
        }
        if !self.id_exists("criteria", &input.criterion_id)? {
            return Err(RepoError::MissingReference {
                entity: "criterion",
                id: input.criterion_id.clone(),
            });
        }

        let pair_count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM capabilities WHERE job_level_id = ?1 AND criterion_id = ?2;",
            params![input.job_level_id.as_str(), input.criterion_id.as_str()],
            |row| row.get(0),
        )?;
        if pair_count > 0 {
            warn!(
                "event=capability_create module=repo status=duplicate_pair job_level_id={} criterion_id={}",
                input.job_level_id, input.criterion_id
            );
        }

        self.conn.execute(
            "INSERT INTO capabilities (job_level_id, criterion_id, description)
             VALUES (?1, ?2, ?3);",
            params![
                input.job_level_id.as_str(),
                input.criterion_id.as_str(),
                input.description.as_str(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();

        let capability = self.conn.query_row(
            &format!("{CAPABILITY_SELECT_SQL} WHERE id = ?1;"),
            [id],
            parse_capability_row,
        )?;
        Ok(capability)
    }

    fn insert_edit_history(&self, date: &str, description: &str) -> RepoResult<EditHistoryEntry> {
        self.conn.execute(
            "INSERT INTO edit_history (date, description) VALUES (?1, ?2);",
            params![date, description],
        )?;
        let id = self.conn.last_insert_rowid();

        let entry = self.conn.query_row(
            "SELECT id, date, description, created_at FROM edit_history WHERE id = ?1;",
            [id],
            parse_edit_history_row,
        )?;
        Ok(entry)
    }

    fn insert_overview_content(
        &self,
        kind: OverviewKind,
        content: &str,
        order: i64,
    ) -> RepoResult<OverviewContent> {
        self.conn.execute(
            "INSERT INTO overview_content (type, content, display_order) VALUES (?1, ?2, ?3);",
            params![overview_kind_to_db(kind), content, order],
        )?;
        let id = self.conn.last_insert_rowid();

        let row = self.conn.query_row(
            "SELECT id, type, content, display_order, created_at
             FROM overview_content WHERE id = ?1;",
            [id],
            |row| Ok(parse_overview_row(row)),
        )??;
        Ok(row)
    }

    fn link_capability_reference(
        &self,
        capability_id: i64,
        referenced_capability_id: i64,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE capabilities SET references_capability_id = ?1 WHERE id = ?2;",
            params![referenced_capability_id, capability_id],
        )?;
        if changed == 0 {
            return Err(RepoError::InvalidData(format!(
                "capability {capability_id} vanished before reference linking"
            )));
        }
        Ok(())
    }

    fn list_job_levels(&self) -> RepoResult<Vec<JobLevel>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{JOB_LEVEL_SELECT_SQL} ORDER BY rank ASC, id ASC;"))?;
        let rows = stmt.query_map([], parse_job_level_row)?;
        collect_rows(rows)
    }

    fn list_criteria(&self) -> RepoResult<Vec<Criterion>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, category, sub_category, created_at FROM criteria ORDER BY id ASC;",
        )?;
        let rows = stmt.query_map([], parse_criterion_row)?;
        collect_rows(rows)
    }

    fn list_capabilities(&self) -> RepoResult<Vec<Capability>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CAPABILITY_SELECT_SQL} ORDER BY id ASC;"))?;
        let rows = stmt.query_map([], parse_capability_row)?;
        collect_rows(rows)
    }

    fn list_edit_history(&self) -> RepoResult<Vec<EditHistoryEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, description, created_at
             FROM edit_history
             ORDER BY date DESC, created_at DESC, id DESC;",
        )?;
        let rows = stmt.query_map([], parse_edit_history_row)?;
        collect_rows(rows)
    }

    fn list_overview_content(&self) -> RepoResult<Vec<OverviewContent>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, type, content, display_order, created_at
             FROM overview_content
             ORDER BY display_order ASC, id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut content = Vec::new();
        while let Some(row) = rows.next()? {
            content.push(parse_overview_row(row)?);
        }
        Ok(content)
    }
}

fn collect_rows<T>(
    rows: impl Iterator<Item = Result<T, rusqlite::Error>>,
) -> RepoResult<Vec<T>> {
    let mut collected = Vec::new();
    for row in rows {
        collected.push(row?);
    }
    Ok(collected)
}

fn require_id<'a>(id: &'a str, entity: &'static str) -> RepoResult<&'a str> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(RepoError::InvalidData(format!("{entity} id cannot be empty")));
    }
    Ok(trimmed)
}

fn parse_job_level_row(row: &Row<'_>) -> Result<JobLevel, rusqlite::Error> {
    Ok(JobLevel {
        id: row.get("id")?,
        name: row.get("name")?,
        primary_title: row.get("primary_title")?,
        description_summary: row.get("description_summary")?,
        trajectory_note: row.get("trajectory_note")?,
        rank: row.get("rank")?,
        created_at: row.get("created_at")?,
    })
}

fn parse_criterion_row(row: &Row<'_>) -> Result<Criterion, rusqlite::Error> {
    Ok(Criterion {
        id: row.get("id")?,
        category: row.get("category")?,
        sub_category: row.get("sub_category")?,
        created_at: row.get("created_at")?,
    })
}

fn parse_capability_row(row: &Row<'_>) -> Result<Capability, rusqlite::Error> {
    Ok(Capability {
        id: row.get("id")?,
        job_level_id: row.get("job_level_id")?,
        criterion_id: row.get("criterion_id")?,
        description: row.get("description")?,
        references_capability_id: row.get("references_capability_id")?,
        created_at: row.get("created_at")?,
    })
}

fn parse_edit_history_row(row: &Row<'_>) -> Result<EditHistoryEntry, rusqlite::Error> {
    Ok(EditHistoryEntry {
        id: row.get("id")?,
        date: row.get("date")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
    })
}

fn parse_overview_row(row: &Row<'_>) -> RepoResult<OverviewContent> {
    let kind_text: String = row.get("type")?;
    let kind = parse_overview_kind(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid overview kind `{kind_text}` in overview_content.type"
        ))
    })?;

    Ok(OverviewContent {
        id: row.get("id")?,
        kind,
        content: row.get("content")?,
        order: row.get("display_order")?,
        created_at: row.get("created_at")?,
    })
}

fn overview_kind_to_db(kind: OverviewKind) -> &'static str {
    match kind {
        OverviewKind::Goal => "goal",
        OverviewKind::Principle => "principle",
    }
}

fn parse_overview_kind(value: &str) -> Option<OverviewKind> {
    match value {
        "goal" => Some(OverviewKind::Goal),
        "principle" => Some(OverviewKind::Principle),
        _ => None,
    }
}
