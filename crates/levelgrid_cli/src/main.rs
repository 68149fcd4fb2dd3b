//! CLI entry point for seeding and inspecting a matrix database.
//!
//! # Responsibility
//! - Open (and migrate) a matrix database, optionally seed it from a
//!   `MatrixData` JSON payload, and print a deterministic summary.
//! - Keep output stable for quick local sanity checks.

use levelgrid_core::db::open_db;
use levelgrid_core::{MatrixData, MatrixService, SqliteMatrixRepository};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let Some(db_path) = args.next() else {
        eprintln!("usage: levelgrid_cli <db-path> [seed.json]");
        return ExitCode::FAILURE;
    };
    let seed_path = args.next();

    match run(&db_path, seed_path.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("levelgrid_cli: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(db_path: &str, seed_path: Option<&str>) -> Result<(), String> {
    let conn = open_db(db_path).map_err(|err| format!("failed to open `{db_path}`: {err}"))?;
    let service = MatrixService::new(SqliteMatrixRepository::new(&conn));

    if let Some(seed_path) = seed_path {
        let payload = std::fs::read_to_string(seed_path)
            .map_err(|err| format!("failed to read `{seed_path}`: {err}"))?;
        let data: MatrixData = serde_json::from_str(&payload)
            .map_err(|err| format!("malformed seed payload `{seed_path}`: {err}"))?;
        let summary = service
            .seed(&data)
            .map_err(|err| format!("seed failed: {err}"))?;
        println!(
            "seeded job_levels={} criteria={} capabilities={} edit_history={} overview={} resolved_references={} unresolved_references={}",
            summary.job_levels,
            summary.criteria,
            summary.capabilities,
            summary.edit_history,
            summary.overview,
            summary.resolved_references,
            summary.unresolved_references
        );
    }

    let matrix = service
        .assemble_matrix(None)
        .map_err(|err| format!("query failed: {err}"))?;

    println!("levelgrid_core version={}", levelgrid_core::core_version());
    println!("levels: {}", matrix.visible_levels.join(", "));
    for category in &matrix.categories {
        println!("{}", category.category);
        for group in &category.sub_categories {
            println!("  {} ({} cells)", group.sub_category, group.cells.len());
        }
    }

    Ok(())
}
