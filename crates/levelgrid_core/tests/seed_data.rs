use levelgrid_core::db::open_db_in_memory;
use levelgrid_core::{
    Capability, Criterion, EditHistoryEntry, JobLevel, MatrixData, MatrixFilters, MatrixRepository,
    MatrixService, OverviewKind, OverviewSections, RepoError, ServiceError,
    SqliteMatrixRepository,
};

fn payload() -> MatrixData {
    MatrixData {
        job_levels: vec![
            JobLevel::new("l1-l2", "L1 / L2", "Engineer", "Entry levels.", None, 0),
            JobLevel::new("l3", "L3", "Engineer", "Mid level.", None, 0),
            JobLevel::new(
                "tl1",
                "TL1",
                "Tech Lead",
                "First lead level.",
                Some("Progresses toward TL2.".to_string()),
                0,
            ),
        ],
        criteria: vec![
            Criterion::new("craft-technical-expertise", "Craft", "Technical Expertise"),
            Criterion::new("craft-quality", "Craft", "Quality"),
        ],
        capabilities: vec![
            Capability::new("l3", "craft-technical-expertise", "Strong technical skills"),
            Capability::new(
                "tl1",
                "craft-technical-expertise",
                "As L3, plus mentors others",
            ),
            Capability::new("l3", "craft-quality", "Tests thoroughly"),
        ],
        edit_history: vec![
            EditHistoryEntry {
                id: 0,
                date: "2024-01-15".to_string(),
                description: "Initial version".to_string(),
                created_at: 0,
            },
            EditHistoryEntry {
                id: 0,
                date: "2024-03-20".to_string(),
                description: "Added TL track".to_string(),
                created_at: 0,
            },
        ],
        overview: OverviewSections {
            goals: vec!["Shared language".to_string(), "Fair growth".to_string()],
            principles: vec!["Behaviors over titles".to_string()],
        },
    }
}

#[test]
fn seed_persists_every_collection_in_dependency_order() {
    let conn = open_db_in_memory().unwrap();
    let service = MatrixService::new(SqliteMatrixRepository::new(&conn));

    let summary = service.seed(&payload()).unwrap();
    assert_eq!(summary.job_levels, 3);
    assert_eq!(summary.criteria, 2);
    assert_eq!(summary.capabilities, 3);
    assert_eq!(summary.edit_history, 2);
    assert_eq!(summary.overview, 3);
    assert_eq!(summary.resolved_references, 1);
    assert_eq!(summary.unresolved_references, 0);

    let data = service.get_matrix_data(None).unwrap();
    assert_eq!(data.job_levels.len(), 3);
    assert_eq!(data.criteria.len(), 2);
    assert_eq!(data.capabilities.len(), 3);
    assert_eq!(data.edit_history.len(), 2);
}

#[test]
fn seed_assigns_positional_ranks_when_the_payload_has_none() {
    let conn = open_db_in_memory().unwrap();
    let service = MatrixService::new(SqliteMatrixRepository::new(&conn));
    service.seed(&payload()).unwrap();

    let data = service.get_matrix_data(None).unwrap();
    let ranks: Vec<(String, i64)> = data
        .job_levels
        .iter()
        .map(|level| (level.id.clone(), level.rank))
        .collect();
    assert_eq!(
        ranks,
        vec![
            ("l1-l2".to_string(), 1),
            ("l3".to_string(), 2),
            ("tl1".to_string(), 3),
        ]
    );
}

#[test]
fn seed_preserves_explicit_ranks() {
    let mut data = payload();
    data.job_levels[0].rank = 30;
    data.job_levels[1].rank = 20;
    data.job_levels[2].rank = 10;

    let conn = open_db_in_memory().unwrap();
    let service = MatrixService::new(SqliteMatrixRepository::new(&conn));
    service.seed(&data).unwrap();

    let loaded = service.get_matrix_data(None).unwrap();
    let ids: Vec<&str> = loaded
        .job_levels
        .iter()
        .map(|level| level.id.as_str())
        .collect();
    assert_eq!(ids, vec!["tl1", "l3", "l1-l2"]);
}

#[test]
fn overview_orders_continue_from_goals_to_principles() {
    let conn = open_db_in_memory().unwrap();
    let service = MatrixService::new(SqliteMatrixRepository::new(&conn));
    service.seed(&payload()).unwrap();

    let repo = SqliteMatrixRepository::new(&conn);
    let rows = repo.list_overview_content().unwrap();
    let ordered: Vec<(OverviewKind, &str, i64)> = rows
        .iter()
        .map(|row| (row.kind, row.content.as_str(), row.order))
        .collect();
    assert_eq!(
        ordered,
        vec![
            (OverviewKind::Goal, "Shared language", 1),
            (OverviewKind::Goal, "Fair growth", 2),
            (OverviewKind::Principle, "Behaviors over titles", 3),
        ]
    );

    let data = service.get_matrix_data(None).unwrap();
    assert_eq!(data.overview.goals, vec!["Shared language", "Fair growth"]);
    assert_eq!(data.overview.principles, vec!["Behaviors over titles"]);
}

#[test]
fn seed_tolerates_duplicate_capability_pairs() {
    let mut data = payload();
    data.capabilities.push(Capability::new(
        "l3",
        "craft-quality",
        "Tests thoroughly and early",
    ));

    let conn = open_db_in_memory().unwrap();
    let service = MatrixService::new(SqliteMatrixRepository::new(&conn));
    let summary = service.seed(&data).unwrap();
    assert_eq!(summary.capabilities, 4);

    // Both rows are stored; the assembled grid resolves the cell last-wins.
    let matrix = service.assemble_matrix(None).unwrap();
    let craft = matrix
        .categories
        .iter()
        .find(|group| group.category == "Craft")
        .unwrap();
    let quality = craft
        .sub_categories
        .iter()
        .find(|group| group.sub_category == "Quality")
        .unwrap();
    assert_eq!(
        quality.cells.get("l3").unwrap(),
        "Tests thoroughly and early"
    );
}

#[test]
fn seed_fails_when_a_capability_references_an_unknown_level() {
    let mut data = payload();
    data.capabilities
        .push(Capability::new("em9", "craft-quality", "Ghost level text"));

    let conn = open_db_in_memory().unwrap();
    let service = MatrixService::new(SqliteMatrixRepository::new(&conn));
    let err = service.seed(&data).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Repo(RepoError::MissingReference { entity: "job level", .. })
    ));
}

#[test]
fn seed_payload_round_trips_through_json() {
    let json = serde_json::to_string(&payload()).unwrap();
    assert!(json.contains("\"jobLevels\""));
    assert!(json.contains("\"editHistory\""));

    let parsed: MatrixData = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, payload());

    // Wire-named filter fields deserialize alongside the payload format.
    let filters: MatrixFilters =
        serde_json::from_str(r#"{"subCategories": ["Quality"]}"#).unwrap();
    assert_eq!(filters.sub_categories, Some(vec!["Quality".to_string()]));
}
