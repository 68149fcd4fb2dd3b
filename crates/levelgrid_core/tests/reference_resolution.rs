use levelgrid_core::db::open_db;
use levelgrid_core::{
    resolve_references, Capability, JobLevel, MatrixData, MatrixService, SqliteMatrixRepository,
};

fn cap(level: &str, criterion: &str, description: &str) -> Capability {
    Capability::new(level, criterion, description)
}

#[test]
fn single_hop_reference_is_expanded() {
    let capabilities = vec![
        cap("l3", "crit", "Strong technical skills"),
        cap("tl1", "crit", "As L3, plus mentors others"),
    ];

    let resolved = resolve_references(&capabilities);
    assert_eq!(
        resolved[1].capability.description,
        "Strong technical skills, plus mentors others"
    );
    assert_eq!(
        resolved[1].resolved_bases,
        vec![("l3".to_string(), "crit".to_string())]
    );
    assert!(resolved[1].unresolved_tokens.is_empty());
}

#[test]
fn unresolvable_reference_is_left_verbatim() {
    let capabilities = vec![cap("tl1", "crit", "As L9, plus everything else")];

    let resolved = resolve_references(&capabilities);
    assert_eq!(
        resolved[0].capability.description,
        "As L9, plus everything else"
    );
    assert_eq!(resolved[0].unresolved_tokens, vec!["L9".to_string()]);
    assert!(resolved[0].resolved_bases.is_empty());
}

#[test]
fn reference_to_another_criterion_is_not_used() {
    // Base exists for L3 but under a different criterion.
    let capabilities = vec![
        cap("l3", "other-crit", "Strong technical skills"),
        cap("tl1", "crit", "As L3, plus mentors others"),
    ];

    let resolved = resolve_references(&capabilities);
    assert_eq!(
        resolved[1].capability.description,
        "As L3, plus mentors others"
    );
}

#[test]
fn self_reference_does_not_loop_and_stays_unresolved() {
    let capabilities = vec![cap("l3", "crit", "As L3, but with more rigor")];

    let resolved = resolve_references(&capabilities);
    assert_eq!(
        resolved[0].capability.description,
        "As L3, but with more rigor"
    );
    assert_eq!(resolved[0].unresolved_tokens, vec!["L3".to_string()]);
}

#[test]
fn reference_chains_are_not_followed() {
    let capabilities = vec![
        cap("l1-l2", "crit", "Writes correct code"),
        cap("l3", "crit", "As L1-L2, plus reviews designs"),
        cap("tl1", "crit", "As L3, plus sets direction"),
    ];

    let resolved = resolve_references(&capabilities);
    // The middle description resolves against its base.
    assert_eq!(
        resolved[1].capability.description,
        "Writes correct code, plus reviews designs"
    );
    // The top description referenced a referencing description; single-hop
    // resolution leaves it unchanged.
    assert_eq!(
        resolved[2].capability.description,
        "As L3, plus sets direction"
    );
    assert_eq!(resolved[2].unresolved_tokens, vec!["L3".to_string()]);
}

#[test]
fn range_level_token_is_not_confused_with_its_prefix() {
    let capabilities = vec![
        cap("l1", "crit", "Ships small tasks"),
        cap("l1-l2", "crit", "Owns medium features"),
        cap("l3", "crit", "As L1-L2, plus owns projects"),
        cap("tl1", "crit", "As L1, plus pairs with juniors"),
    ];

    let resolved = resolve_references(&capabilities);
    assert_eq!(
        resolved[2].capability.description,
        "Owns medium features, plus owns projects"
    );
    assert_eq!(
        resolved[3].capability.description,
        "Ships small tasks, plus pairs with juniors"
    );
}

#[test]
fn multiple_references_in_one_description_are_all_expanded() {
    let capabilities = vec![
        cap("l1", "crit", "Ships small tasks"),
        cap("l3", "crit", "Owns projects"),
        cap("tl1", "crit", "Blends As L1 and As L3 daily"),
    ];

    let resolved = resolve_references(&capabilities);
    assert_eq!(
        resolved[2].capability.description,
        "Blends Ships small tasks and Owns projects daily"
    );
    assert_eq!(resolved[2].resolved_bases.len(), 2);
    assert!(resolved[2].sole_base().is_none());
}

fn seed_payload() -> MatrixData {
    MatrixData {
        job_levels: vec![
            JobLevel::new("l3", "L3", "Engineer", "Mid level.", None, 0),
            JobLevel::new("tl1", "TL1", "Tech Lead", "First lead level.", None, 0),
        ],
        criteria: vec![levelgrid_core::Criterion::new(
            "craft-technical-expertise",
            "Craft",
            "Technical Expertise",
        )],
        capabilities: vec![
            cap("l3", "craft-technical-expertise", "Strong technical skills"),
            cap(
                "tl1",
                "craft-technical-expertise",
                "As L3, plus mentors others",
            ),
        ],
        edit_history: vec![],
        overview: Default::default(),
    }
}

#[test]
fn expanded_text_is_what_gets_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("matrix.db");

    {
        let conn = open_db(&db_path).unwrap();
        let service = MatrixService::new(SqliteMatrixRepository::new(&conn));
        let summary = service.seed(&seed_payload()).unwrap();
        assert_eq!(summary.capabilities, 2);
        assert_eq!(summary.resolved_references, 1);
        assert_eq!(summary.unresolved_references, 0);
    }

    // Reopen: the stored description is the expanded text, not the shorthand.
    let conn = open_db(&db_path).unwrap();
    let service = MatrixService::new(SqliteMatrixRepository::new(&conn));
    let data = service.get_matrix_data(None).unwrap();

    let tl1 = data
        .capabilities
        .iter()
        .find(|capability| capability.job_level_id == "tl1")
        .unwrap();
    assert_eq!(
        tl1.description,
        "Strong technical skills, plus mentors others"
    );
}

#[test]
fn seed_records_explicit_reference_link_for_single_base_expansion() {
    let conn = levelgrid_core::db::open_db_in_memory().unwrap();
    let service = MatrixService::new(SqliteMatrixRepository::new(&conn));
    service.seed(&seed_payload()).unwrap();

    let data = service.get_matrix_data(None).unwrap();
    let l3 = data
        .capabilities
        .iter()
        .find(|capability| capability.job_level_id == "l3")
        .unwrap();
    let tl1 = data
        .capabilities
        .iter()
        .find(|capability| capability.job_level_id == "tl1")
        .unwrap();

    assert_eq!(l3.references_capability_id, None);
    assert_eq!(tl1.references_capability_id, Some(l3.id));
}

#[test]
fn seed_with_unresolved_reference_still_loads() {
    let mut payload = seed_payload();
    payload.capabilities[1].description = "As L7, plus mentors others".to_string();

    let conn = levelgrid_core::db::open_db_in_memory().unwrap();
    let service = MatrixService::new(SqliteMatrixRepository::new(&conn));
    let summary = service.seed(&payload).unwrap();
    assert_eq!(summary.capabilities, 2);
    assert_eq!(summary.unresolved_references, 1);

    let data = service.get_matrix_data(None).unwrap();
    let tl1 = data
        .capabilities
        .iter()
        .find(|capability| capability.job_level_id == "tl1")
        .unwrap();
    assert_eq!(tl1.description, "As L7, plus mentors others");
    assert_eq!(tl1.references_capability_id, None);
}
