//! End-to-end campaign runs against the mock tools.

use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use vinascreen_common::{ScreenConfig, ScreenError};
use vinascreen_molecules::mock::{MockConverter, MockDockingEngine};
use vinascreen_molecules::pipeline::{run_campaign, Session, SessionState};
use vinascreen_ranker::OutputTable;

fn campaign_config(root: &Path) -> ScreenConfig {
    let mut config = ScreenConfig::default();
    config.ligands.dir = root.join("Ligands");
    config.docking.config = root.join("conf.txt");
    config.docking.output_dir = root.join("Results");
    config.docking.repeats = 2;
    config.ranking.top_n = 2;
    config.replication.output_dir = root.join("Replications");
    config.replication.repeats = 3;
    config.replication.exhaustiveness = 20;
    config.output.results_dir = root.join("tables");
    config
}

fn write_raw_ligands(root: &Path, names: &[&str]) {
    let dir = root.join("Ligands");
    std::fs::create_dir_all(&dir).unwrap();
    for name in names {
        std::fs::write(dir.join(format!("{name}.sdf")), format!("{name}\n")).unwrap();
    }
}

fn scripted_engine() -> MockDockingEngine {
    MockDockingEngine::new()
        .with("A", &[-5.0, -5.2, -5.1])
        .with("B", &[-7.1, -6.9, -7.0])
        .with("C", &[-3.0, -3.4, -3.2])
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

#[tokio::test]
async fn test_full_campaign() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_raw_ligands(root, &["A", "B", "C"]);

    let engine = Arc::new(scripted_engine());
    let mut session = Session::new(
        campaign_config(root),
        Arc::new(MockConverter::new()),
        engine.clone(),
    )
    .unwrap()
    .with_date(date());

    let report = run_campaign(&mut session).await.unwrap();
    assert_eq!(session.state(), SessionState::ReplicationComplete);
    assert_eq!(report.prepared.len(), 3);

    // Single pass: every ligand, two repeats each.
    assert_eq!(report.single_pass.ranking.names(), &["B".to_string(), "A".to_string()]);
    let stats = &report.single_pass.tables.statistics;
    assert_eq!(stats.rows().len(), 3);
    assert!((stats.get("B").unwrap().mean - -7.0).abs() < 1e-9);
    assert_eq!(stats.get("C").unwrap().samples, 2);

    // Replication: only the ranked ligands, three repeats at exhaustiveness 20.
    let replication = report.replication.as_ref().unwrap();
    assert_eq!(replication.docked, vec!["A".to_string(), "B".to_string()]);
    assert_eq!(replication.tables.samples.len(), 2);
    assert!(replication.tables.samples.get("C").is_none());
    assert_eq!(replication.ranking.names(), &["B".to_string(), "A".to_string()]);

    let calls = engine.calls();
    assert_eq!(calls.len(), 3 * 2 + 2 * 3);
    let replicated: Vec<_> = calls.iter().filter(|c| c.exhaustiveness == 20).collect();
    assert_eq!(replicated.len(), 6);
    assert!(replicated.iter().all(|c| c.ligand_name != "C"));
    assert!(root.join("Replications").join("B").join("2").exists());
    assert!(!root.join("Replications").join("C").exists());

    // Single-pass results are left untouched by the replication.
    assert!(root.join("Results").join("C").join("1").exists());
}

#[tokio::test]
async fn test_exported_tables() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_raw_ligands(root, &["A", "B", "C"]);

    let mut session = Session::new(
        campaign_config(root),
        Arc::new(MockConverter::new()),
        Arc::new(scripted_engine()),
    )
    .unwrap()
    .with_date(date());
    let report = run_campaign(&mut session).await.unwrap();

    let stats_file = &report.single_pass.statistics_file;
    assert_eq!(
        stats_file,
        &root.join("tables").join("affinities_with_stats_2_repeats_2024-03-01.csv")
    );
    let stats = OutputTable::read(stats_file).unwrap();
    assert_eq!(stats.header, vec!["Ligand", "mean-dG", "stdev-dG", "#samples"]);
    assert_eq!(stats.rows.len(), 3);
    assert_eq!(stats.rows[0][0], "A");
    assert_eq!(stats.rows[1][3], "2");

    let samples = OutputTable::read(&report.single_pass.samples_file).unwrap();
    assert_eq!(samples.header, vec!["Ligand", "pass-0", "pass-1"]);
    assert_eq!(samples.rows[1], vec!["B", "-7.1", "-6.9"]);

    let replication = report.replication.unwrap();
    assert_eq!(
        replication.statistics_file,
        root.join("tables")
            .join("replication_affinities_with_stats_3_repeats_2024-03-01.csv")
    );
    let replicated = OutputTable::read(&replication.samples_file).unwrap();
    assert_eq!(replicated.rows.len(), 2);
    assert_eq!(replicated.rows[0].len(), 4);
}

#[tokio::test]
async fn test_replication_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_raw_ligands(root, &["A", "B"]);

    let mut config = campaign_config(root);
    config.replication.enabled = false;
    config.ranking.top_n = 5;

    let mut session = Session::new(config, Arc::new(MockConverter::new()), Arc::new(scripted_engine()))
        .unwrap()
        .with_date(date());
    let report = run_campaign(&mut session).await.unwrap();

    assert!(report.replication.is_none());
    assert_eq!(session.state(), SessionState::SinglePassComplete);
    // Fewer ligands than top_n: all of them are ranked.
    assert_eq!(report.single_pass.ranking.len(), 2);
    assert!(!root.join("Replications").exists());
}

#[tokio::test]
async fn test_split_poses_after_campaign() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_raw_ligands(root, &["A", "B", "C"]);

    let mut config = campaign_config(root);
    config.output.split_poses = true;

    let converter = Arc::new(MockConverter::new());
    let mut session = Session::new(config, converter.clone(), Arc::new(scripted_engine()))
        .unwrap()
        .with_date(date());
    let report = run_campaign(&mut session).await.unwrap();

    // Single pass: three ligands, two repeats. Replication: two ligands,
    // three repeats. Three poses per run in both phases.
    assert_eq!(report.poses_written, 3 * 2 * 3 + 2 * 3 * 3);
    assert_eq!(converter.convert_calls(), 3 + report.poses_written);

    let single = root.join("Results").join("A").join("0");
    assert!(!single.join("out_pass_0_A.pdbqt").exists());
    assert!(single.join("log_pass_0_A.txt").exists());
    assert!(single.join("A_pass0_pose1_affinity=-5_rmsMAX=0_rmsMIN=0.pdbqt").exists());
    // Ligands outside the ranking are split too.
    assert!(!root.join("Results").join("C").join("1").join("out_pass_1_C.pdbqt").exists());

    let replicated = root.join("Replications").join("A").join("0");
    assert!(!replicated.join("out_pass_0_A.pdbqt").exists());
    assert!(replicated.join("log_pass_0_A.txt").exists());
}

#[tokio::test]
async fn test_broken_log_aborts_before_export() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_raw_ligands(root, &["A", "B", "C"]);

    let engine = scripted_engine().with_broken_log("B", 1);
    let mut session = Session::new(campaign_config(root), Arc::new(MockConverter::new()), Arc::new(engine))
        .unwrap()
        .with_date(date());

    let err = run_campaign(&mut session).await.unwrap_err();
    match err {
        ScreenError::Extraction { ligand, repeat, .. } => {
            assert_eq!(ligand, "B");
            assert_eq!(repeat, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(session.state(), SessionState::Failed);
    assert!(!root.join("tables").exists());
}

#[tokio::test]
async fn test_docking_failure_aborts_campaign() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_raw_ligands(root, &["A", "B"]);

    let engine = scripted_engine().failing_on("A");
    let mut session = Session::new(campaign_config(root), Arc::new(MockConverter::new()), Arc::new(engine))
        .unwrap();

    let err = run_campaign(&mut session).await.unwrap_err();
    assert!(matches!(err, ScreenError::Invocation { .. }));
    assert_eq!(session.state(), SessionState::Failed);
}

#[tokio::test]
async fn test_empty_ligand_directory() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("Ligands")).unwrap();

    let mut session = Session::new(
        campaign_config(root),
        Arc::new(MockConverter::new()),
        Arc::new(MockDockingEngine::new()),
    )
    .unwrap();

    let err = run_campaign(&mut session).await.unwrap_err();
    assert!(matches!(err, ScreenError::NoLigands { .. }));
}
