//! Affinity extraction from the logs of a docking pass.

use std::io::ErrorKind;

use tokio::fs;
use tracing::{debug, info};
use vinascreen_common::{Result, ScreenError};
use vinascreen_ranker::{LigandRecord, PhaseTables};

use crate::layout::RunLayout;
use crate::ligand::{select_ligands, LigandSelection};
use crate::phase::PhaseConfig;
use crate::vina_log::extract_affinity;

/// Read back every log of a pass and build the phase's tables.
///
/// Ligands are selected exactly as [`crate::dispatch::run_pass`] selects
/// them and processed in name order. Any missing or unparsable log aborts
/// extraction; the failing ligand contributes no row.
pub async fn extract(phase: &PhaseConfig, selection: &LigandSelection<'_>) -> Result<PhaseTables> {
    let ligands = select_ligands(&phase.ligand_dir, selection).await?;
    let layout = phase.layout();
    let mut tables = PhaseTables::new(phase.repeats);

    info!("Extracting {} affinities for {} ligands", phase.phase, ligands.len());

    for ligand in ligands {
        let record = read_record(&layout, &ligand.name, phase.repeats).await?;
        let stats = tables.push(record)?;
        debug!(
            "{}: mean {:.3} kcal/mol, sd {:.3} over {} samples",
            stats.ligand, stats.mean, stats.std_dev, stats.samples
        );
    }

    Ok(tables)
}

/// Collect the best-pose affinity of each repeat of `ligand`.
pub async fn read_record(layout: &RunLayout, ligand: &str, repeats: usize) -> Result<LigandRecord> {
    let mut record = LigandRecord::new(ligand);

    for repeat in 0..repeats {
        let path = layout.log_file(ligand, repeat);
        let text = match fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ScreenError::MissingOutput {
                    ligand: ligand.to_string(),
                    repeat,
                    path,
                });
            }
            Err(e) => return Err(e.into()),
        };

        let affinity = extract_affinity(&text).map_err(|source| ScreenError::Extraction {
            ligand: ligand.to_string(),
            repeat,
            source,
        })?;
        record.push(affinity);
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::vina_log_text;
    use crate::phase::Phase;
    use std::path::Path;
    use vinascreen_common::LogParseError;
    use vinascreen_ranker::Ranking;

    fn phase(root: &Path, repeats: usize) -> PhaseConfig {
        PhaseConfig {
            phase: Phase::SinglePass,
            ligand_dir: root.join("Ligands"),
            output_dir: root.join("Results"),
            docking_config: root.join("conf.txt"),
            exhaustiveness: 8,
            repeats,
            max_parallel: 1,
        }
    }

    /// Lay out ligands and their logs as a finished pass would.
    fn finished_pass(root: &Path, data: &[(&str, &[f64])]) -> RunLayout {
        let layout = RunLayout::new(root.join("Results"));
        std::fs::create_dir_all(root.join("Ligands")).unwrap();
        for (name, values) in data {
            std::fs::write(root.join("Ligands").join(format!("{name}.pdbqt")), "").unwrap();
            for (repeat, value) in values.iter().enumerate() {
                std::fs::create_dir_all(layout.repeat_dir(name, repeat)).unwrap();
                std::fs::write(layout.log_file(name, repeat), vina_log_text(&[*value, value + 0.4])).unwrap();
            }
        }
        layout
    }

    #[tokio::test]
    async fn test_three_ligand_scenario() {
        let dir = tempfile::tempdir().unwrap();
        finished_pass(
            dir.path(),
            &[("A", &[-5.0, -5.2]), ("B", &[-7.1, -6.9]), ("C", &[-3.0, -3.4])],
        );

        let tables = extract(&phase(dir.path(), 2), &LigandSelection::All).await.unwrap();
        let rows = tables.statistics.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].ligand, "B");
        assert!((rows[1].mean - -7.0).abs() < 1e-9);
        assert!((rows[2].std_dev - 0.282_843).abs() < 1e-5);
        assert_eq!(tables.samples.get("A").unwrap().affinities, vec![-5.0, -5.2]);
    }

    #[tokio::test]
    async fn test_single_repeat() {
        let dir = tempfile::tempdir().unwrap();
        finished_pass(dir.path(), &[("X", &[-4.5])]);

        let tables = extract(&phase(dir.path(), 1), &LigandSelection::All).await.unwrap();
        let x = &tables.statistics.rows()[0];
        assert_eq!((x.ligand.as_str(), x.mean, x.std_dev, x.samples), ("X", -4.5, 0.0, 1));
    }

    #[tokio::test]
    async fn test_broken_log_names_ligand_and_repeat() {
        let dir = tempfile::tempdir().unwrap();
        let layout = finished_pass(dir.path(), &[("A", &[-5.0, -5.2])]);
        std::fs::write(layout.log_file("A", 1), "Reading input ... done.\n").unwrap();

        let err = extract(&phase(dir.path(), 2), &LigandSelection::All).await.unwrap_err();
        match err {
            ScreenError::Extraction { ligand, repeat, source } => {
                assert_eq!(ligand, "A");
                assert_eq!(repeat, 1);
                assert_eq!(source, LogParseError::MissingTableHeader);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_repeat_is_integrity_error() {
        let dir = tempfile::tempdir().unwrap();
        finished_pass(dir.path(), &[("A", &[-5.0])]);

        // Two repeats expected, only one was docked.
        let err = extract(&phase(dir.path(), 2), &LigandSelection::All).await.unwrap_err();
        assert!(matches!(err, ScreenError::MissingOutput { repeat: 1, .. }));
    }

    #[tokio::test]
    async fn test_selection_limits_extraction() {
        let dir = tempfile::tempdir().unwrap();
        finished_pass(dir.path(), &[("A", &[-5.0]), ("B", &[-6.0]), ("C", &[-7.0])]);
        let ranking: Ranking = ["C", "A"].into_iter().collect();

        let tables = extract(&phase(dir.path(), 1), &LigandSelection::Only(&ranking))
            .await
            .unwrap();
        let names: Vec<_> = tables.statistics.rows().iter().map(|r| r.ligand.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
    }
}
