//! Docking dispatch: every selected ligand, every repeat.

use futures_util::stream::{self, StreamExt, TryStreamExt};
use tokio::fs;
use tracing::{debug, info};
use vinascreen_common::Result;

use crate::docking::{DockingEngine, DockingJob};
use crate::layout::RunLayout;
use crate::ligand::{select_ligands, Ligand, LigandSelection};
use crate::phase::PhaseConfig;

/// Dock the ligands of `phase.ligand_dir` accepted by `selection`.
///
/// Each ligand gets `phase.repeats` runs written under the phase's layout.
/// With `max_parallel > 1` several ligands are in flight at once; a ligand's
/// repeats always run one after another. The first failure aborts the pass.
/// Returns the names of the dispatched ligands.
pub async fn run_pass(
    engine: &dyn DockingEngine,
    phase: &PhaseConfig,
    selection: &LigandSelection<'_>,
) -> Result<Vec<String>> {
    let ligands = select_ligands(&phase.ligand_dir, selection).await?;
    let layout = phase.layout();

    info!(
        "Starting {} docking pass: {} ligands x {} repeats, exhaustiveness {}",
        phase.phase,
        ligands.len(),
        phase.repeats,
        phase.exhaustiveness
    );

    fs::create_dir_all(layout.output_dir()).await?;

    if phase.max_parallel <= 1 {
        for ligand in &ligands {
            dock_ligand(engine, phase, &layout, ligand).await?;
        }
    } else {
        stream::iter(ligands.iter().map(|ligand| dock_ligand(engine, phase, &layout, ligand)))
            .buffer_unordered(phase.max_parallel)
            .try_collect::<Vec<()>>()
            .await?;
    }

    Ok(ligands.into_iter().map(|l| l.name).collect())
}

async fn dock_ligand(
    engine: &dyn DockingEngine,
    phase: &PhaseConfig,
    layout: &RunLayout,
    ligand: &Ligand,
) -> Result<()> {
    for repeat in 0..phase.repeats {
        fs::create_dir_all(layout.repeat_dir(&ligand.name, repeat)).await?;

        let job = DockingJob {
            ligand_name: ligand.name.clone(),
            repeat,
            config: phase.docking_config.clone(),
            ligand: ligand.path.clone(),
            exhaustiveness: phase.exhaustiveness,
            out: layout.pose_file(&ligand.name, repeat),
            log: layout.log_file(&ligand.name, repeat),
        };
        engine.dock(&job).await?;
    }
    debug!("Docked {} ({} repeats)", ligand.name, phase.repeats);
    Ok(())
}
