//! Ligand preparation: optional minimisation, then conversion to PDBQT.

use std::path::PathBuf;

use tokio::fs;
use tracing::info;
use vinascreen_common::{LigandSettings, Result, ScreenError};

use crate::babel::StructureConverter;
use crate::ligand::{discover_ligands, DOCKING_EXTENSION};

/// Convert every raw structure in `settings.dir` to a sibling `.pdbqt` file.
///
/// Originals are kept. With minimisation on, each structure is first
/// minimised into a temporary sibling that then replaces the original.
/// Returns the converted paths in ligand-name order.
pub async fn prepare_ligands(
    converter: &dyn StructureConverter,
    settings: &LigandSettings,
) -> Result<Vec<PathBuf>> {
    let raw = discover_ligands(&settings.dir, &settings.input_extension).await?;
    if raw.is_empty() {
        return Err(ScreenError::NoLigands {
            dir: settings.dir.clone(),
        });
    }

    info!(
        "Preparing {} ligands from {:?} (minimisation {})",
        raw.len(),
        settings.dir,
        if settings.minimize { "on" } else { "off" }
    );

    let mut prepared = Vec::with_capacity(raw.len());
    for ligand in raw {
        if settings.minimize {
            let minimized = ligand.path.with_file_name(format!(
                "{}_minimized.{}",
                ligand.name, settings.input_extension
            ));
            converter
                .minimize(&ligand.path, &minimized, &settings.force_field)
                .await?;
            fs::rename(&minimized, &ligand.path).await?;
        }

        let target = ligand.path.with_extension(DOCKING_EXTENSION);
        converter.convert(&ligand.path, &target).await?;
        prepared.push(target);
    }

    Ok(prepared)
}
