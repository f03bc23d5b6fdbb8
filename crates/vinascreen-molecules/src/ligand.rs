//! Ligand discovery and selection.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;
use vinascreen_common::Result;
use vinascreen_ranker::Ranking;

/// Extension of the docking engine's native input format.
pub const DOCKING_EXTENSION: &str = "pdbqt";

/// A ligand file and the base name that identifies it throughout a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ligand {
    pub name: String,
    pub path: PathBuf,
}

/// Which discovered ligands a pass processes.
#[derive(Debug, Clone, Copy)]
pub enum LigandSelection<'a> {
    All,
    Only(&'a Ranking),
}

impl LigandSelection<'_> {
    pub fn accepts(&self, name: &str) -> bool {
        match self {
            LigandSelection::All => true,
            LigandSelection::Only(ranking) => ranking.contains(name),
        }
    }
}

/// List the regular files in `dir` with `extension`, sorted by base name.
pub async fn discover_ligands(dir: &Path, extension: &str) -> Result<Vec<Ligand>> {
    let mut ligands = Vec::new();
    let mut entries = fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let path = entry.path();
        let matches = path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case(extension));
        if !matches {
            continue;
        }
        let Some(name) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        ligands.push(Ligand { name, path });
    }

    ligands.sort_by(|a, b| a.name.cmp(&b.name));
    debug!("Discovered {} .{} ligands in {:?}", ligands.len(), extension, dir);
    Ok(ligands)
}

/// Docking-ready ligands of `dir` accepted by `selection`.
pub async fn select_ligands(dir: &Path, selection: &LigandSelection<'_>) -> Result<Vec<Ligand>> {
    let ligands = discover_ligands(dir, DOCKING_EXTENSION).await?;
    Ok(ligands
        .into_iter()
        .filter(|l| selection.accepts(&l.name))
        .collect())
}
