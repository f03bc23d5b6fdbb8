//! Per-phase docking parameters.
//!
//! The single pass and the replication each get their own `PhaseConfig`;
//! replication derives a new value instead of editing the first one.

use std::fmt;
use std::path::{Path, PathBuf};

use vinascreen_common::ScreenConfig;

use crate::layout::RunLayout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    SinglePass,
    Replicated,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::SinglePass => write!(f, "single-pass"),
            Phase::Replicated => write!(f, "replicated"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhaseConfig {
    pub phase: Phase,
    pub ligand_dir: PathBuf,
    pub output_dir: PathBuf,
    pub docking_config: PathBuf,
    pub exhaustiveness: u32,
    /// Always at least 1
    pub repeats: usize,
    pub max_parallel: usize,
}

impl PhaseConfig {
    /// Single-pass parameters from the campaign configuration.
    pub fn single_pass(config: &ScreenConfig) -> Self {
        Self {
            phase: Phase::SinglePass,
            ligand_dir: config.ligands.dir.clone(),
            output_dir: config.docking.output_dir.clone(),
            docking_config: config.docking.config.clone(),
            exhaustiveness: config.docking.exhaustiveness,
            repeats: config.docking.effective_repeats(),
            max_parallel: config.docking.max_parallel.max(1),
        }
    }

    /// Replication parameters: same ligands and engine config, new output
    /// directory, repeat count and exhaustiveness.
    pub fn for_replication(&self, output_dir: &Path, repeats: usize, exhaustiveness: u32) -> Self {
        Self {
            phase: Phase::Replicated,
            output_dir: output_dir.to_path_buf(),
            repeats: repeats.max(1),
            exhaustiveness,
            ..self.clone()
        }
    }

    pub fn layout(&self) -> RunLayout {
        RunLayout::new(&self.output_dir)
    }
}
