//! Output directory contract shared by dispatch and extraction.
//!
//! `<output_dir>/<ligand>/<repeat>/` holds one repeat's files:
//! `out_pass_<repeat>_<ligand>.pdbqt` and `log_pass_<repeat>_<ligand>.txt`.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    output_dir: PathBuf,
}

impl RunLayout {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn ligand_dir(&self, ligand: &str) -> PathBuf {
        self.output_dir.join(ligand)
    }

    pub fn repeat_dir(&self, ligand: &str, repeat: usize) -> PathBuf {
        self.ligand_dir(ligand).join(repeat.to_string())
    }

    pub fn pose_file(&self, ligand: &str, repeat: usize) -> PathBuf {
        self.repeat_dir(ligand, repeat)
            .join(format!("out_pass_{repeat}_{ligand}.pdbqt"))
    }

    pub fn log_file(&self, ligand: &str, repeat: usize) -> PathBuf {
        self.repeat_dir(ligand, repeat)
            .join(format!("log_pass_{repeat}_{ligand}.txt"))
    }

    /// Whether `file_name` is a concatenated pose file written by the engine.
    pub fn is_pose_file_name(file_name: &str) -> bool {
        file_name.starts_with("out_pass_") && file_name.ends_with(".pdbqt")
    }
}
