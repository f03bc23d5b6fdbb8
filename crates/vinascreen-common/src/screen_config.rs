//! Screening campaign configuration.
//!
//! A campaign is described by a TOML or YAML file; every field has a default
//! so an empty file (or no file at all) describes a valid single-repeat run
//! over `Ligands/` with a Vina config at `conf.txt`.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, ScreenError};

/// Complete screening campaign configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScreenConfig {
    /// Ligand discovery and preparation
    #[serde(default)]
    pub ligands: LigandSettings,

    /// Single-pass docking parameters
    #[serde(default)]
    pub docking: DockingSettings,

    /// Best-binder selection
    #[serde(default)]
    pub ranking: RankingSettings,

    /// Verification re-run of the best binders
    #[serde(default)]
    pub replication: ReplicationSettings,

    /// Result files
    #[serde(default)]
    pub output: OutputSettings,

    /// External executables
    #[serde(default)]
    pub tools: ToolSettings,
}

// ── Ligands ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LigandSettings {
    /// Directory holding the raw ligand structures
    #[serde(default = "default_ligand_dir")]
    pub dir: PathBuf,

    /// Extension of raw structures to convert (without the dot)
    #[serde(default = "default_input_extension")]
    pub input_extension: String,

    /// Minimise geometry before conversion
    #[serde(default)]
    pub minimize: bool,

    /// Force field used for minimisation
    #[serde(default = "default_force_field")]
    pub force_field: String,
}

fn default_ligand_dir() -> PathBuf { PathBuf::from("Ligands") }
fn default_input_extension() -> String { "sdf".to_string() }
fn default_force_field() -> String { "GAFF".to_string() }

impl Default for LigandSettings {
    fn default() -> Self {
        Self {
            dir: default_ligand_dir(),
            input_extension: default_input_extension(),
            minimize: false,
            force_field: default_force_field(),
        }
    }
}

// ── Docking ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DockingSettings {
    /// Vina configuration file (receptor, search box); passed through untouched
    #[serde(default = "default_vina_config")]
    pub config: PathBuf,

    #[serde(default = "default_exhaustiveness")]
    pub exhaustiveness: u32,

    /// Independent docking runs per ligand
    #[serde(default = "default_repeats")]
    pub repeats: usize,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// CPUs handed to each Vina process (Vina decides when unset)
    #[serde(default)]
    pub cpu: Option<u32>,

    /// Ligands docked concurrently; 1 keeps the run strictly sequential
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,
}

fn default_vina_config() -> PathBuf { PathBuf::from("conf.txt") }
fn default_exhaustiveness() -> u32 { 8 }
fn default_repeats() -> usize { 1 }
fn default_output_dir() -> PathBuf { PathBuf::from("Results") }
fn default_max_parallel() -> usize { 1 }

impl Default for DockingSettings {
    fn default() -> Self {
        Self {
            config: default_vina_config(),
            exhaustiveness: default_exhaustiveness(),
            repeats: default_repeats(),
            output_dir: default_output_dir(),
            cpu: None,
            max_parallel: default_max_parallel(),
        }
    }
}

impl DockingSettings {
    /// Repeat count with the lower bound applied: anything below 1 runs once.
    pub fn effective_repeats(&self) -> usize {
        self.repeats.max(1)
    }
}

// ── Ranking ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingSettings {
    /// Number of best binders carried into replication
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_top_n() -> usize { 5 }

impl Default for RankingSettings {
    fn default() -> Self {
        Self { top_n: default_top_n() }
    }
}

// ── Replication ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicationSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_replication_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_replication_repeats")]
    pub repeats: usize,

    #[serde(default = "default_replication_exhaustiveness")]
    pub exhaustiveness: u32,
}

fn default_true() -> bool { true }
fn default_replication_dir() -> PathBuf { PathBuf::from("Replications") }
fn default_replication_repeats() -> usize { 5 }
fn default_replication_exhaustiveness() -> u32 { 20 }

impl Default for ReplicationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            output_dir: default_replication_dir(),
            repeats: default_replication_repeats(),
            exhaustiveness: default_replication_exhaustiveness(),
        }
    }
}

// ── Output ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Directory receiving the result tables
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,

    #[serde(default = "default_stats_prefix")]
    pub stats_prefix: String,

    #[serde(default = "default_samples_prefix")]
    pub samples_prefix: String,

    #[serde(default = "default_replication_stats_prefix")]
    pub replication_stats_prefix: String,

    #[serde(default = "default_replication_samples_prefix")]
    pub replication_samples_prefix: String,

    /// Append the run date to result file names
    #[serde(default = "default_true")]
    pub date_stamp: bool,

    /// Split multi-pose docking output into one file per pose
    #[serde(default)]
    pub split_poses: bool,
}

fn default_results_dir() -> PathBuf { PathBuf::from(".") }
fn default_stats_prefix() -> String { "affinities_with_stats".to_string() }
fn default_samples_prefix() -> String { "affinities_only".to_string() }
fn default_replication_stats_prefix() -> String { "replication_affinities_with_stats".to_string() }
fn default_replication_samples_prefix() -> String { "replication_affinities_only".to_string() }

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
            stats_prefix: default_stats_prefix(),
            samples_prefix: default_samples_prefix(),
            replication_stats_prefix: default_replication_stats_prefix(),
            replication_samples_prefix: default_replication_samples_prefix(),
            date_stamp: true,
            split_poses: false,
        }
    }
}

impl OutputSettings {
    /// Result file path: `<results_dir>/<prefix>_<repeats>_repeats[_<date>].csv`
    pub fn result_path(&self, prefix: &str, repeats: usize, date: NaiveDate) -> PathBuf {
        let name = if self.date_stamp {
            format!("{prefix}_{repeats}_repeats_{}.csv", date.format("%Y-%m-%d"))
        } else {
            format!("{prefix}_{repeats}_repeats.csv")
        };
        self.results_dir.join(name)
    }
}

// ── Tools ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    /// Open Babel executable (name on PATH or explicit path)
    #[serde(default = "default_obabel")]
    pub obabel: String,

    /// AutoDock Vina executable (name on PATH or explicit path)
    #[serde(default = "default_vina")]
    pub vina: String,
}

fn default_obabel() -> String { "obabel".to_string() }
fn default_vina() -> String { "vina".to_string() }

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            obabel: default_obabel(),
            vina: default_vina(),
        }
    }
}

// ── Helper Methods ───────────────────────────────────────────────────────────

impl ScreenConfig {
    /// Load from TOML file
    pub fn from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from YAML file
    pub fn from_yaml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load from JSON file
    pub fn from_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load by file extension (`.toml`, `.yaml`/`.yml`, `.json`).
    pub fn load(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("toml") => Self::from_toml(path),
            Some("yaml") | Some("yml") => Self::from_yaml(path),
            Some("json") => Self::from_json(path),
            _ => Err(ScreenError::Config(format!(
                "Unsupported config format: {}",
                path.display()
            ))),
        }
    }

    /// Raise repeat counts below 1 to 1, warning once per clamped value.
    pub fn clamp_repeats(&mut self) {
        if self.docking.repeats == 0 {
            warn!("docking.repeats is 0, running each ligand once");
            self.docking.repeats = 1;
        }
        if self.replication.repeats == 0 {
            warn!("replication.repeats is 0, running each ligand once");
            self.replication.repeats = 1;
        }
    }

    /// Reject parameter combinations that cannot produce a run.
    pub fn validate(&self) -> Result<()> {
        if self.ranking.top_n == 0 {
            return Err(ScreenError::Config("ranking.top_n must be at least 1".to_string()));
        }
        if self.docking.exhaustiveness == 0 || self.replication.exhaustiveness == 0 {
            return Err(ScreenError::Config("exhaustiveness must be at least 1".to_string()));
        }
        if self.docking.max_parallel == 0 {
            return Err(ScreenError::Config("docking.max_parallel must be at least 1".to_string()));
        }
        if self.replication.enabled && self.replication.output_dir == self.docking.output_dir {
            return Err(ScreenError::Config(
                "replication.output_dir must differ from docking.output_dir".to_string(),
            ));
        }
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
