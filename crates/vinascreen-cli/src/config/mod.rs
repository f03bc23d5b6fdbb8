//! Configuration loading for the vinascreen binary.
//! Reads the file given by `--config`, else the path in VINASCREEN_CONFIG,
//! else vinascreen.toml from the current directory if it exists.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::info;
use vinascreen_common::ScreenConfig;

pub const CONFIG_ENV: &str = "VINASCREEN_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "vinascreen.toml";

/// Command-line values that take precedence over the configuration file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub ligand_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub repeats: Option<usize>,
    pub exhaustiveness: Option<u32>,
    pub top_n: Option<usize>,
    pub minimize: bool,
    pub no_replication: bool,
    pub split_poses: bool,
}

/// Pick the configuration file to read, if any.
pub fn resolve_path(explicit: Option<&Path>, env: Option<String>, default: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env.filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    default.exists().then(|| default.to_path_buf())
}

/// Load the campaign configuration, falling back to defaults when no file is found.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<ScreenConfig> {
    let env = std::env::var(CONFIG_ENV).ok();
    match resolve_path(explicit, env, Path::new(DEFAULT_CONFIG_FILE)) {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            let config = ScreenConfig::load(&path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            info!("Configuration loaded from {}", path.display());
            Ok(config)
        }
        None => {
            info!("No configuration file, using defaults");
            Ok(ScreenConfig::default())
        }
    }
}

pub fn apply_overrides(config: &mut ScreenConfig, overrides: &Overrides) {
    if let Some(dir) = &overrides.ligand_dir {
        config.ligands.dir = dir.clone();
    }
    if let Some(dir) = &overrides.output_dir {
        config.docking.output_dir = dir.clone();
    }
    if let Some(repeats) = overrides.repeats {
        config.docking.repeats = repeats;
    }
    if let Some(exhaustiveness) = overrides.exhaustiveness {
        config.docking.exhaustiveness = exhaustiveness;
    }
    if let Some(top_n) = overrides.top_n {
        config.ranking.top_n = top_n;
    }
    if overrides.minimize {
        config.ligands.minimize = true;
    }
    if overrides.no_replication {
        config.replication.enabled = false;
    }
    if overrides.split_poses {
        config.output.split_poses = true;
    }
}
