use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScreenError {
    #[error("Required tool not available: {tool} (check that it is installed and on PATH)")]
    ToolUnavailable { tool: String },

    #[error("No candidate ligands found in {dir}")]
    NoLigands { dir: PathBuf },

    #[error("Failed to start {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    Invocation {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("Could not extract affinity for ligand {ligand}, repeat {repeat}: {source}")]
    Extraction {
        ligand: String,
        repeat: usize,
        #[source]
        source: LogParseError,
    },

    #[error("Missing docking output for ligand {ligand}, repeat {repeat}: {path}")]
    MissingOutput {
        ligand: String,
        repeat: usize,
        path: PathBuf,
    },

    #[error("Ligand {ligand} has {actual} affinity samples, expected {expected}")]
    IncompleteSamples {
        ligand: String,
        expected: usize,
        actual: usize,
    },

    #[error("Cannot rank an empty sample table")]
    EmptyTable,

    #[error("Invalid pipeline transition: {0}")]
    InvalidTransition(String),

    #[error("Export error: {0}")]
    Export(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure modes of the Vina log grammar.
///
/// `NoPoses` is kept apart from the structural errors: the log is well
/// formed but the engine reported no pose, so there is no affinity to read.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LogParseError {
    #[error("result table header (`mode |`) not found")]
    MissingTableHeader,

    #[error("result table separator not found after header")]
    MissingSeparator,

    #[error("malformed pose line {line}: {reason}")]
    MalformedPose { line: usize, reason: String },

    #[error("result table contains no poses")]
    NoPoses,
}

pub type Result<T> = std::result::Result<T, ScreenError>;
