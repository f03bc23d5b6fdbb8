//! Molecular docking using AutoDock Vina.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};
use vinascreen_common::Result;

use crate::tools::run_checked;

/// One docking run: a ligand, a repeat index and the files it must produce.
#[derive(Debug, Clone, PartialEq)]
pub struct DockingJob {
    pub ligand_name: String,
    pub repeat: usize,
    /// Vina configuration (receptor and search box), passed through as-is
    pub config: PathBuf,
    pub ligand: PathBuf,
    pub exhaustiveness: u32,
    pub out: PathBuf,
    pub log: PathBuf,
}

/// A docking engine writing a pose file and a log file per job.
#[async_trait]
pub trait DockingEngine: Send + Sync {
    async fn dock(&self, job: &DockingJob) -> Result<()>;
}

/// Wrapper for AutoDock Vina execution.
pub struct VinaRunner {
    executable_path: PathBuf,
    cpu: Option<u32>,
}

impl VinaRunner {
    /// Create a new VinaRunner.
    pub fn new<P: AsRef<Path>>(executable_path: P) -> Self {
        Self {
            executable_path: executable_path.as_ref().to_path_buf(),
            cpu: None,
        }
    }

    pub fn with_cpu(mut self, cpu: Option<u32>) -> Self {
        self.cpu = cpu;
        self
    }

    pub fn args(&self, job: &DockingJob) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--config".into(),
            job.config.as_os_str().into(),
            "--ligand".into(),
            job.ligand.as_os_str().into(),
            "--out".into(),
            job.out.as_os_str().into(),
            "--log".into(),
            job.log.as_os_str().into(),
            "--exhaustiveness".into(),
            job.exhaustiveness.to_string().into(),
        ];
        if let Some(cpu) = self.cpu {
            args.push("--cpu".into());
            args.push(cpu.to_string().into());
        }
        args
    }
}

#[async_trait]
impl DockingEngine for VinaRunner {
    async fn dock(&self, job: &DockingJob) -> Result<()> {
        info!(
            "Running AutoDock Vina on {} (repeat {}, exhaustiveness {})",
            job.ligand_name, job.repeat, job.exhaustiveness
        );

        run_checked(
            "vina",
            Command::new(&self.executable_path)
                .args(self.args(job))
                .kill_on_drop(true),
        )
        .await?;

        debug!("AutoDock Vina completed successfully. Output in {:?}", job.out);
        Ok(())
    }
}
