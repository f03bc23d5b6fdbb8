//! In-process stand-ins for Open Babel and AutoDock Vina.
//!
//! They write the same files the real tools would, so the pipeline can be
//! exercised end to end without either executable installed.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::fs;
use vinascreen_common::{Result, ScreenError};

use crate::babel::StructureConverter;
use crate::docking::{DockingEngine, DockingJob};

/// Affinity reported for ligands without a scripted value.
pub const DEFAULT_AFFINITY: f64 = -6.0;

/// Render a Vina log whose result table holds `affinities` as modes 1..=n.
pub fn vina_log_text(affinities: &[f64]) -> String {
    let mut text = String::from(
        "AutoDock Vina (mock)\n\
         Reading input ... done.\n\
         Performing search ... done.\n\
         Refining results ... done.\n\n\
         mode |   affinity | dist from best mode\n     \
         | (kcal/mol) | rmsd l.b.| rmsd u.b.\n\
         -----+------------+----------+----------\n",
    );
    for (i, affinity) in affinities.iter().enumerate() {
        let rmsd = if i == 0 { 0.0 } else { 1.5 + i as f64 };
        let _ = writeln!(text, "{:>4} {:>12.1} {:>10.3} {:>10.3}", i + 1, affinity, rmsd, rmsd * 1.5);
    }
    text.push_str("Writing output ... done.\n");
    text
}

/// Render a multi-model PDBQT result with one `MODEL` block per affinity.
pub fn vina_pdbqt_text(affinities: &[f64]) -> String {
    let mut text = String::new();
    for (i, affinity) in affinities.iter().enumerate() {
        let rmsd = if i == 0 { 0.0 } else { 1.5 + i as f64 };
        let _ = writeln!(text, "MODEL {}", i + 1);
        let _ = writeln!(text, "REMARK VINA RESULT: {:>9.1} {:>10.3} {:>10.3}", affinity, rmsd, rmsd * 1.5);
        let _ = writeln!(
            text,
            "ATOM      1  C   UNL     1       {:.3}   0.000   0.000  0.00  0.00    +0.000 C",
            i as f64
        );
        let _ = writeln!(text, "ENDMDL");
    }
    text
}

/// Scripted docking engine.
///
/// Repeat `r` of ligand `name` reports `affinities[name][r]` as its best pose.
#[derive(Default)]
pub struct MockDockingEngine {
    affinities: HashMap<String, Vec<f64>>,
    broken_logs: HashSet<(String, usize)>,
    failing: HashSet<String>,
    calls: Mutex<Vec<DockingJob>>,
}

impl MockDockingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the per-repeat affinities of a ligand.
    pub fn with(mut self, ligand: &str, affinities: &[f64]) -> Self {
        self.affinities.insert(ligand.to_string(), affinities.to_vec());
        self
    }

    /// Write a log without a result table for this ligand and repeat.
    pub fn with_broken_log(mut self, ligand: &str, repeat: usize) -> Self {
        self.broken_logs.insert((ligand.to_string(), repeat));
        self
    }

    /// Fail every docking run of this ligand as a nonzero exit would.
    pub fn failing_on(mut self, ligand: &str) -> Self {
        self.failing.insert(ligand.to_string());
        self
    }

    pub fn calls(&self) -> Vec<DockingJob> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn affinity(&self, ligand: &str, repeat: usize) -> f64 {
        self.affinities
            .get(ligand)
            .and_then(|values| values.get(repeat % values.len().max(1)))
            .copied()
            .unwrap_or(DEFAULT_AFFINITY)
    }
}

#[async_trait]
impl DockingEngine for MockDockingEngine {
    async fn dock(&self, job: &DockingJob) -> Result<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(job.clone());
        }

        if self.failing.contains(&job.ligand_name) {
            return Err(ScreenError::Invocation {
                tool: "vina".to_string(),
                status: "exit status: 1".to_string(),
                stderr: format!("mock failure for {}", job.ligand_name),
            });
        }

        let best = self.affinity(&job.ligand_name, job.repeat);
        let poses = [best, best + 0.3, best + 0.7];

        let log = if self.broken_logs.contains(&(job.ligand_name.clone(), job.repeat)) {
            "Reading input ... done.\nPerforming search ... ".to_string()
        } else {
            vina_log_text(&poses)
        };

        fs::write(&job.out, vina_pdbqt_text(&poses)).await?;
        fs::write(&job.log, log).await?;
        Ok(())
    }
}

/// Converter that copies files instead of running Open Babel.
#[derive(Default)]
pub struct MockConverter {
    failing: HashSet<String>,
    minimized: Mutex<usize>,
    converted: Mutex<usize>,
}

impl MockConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail any call whose input file stem is `stem`.
    pub fn failing_on(mut self, stem: &str) -> Self {
        self.failing.insert(stem.to_string());
        self
    }

    pub fn minimize_calls(&self) -> usize {
        self.minimized.lock().map(|n| *n).unwrap_or(0)
    }

    pub fn convert_calls(&self) -> usize {
        self.converted.lock().map(|n| *n).unwrap_or(0)
    }

    fn check(&self, input: &Path) -> Result<()> {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.failing.contains(&stem) {
            return Err(ScreenError::Invocation {
                tool: "obabel".to_string(),
                status: "exit status: 1".to_string(),
                stderr: format!("mock failure for {stem}"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl StructureConverter for MockConverter {
    async fn minimize(&self, input: &Path, output: &Path, _force_field: &str) -> Result<()> {
        self.check(input)?;
        let content = fs::read_to_string(input).await?;
        fs::write(output, format!("{content}\nminimized")).await?;
        if let Ok(mut n) = self.minimized.lock() {
            *n += 1;
        }
        Ok(())
    }

    async fn convert(&self, input: &Path, output: &Path) -> Result<()> {
        self.check(input)?;
        fs::copy(input, output).await?;
        if let Ok(mut n) = self.converted.lock() {
            *n += 1;
        }
        Ok(())
    }
}
