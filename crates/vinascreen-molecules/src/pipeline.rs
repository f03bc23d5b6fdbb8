//! Orchestrator for a screening campaign.
//!
//! A [`Session`] moves through `Idle -> SinglePassComplete -> ReplicationComplete`.
//! Each phase produces its own tables and ranking; nothing from the single
//! pass is overwritten by the replication.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};
use vinascreen_common::{Result, ScreenConfig, ScreenError};
use vinascreen_ranker::{rank, PhaseTables, Ranking};

use crate::babel::{OpenBabelConverter, StructureConverter};
use crate::dispatch::run_pass;
use crate::docking::{DockingEngine, VinaRunner};
use crate::extract::extract;
use crate::ligand::LigandSelection;
use crate::phase::{Phase, PhaseConfig};
use crate::poses::split_poses;
use crate::prep::prepare_ligands;
use crate::tools::ensure_available;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    SinglePassComplete,
    ReplicationComplete,
    /// A phase failed; the session cannot continue.
    Failed,
}

/// Outcome of one phase.
#[derive(Debug, Clone)]
pub struct PhaseReport {
    pub config: PhaseConfig,
    pub docked: Vec<String>,
    pub tables: PhaseTables,
    pub ranking: Ranking,
    pub statistics_file: PathBuf,
    pub samples_file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct CampaignReport {
    pub prepared: Vec<PathBuf>,
    pub single_pass: PhaseReport,
    pub replication: Option<PhaseReport>,
    pub poses_written: usize,
}

pub struct Session {
    config: ScreenConfig,
    single_pass: PhaseConfig,
    converter: Arc<dyn StructureConverter>,
    engine: Arc<dyn DockingEngine>,
    state: SessionState,
    ranking: Option<Ranking>,
    replication: Option<PhaseConfig>,
    date: NaiveDate,
}

impl Session {
    /// Build a session around the given collaborators.
    pub fn new(
        mut config: ScreenConfig,
        converter: Arc<dyn StructureConverter>,
        engine: Arc<dyn DockingEngine>,
    ) -> Result<Self> {
        config.clamp_repeats();
        config.validate()?;
        let single_pass = PhaseConfig::single_pass(&config);
        Ok(Self {
            config,
            single_pass,
            converter,
            engine,
            state: SessionState::Idle,
            ranking: None,
            replication: None,
            date: chrono::Local::now().date_naive(),
        })
    }

    /// Build a session using the installed `obabel` and `vina`.
    ///
    /// Both executables must resolve before any work starts.
    pub fn with_installed_tools(config: ScreenConfig) -> Result<Self> {
        let obabel = ensure_available(&config.tools.obabel)?;
        let vina = ensure_available(&config.tools.vina)?;
        info!("AutoDock Vina and Open Babel are available");

        let converter = Arc::new(OpenBabelConverter::new(obabel));
        let engine = Arc::new(VinaRunner::new(vina).with_cpu(config.docking.cpu));
        Self::new(config, converter, engine)
    }

    /// Date stamped into result file names.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &ScreenConfig {
        &self.config
    }

    pub fn single_pass_config(&self) -> &PhaseConfig {
        &self.single_pass
    }

    /// Ranking of the single pass, once it has completed.
    pub fn ranking(&self) -> Option<&Ranking> {
        self.ranking.as_ref()
    }

    /// Convert (and optionally minimise) the raw ligands.
    pub async fn prepare(&self) -> Result<Vec<PathBuf>> {
        self.expect_state(SessionState::Idle, "prepare")?;
        prepare_ligands(self.converter.as_ref(), &self.config.ligands).await
    }

    /// Dock and score every prepared ligand, rank, and export.
    pub async fn screen(&mut self) -> Result<PhaseReport> {
        self.expect_state(SessionState::Idle, "screen")?;

        let phase = self.single_pass.clone();
        let output = self.config.output.clone();
        let result = self
            .run_phase(
                &phase,
                &LigandSelection::All,
                self.config.ranking.top_n,
                &output.stats_prefix,
                &output.samples_prefix,
            )
            .await;

        match result {
            Ok(report) => {
                self.ranking = Some(report.ranking.clone());
                self.state = SessionState::SinglePassComplete;
                info!("Single pass complete");
                Ok(report)
            }
            Err(e) => {
                self.state = SessionState::Failed;
                Err(e)
            }
        }
    }

    /// Re-dock the single-pass best binders with new parameters.
    ///
    /// Only ligands of the single-pass ranking are docked and extracted.
    /// The replicated tables are re-ranked over the same number of ligands.
    pub async fn verify(
        &mut self,
        output_dir: &Path,
        repeats: usize,
        exhaustiveness: u32,
    ) -> Result<PhaseReport> {
        self.expect_state(SessionState::SinglePassComplete, "verify")?;
        let ranking = self.ranking.clone().ok_or_else(|| {
            ScreenError::InvalidTransition("no ranking from the single pass".to_string())
        })?;

        let phase = self.single_pass.for_replication(output_dir, repeats, exhaustiveness);
        info!(
            "Verifying {} best binders: {} repeats, exhaustiveness {}, output {:?}",
            ranking.len(),
            phase.repeats,
            phase.exhaustiveness,
            phase.output_dir
        );

        let output = self.config.output.clone();
        let result = self
            .run_phase(
                &phase,
                &LigandSelection::Only(&ranking),
                ranking.len(),
                &output.replication_stats_prefix,
                &output.replication_samples_prefix,
            )
            .await;

        match result {
            Ok(report) => {
                if report.ranking.names().first() != ranking.names().first() {
                    warn!(
                        "Best binder changed on replication: {:?} -> {:?}",
                        ranking.names().first(),
                        report.ranking.names().first()
                    );
                }
                self.replication = Some(phase);
                self.state = SessionState::ReplicationComplete;
                info!("Replication complete");
                Ok(report)
            }
            Err(e) => {
                self.state = SessionState::Failed;
                Err(e)
            }
        }
    }

    /// Split the pose files of a completed phase into one file per pose.
    pub async fn split_poses(&self, phase: Phase, convert_to_sdf: bool) -> Result<usize> {
        let output_dir = match (phase, self.state, &self.replication) {
            (
                Phase::SinglePass,
                SessionState::SinglePassComplete | SessionState::ReplicationComplete,
                _,
            ) => &self.single_pass.output_dir,
            (Phase::Replicated, SessionState::ReplicationComplete, Some(p)) => &p.output_dir,
            _ => {
                return Err(ScreenError::InvalidTransition(format!(
                    "cannot split {phase} poses, session is {:?}",
                    self.state
                )))
            }
        };
        let converter = convert_to_sdf.then(|| self.converter.as_ref());
        split_poses(output_dir, converter).await
    }

    async fn run_phase(
        &self,
        phase: &PhaseConfig,
        selection: &LigandSelection<'_>,
        top_n: usize,
        stats_prefix: &str,
        samples_prefix: &str,
    ) -> Result<PhaseReport> {
        let docked = run_pass(self.engine.as_ref(), phase, selection).await?;
        let tables = extract(phase, selection).await?;
        let ranking = rank(&tables.samples, top_n)?;

        let output = &self.config.output;
        tokio::fs::create_dir_all(&output.results_dir).await?;
        let samples_file = output.result_path(samples_prefix, phase.repeats, self.date);
        let statistics_file = output.result_path(stats_prefix, phase.repeats, self.date);
        tables.samples.to_table().export(&samples_file)?;
        tables.statistics.to_table().export(&statistics_file)?;

        Ok(PhaseReport {
            config: phase.clone(),
            docked,
            tables,
            ranking,
            statistics_file,
            samples_file,
        })
    }

    fn expect_state(&self, expected: SessionState, operation: &str) -> Result<()> {
        if self.state != expected {
            return Err(ScreenError::InvalidTransition(format!(
                "{operation} requires state {expected:?}, session is {:?}",
                self.state
            )));
        }
        Ok(())
    }
}

/// Run a whole campaign as configured: prepare, screen, verify.
///
/// With `output.split_poses` on, each phase's pose files are split as soon
/// as that phase completes.
pub async fn run_campaign(session: &mut Session) -> Result<CampaignReport> {
    let split = session.config().output.split_poses;

    let prepared = session.prepare().await?;
    let single_pass = session.screen().await?;
    let mut poses_written = 0;
    if split {
        poses_written += session.split_poses(Phase::SinglePass, true).await?;
    }

    let replication_settings = session.config().replication.clone();
    let replication = if replication_settings.enabled {
        Some(
            session
                .verify(
                    &replication_settings.output_dir,
                    replication_settings.repeats,
                    replication_settings.exhaustiveness,
                )
                .await?,
        )
    } else {
        info!("Replication disabled, stopping after the single pass");
        None
    };

    if split && replication.is_some() {
        poses_written += session.split_poses(Phase::Replicated, true).await?;
    }

    Ok(CampaignReport {
        prepared,
        single_pass,
        replication,
        poses_written,
    })
}
