//! vinascreen: virtual screening of ligand libraries with AutoDock Vina.
//! Entry point for the command-line binary.

mod config;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use vinascreen_molecules::pipeline::{run_campaign, Session};
use vinascreen_molecules::sdf_split::{split_sdf, DEFAULT_MOLECULES_PER_FILE};
use vinascreen_molecules::vina_log::VinaLog;

#[derive(Parser, Debug)]
#[command(name = "vinascreen", version, about = "Virtual screening with AutoDock Vina")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Prepare, dock, rank and replicate a ligand library
    Run(RunArgs),

    /// Split a multi-molecule SDF file into batches
    SplitSdf {
        /// Input SDF file
        input: PathBuf,

        /// Output directory (defaults to the input's directory)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Molecules per output file
        #[arg(long, default_value_t = DEFAULT_MOLECULES_PER_FILE)]
        per_file: usize,
    },

    /// Print the result table of a Vina log
    ParseLog {
        log: PathBuf,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory of raw ligand files
    #[arg(long)]
    ligands: Option<PathBuf>,

    /// Single-pass docking output directory
    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long)]
    repeats: Option<usize>,

    #[arg(long)]
    exhaustiveness: Option<u32>,

    /// Number of best binders to keep
    #[arg(long)]
    top_n: Option<usize>,

    /// Minimise ligands before conversion
    #[arg(long)]
    minimize: bool,

    /// Stop after the single pass
    #[arg(long)]
    no_replication: bool,

    /// Split pose files after docking
    #[arg(long)]
    split_poses: bool,
}

impl RunArgs {
    fn overrides(&self) -> config::Overrides {
        config::Overrides {
            ligand_dir: self.ligands.clone(),
            output_dir: self.output.clone(),
            repeats: self.repeats,
            exhaustiveness: self.exhaustiveness,
            top_n: self.top_n,
            minimize: self.minimize,
            no_replication: self.no_replication,
            split_poses: self.split_poses,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("vinascreen=debug,info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run(args).await,
        Command::SplitSdf { input, out, per_file } => {
            let out = out.unwrap_or_else(|| {
                input.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."))
            });
            let summary = split_sdf(&input, &out, per_file)
                .with_context(|| format!("Failed to split {}", input.display()))?;
            println!("{} molecules written to {} files", summary.molecules, summary.files.len());
            Ok(())
        }
        Command::ParseLog { log } => {
            let text = std::fs::read_to_string(&log)
                .with_context(|| format!("Failed to read {}", log.display()))?;
            let parsed = VinaLog::parse(&text)
                .with_context(|| format!("No result table in {}", log.display()))?;
            println!("mode  affinity  rmsd l.b.  rmsd u.b.");
            for pose in parsed.poses() {
                println!(
                    "{:>4}  {:>8.1}  {:>9.3}  {:>9.3}",
                    pose.mode, pose.affinity, pose.rmsd_lb, pose.rmsd_ub
                );
            }
            println!("best: {} kcal/mol", parsed.best_affinity());
            Ok(())
        }
    }
}

async fn run(args: RunArgs) -> anyhow::Result<()> {
    info!("vinascreen {}", env!("CARGO_PKG_VERSION"));

    let mut screen_config = config::load(args.config.as_deref())?;
    config::apply_overrides(&mut screen_config, &args.overrides());
    info!(
        "Ligands: {:?}, repeats: {}, exhaustiveness: {}, top {}",
        screen_config.ligands.dir,
        screen_config.docking.effective_repeats(),
        screen_config.docking.exhaustiveness,
        screen_config.ranking.top_n
    );

    let mut session = Session::with_installed_tools(screen_config)?;
    let report = run_campaign(&mut session).await?;

    info!(
        "Best binders: {}",
        report.single_pass.ranking.names().join(", ")
    );
    info!("Statistics: {}", report.single_pass.statistics_file.display());
    if let Some(replication) = &report.replication {
        info!(
            "Replicated ranking: {}",
            replication.ranking.names().join(", ")
        );
        info!("Replication statistics: {}", replication.statistics_file.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sdf_defaults_to_thousand_per_file() {
        let cli = Cli::try_parse_from(["vinascreen", "split-sdf", "library.sdf"]).unwrap();
        match cli.command {
            Command::SplitSdf { input, out, per_file } => {
                assert_eq!(input, PathBuf::from("library.sdf"));
                assert_eq!(out, None);
                assert_eq!(per_file, 1000);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_split_sdf_per_file_override() {
        let cli = Cli::try_parse_from(["vinascreen", "split-sdf", "library.sdf", "--per-file", "50"])
            .unwrap();
        assert!(matches!(cli.command, Command::SplitSdf { per_file: 50, .. }));
    }

    #[test]
    fn test_run_flags() {
        let cli = Cli::try_parse_from(["vinascreen", "run", "--repeats", "0", "--no-replication"])
            .unwrap();
        let Command::Run(args) = cli.command else {
            panic!("expected the run command");
        };
        let overrides = args.overrides();
        assert_eq!(overrides.repeats, Some(0));
        assert!(overrides.no_replication);
        assert!(!overrides.minimize);
    }
}
