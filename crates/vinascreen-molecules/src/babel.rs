//! Structure conversion and minimisation using Open Babel.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};
use vinascreen_common::Result;

use crate::tools::run_checked;

/// Converts ligand structures between file formats.
///
/// Formats are taken from the file extensions of `input` and `output`.
#[async_trait]
pub trait StructureConverter: Send + Sync {
    /// Minimise the geometry of `input`, writing the result to `output`.
    async fn minimize(&self, input: &Path, output: &Path, force_field: &str) -> Result<()>;

    /// Convert `input` into the format implied by `output`'s extension.
    async fn convert(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Wrapper for `obabel` execution.
pub struct OpenBabelConverter {
    executable_path: PathBuf,
}

impl OpenBabelConverter {
    pub fn new<P: AsRef<Path>>(executable_path: P) -> Self {
        Self {
            executable_path: executable_path.as_ref().to_path_buf(),
        }
    }

    fn input_format(input: &Path) -> OsString {
        input
            .extension()
            .map(|e| e.to_os_string())
            .unwrap_or_else(|| OsString::from("sdf"))
    }

    pub fn minimize_args(input: &Path, output: &Path, force_field: &str) -> Vec<OsString> {
        vec![
            "-i".into(),
            Self::input_format(input),
            input.into(),
            "-O".into(),
            output.into(),
            "--minimize".into(),
            "--ff".into(),
            force_field.into(),
            "--sd".into(),
        ]
    }

    /// PDBQT output additionally gets hydrogens for pH 7.4 and Gasteiger charges.
    pub fn convert_args(input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-i".into(),
            Self::input_format(input),
            input.into(),
            "-O".into(),
            output.into(),
        ];
        let to_pdbqt = output
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("pdbqt"));
        if to_pdbqt {
            args.extend(["-p", "7.4", "--partialcharge", "gasteiger"].map(OsString::from));
        }
        args
    }
}

#[async_trait]
impl StructureConverter for OpenBabelConverter {
    async fn minimize(&self, input: &Path, output: &Path, force_field: &str) -> Result<()> {
        info!("Minimising {:?} with {} (steepest descent)", input, force_field);
        run_checked(
            "obabel",
            Command::new(&self.executable_path).args(Self::minimize_args(input, output, force_field)),
        )
        .await?;
        debug!("Minimised structure written to {:?}", output);
        Ok(())
    }

    async fn convert(&self, input: &Path, output: &Path) -> Result<()> {
        info!("Converting {:?} -> {:?}", input, output);
        run_checked(
            "obabel",
            Command::new(&self.executable_path).args(Self::convert_args(input, output)),
        )
        .await?;
        Ok(())
    }
}
