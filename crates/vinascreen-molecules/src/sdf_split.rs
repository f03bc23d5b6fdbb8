//! Splitting a concatenated SDF (e.g. a database export) into batches.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;
use vinascreen_common::{Result, ScreenError};

/// Record terminator of the SD file format.
const RECORD_END: &str = "$$$$";

/// Batch size used when the caller does not choose one.
pub const DEFAULT_MOLECULES_PER_FILE: usize = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct SdfSplitSummary {
    pub molecules: usize,
    pub files: Vec<PathBuf>,
}

/// Write the molecules of `input` to `<out_dir>/<stem>_<k>.sdf`, at most
/// `per_file` molecules per file. Trailing content without a terminator
/// counts as a final molecule.
pub fn split_sdf(input: &Path, out_dir: &Path, per_file: usize) -> Result<SdfSplitSummary> {
    if per_file == 0 {
        return Err(ScreenError::Config("per_file must be at least 1".to_string()));
    }

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "molecules".to_string());
    std::fs::create_dir_all(out_dir)?;

    let reader = BufReader::new(File::open(input)?);
    let mut summary = SdfSplitSummary {
        molecules: 0,
        files: Vec::new(),
    };
    let mut writer: Option<BufWriter<File>> = None;
    let mut in_chunk = 0;
    let mut pending = false;

    for line in reader.lines() {
        let line = line?;

        if writer.is_none() {
            if line.trim().is_empty() {
                continue;
            }
            let path = out_dir.join(format!("{stem}_{}.sdf", summary.files.len()));
            writer = Some(BufWriter::new(File::create(&path)?));
            summary.files.push(path);
        }
        if let Some(w) = writer.as_mut() {
            writeln!(w, "{line}")?;
        }

        if line.trim_end() == RECORD_END {
            summary.molecules += 1;
            in_chunk += 1;
            pending = false;
            if in_chunk == per_file {
                if let Some(mut w) = writer.take() {
                    w.flush()?;
                }
                in_chunk = 0;
            }
        } else if !line.trim().is_empty() {
            pending = true;
        }
    }

    if pending {
        summary.molecules += 1;
    }
    if let Some(mut w) = writer.take() {
        w.flush()?;
    }

    info!(
        "Split {} molecules from {:?} into {} files",
        summary.molecules,
        input,
        summary.files.len()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn molecule(name: &str) -> String {
        format!("{name}\n  vinascreen\n\n  0  0  0  0  0  0  0  0  0  0999 V2000\nM  END\n$$$$\n")
    }

    #[test]
    fn test_split_in_batches() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("compound.sdf");
        let content: String = (0..5).map(|i| molecule(&format!("mol{i}"))).collect();
        std::fs::write(&input, content).unwrap();

        let out = dir.path().join("batches");
        let summary = split_sdf(&input, &out, 2).unwrap();

        assert_eq!(summary.molecules, 5);
        assert_eq!(summary.files.len(), 3);
        assert_eq!(summary.files[0], out.join("compound_0.sdf"));

        let first = std::fs::read_to_string(&summary.files[0]).unwrap();
        assert_eq!(first, molecule("mol0") + &molecule("mol1"));
        let last = std::fs::read_to_string(&summary.files[2]).unwrap();
        assert_eq!(last, molecule("mol4"));
    }

    #[test]
    fn test_exact_multiple_leaves_no_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("set.sdf");
        std::fs::write(&input, molecule("a") + &molecule("b")).unwrap();

        let summary = split_sdf(&input, dir.path(), 2).unwrap();
        assert_eq!(summary.molecules, 2);
        assert_eq!(summary.files.len(), 1);
    }

    #[test]
    fn test_unterminated_trailing_record() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("set.sdf");
        std::fs::write(&input, molecule("a") + "b\n  partial\n").unwrap();

        let summary = split_sdf(&input, dir.path(), 10).unwrap();
        assert_eq!(summary.molecules, 2);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("set.sdf");
        std::fs::write(&input, molecule("a")).unwrap();
        assert!(matches!(split_sdf(&input, dir.path(), 0), Err(ScreenError::Config(_))));
    }
}
