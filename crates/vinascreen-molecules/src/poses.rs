//! Splitting multi-pose docking output into one file per pose.
//!
//! Vina writes every pose of a run into one PDBQT file, each wrapped in a
//! `MODEL`/`ENDMDL` block with a `REMARK VINA RESULT:` line giving the
//! affinity and the RMSD bounds to the best pose.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{info, warn};
use vinascreen_common::Result;

use crate::babel::StructureConverter;
use crate::layout::RunLayout;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseResult {
    pub affinity: f64,
    pub rmsd_lb: f64,
    pub rmsd_ub: f64,
}

/// One `MODEL` block of a PDBQT result file.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseBlock {
    /// 1-based position in the file
    pub index: usize,
    pub result: Option<PoseResult>,
    pub text: String,
}

impl PoseBlock {
    /// `<ligand>_pass<repeat>_pose<index>_affinity=<a>_rmsMAX=<ub>_rmsMIN=<lb>`
    pub fn file_stem(&self, ligand: &str, repeat: usize) -> String {
        match self.result {
            Some(r) => format!(
                "{ligand}_pass{repeat}_pose{}_affinity={}_rmsMAX={}_rmsMIN={}",
                self.index, r.affinity, r.rmsd_ub, r.rmsd_lb
            ),
            None => format!("{ligand}_pass{repeat}_pose{}", self.index),
        }
    }
}

/// Split PDBQT text into its `MODEL` blocks. Lines outside any block are dropped.
pub fn split_models(text: &str) -> Vec<PoseBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<PoseBlock> = None;

    for line in text.lines() {
        let record = line.split_whitespace().next().unwrap_or("");
        match record {
            "MODEL" => {
                current = Some(PoseBlock {
                    index: blocks.len() + 1,
                    result: None,
                    text: String::new(),
                });
            }
            "REMARK" => {
                if let Some(block) = current.as_mut() {
                    if block.result.is_none() {
                        block.result = parse_vina_remark(line);
                    }
                }
            }
            _ => {}
        }

        if let Some(block) = current.as_mut() {
            block.text.push_str(line);
            block.text.push('\n');
        }

        if record == "ENDMDL" {
            if let Some(block) = current.take() {
                blocks.push(block);
            }
        }
    }

    blocks
}

fn parse_vina_remark(line: &str) -> Option<PoseResult> {
    let rest = line.split_once("VINA RESULT:")?.1;
    let values: Vec<f64> = rest
        .split_whitespace()
        .take(3)
        .map(|v| v.parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .ok()?;
    match values.as_slice() {
        [affinity, rmsd_lb, rmsd_ub] => Some(PoseResult {
            affinity: *affinity,
            rmsd_lb: *rmsd_lb,
            rmsd_ub: *rmsd_ub,
        }),
        _ => None,
    }
}

/// Split every pose file under `output_dir` (laid out per [`RunLayout`]).
///
/// Pose files are written next to the concatenated file, which is removed
/// once all its poses are on disk. With a converter each pose is also
/// written as SDF. Returns the number of poses written.
pub async fn split_poses(
    output_dir: &Path,
    converter: Option<&dyn StructureConverter>,
) -> Result<usize> {
    info!("Splitting docking poses under {:?}", output_dir);
    let mut written = 0;

    for ligand_dir in subdirectories(output_dir).await? {
        let ligand = dir_name(&ligand_dir);
        for repeat_dir in subdirectories(&ligand_dir).await? {
            let Ok(repeat) = dir_name(&repeat_dir).parse::<usize>() else {
                continue;
            };

            let mut entries = fs::read_dir(&repeat_dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let file_name = entry.file_name().to_string_lossy().into_owned();
                if !RunLayout::is_pose_file_name(&file_name) {
                    continue;
                }
                written += split_file(&entry.path(), &ligand, repeat, converter).await?;
            }
        }
    }

    info!("Wrote {} pose files", written);
    Ok(written)
}

async fn split_file(
    path: &Path,
    ligand: &str,
    repeat: usize,
    converter: Option<&dyn StructureConverter>,
) -> Result<usize> {
    let text = fs::read_to_string(path).await?;
    let blocks = split_models(&text);
    if blocks.is_empty() {
        warn!("No MODEL blocks in {:?}, leaving it in place", path);
        return Ok(0);
    }

    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    for block in &blocks {
        let stem = block.file_stem(ligand, repeat);
        let pose_path = dir.join(format!("{stem}.pdbqt"));
        fs::write(&pose_path, &block.text).await?;
        if let Some(converter) = converter {
            converter.convert(&pose_path, &pose_path.with_extension("sdf")).await?;
        }
    }

    fs::remove_file(path).await?;
    Ok(blocks.len())
}

async fn subdirectories(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{vina_pdbqt_text, MockConverter};

    #[test]
    fn test_split_models() {
        let blocks = split_models(&vina_pdbqt_text(&[-7.3, -7.0]));
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].index, 1);
        assert_eq!(
            blocks[0].result,
            Some(PoseResult { affinity: -7.3, rmsd_lb: 0.0, rmsd_ub: 0.0 })
        );
        assert_eq!(blocks[1].result.map(|r| r.affinity), Some(-7.0));
        assert!(blocks[1].text.starts_with("MODEL 2\n"));
        assert!(blocks[1].text.ends_with("ENDMDL\n"));
    }

    #[test]
    fn test_pose_file_stem() {
        let blocks = split_models(&vina_pdbqt_text(&[-7.3]));
        assert_eq!(
            blocks[0].file_stem("aspirin", 2),
            "aspirin_pass2_pose1_affinity=-7.3_rmsMAX=0_rmsMIN=0"
        );
    }

    #[test]
    fn test_remark_without_values() {
        let text = "MODEL 1\nREMARK VINA RESULT:\nENDMDL\n";
        let blocks = split_models(text);
        assert_eq!(blocks[0].result, None);
        assert_eq!(blocks[0].file_stem("x", 0), "x_pass0_pose1");
    }

    #[tokio::test]
    async fn test_split_poses_on_layout() {
        let dir = tempfile::tempdir().unwrap();
        let layout = RunLayout::new(dir.path());
        for repeat in 0..2 {
            std::fs::create_dir_all(layout.repeat_dir("lig", repeat)).unwrap();
            std::fs::write(layout.pose_file("lig", repeat), vina_pdbqt_text(&[-8.0, -7.5, -7.1])).unwrap();
            std::fs::write(layout.log_file("lig", repeat), "log").unwrap();
        }

        let converter = MockConverter::new();
        let written = split_poses(dir.path(), Some(&converter)).await.unwrap();

        assert_eq!(written, 6);
        assert_eq!(converter.convert_calls(), 6);
        assert!(!layout.pose_file("lig", 0).exists());
        assert!(layout.log_file("lig", 0).exists());
        let first = layout
            .repeat_dir("lig", 1)
            .join("lig_pass1_pose1_affinity=-8_rmsMAX=0_rmsMIN=0.pdbqt");
        assert!(first.exists());
        assert!(first.with_extension("sdf").exists());
    }
}
