//! AutoDock Vina log parsing.
//!
//! A Vina log is free-form text followed by the result table:
//!
//! ```text
//! mode |   affinity | dist from best mode
//!      | (kcal/mol) | rmsd l.b.| rmsd u.b.
//! -----+------------+----------+----------
//!    1         -7.3      0.000      0.000
//!    2         -7.1      1.842      2.610
//! Writing output ... done.
//! ```
//!
//! Pose lines start at mode 1 and count up; the table ends at the first line
//! that does not start with an integer. The affinity reported for a run is
//! the one of mode 1, the engine's best-ranked pose.

use serde::{Deserialize, Serialize};
use vinascreen_common::LogParseError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub mode: u32,
    /// kcal/mol, lower is stronger
    pub affinity: f64,
    pub rmsd_lb: f64,
    pub rmsd_ub: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VinaLog {
    poses: Vec<Pose>,
}

impl VinaLog {
    pub fn parse(text: &str) -> Result<Self, LogParseError> {
        let mut lines = text.lines().enumerate();

        lines
            .by_ref()
            .find(|(_, line)| is_table_header(line))
            .ok_or(LogParseError::MissingTableHeader)?;

        // The unit line sits between the header and the separator.
        let separated = lines.by_ref().take(2).any(|(_, line)| is_separator(line));
        if !separated {
            return Err(LogParseError::MissingSeparator);
        }

        let mut poses: Vec<Pose> = Vec::new();
        for (idx, line) in lines {
            let line_no = idx + 1;
            let mut fields = line.split_whitespace();
            let Some(first) = fields.next() else { break };
            let Ok(mode) = first.parse::<u32>() else { break };

            let expected = poses.len() as u32 + 1;
            if mode != expected {
                return Err(LogParseError::MalformedPose {
                    line: line_no,
                    reason: format!("expected mode {expected}, found {mode}"),
                });
            }

            let rest: Vec<&str> = fields.collect();
            if rest.len() != 3 {
                return Err(LogParseError::MalformedPose {
                    line: line_no,
                    reason: format!("expected 4 fields, found {}", rest.len() + 1),
                });
            }

            poses.push(Pose {
                mode,
                affinity: parse_value(rest[0], "affinity", line_no)?,
                rmsd_lb: parse_value(rest[1], "rmsd l.b.", line_no)?,
                rmsd_ub: parse_value(rest[2], "rmsd u.b.", line_no)?,
            });
        }

        if poses.is_empty() {
            return Err(LogParseError::NoPoses);
        }
        Ok(Self { poses })
    }

    pub fn poses(&self) -> &[Pose] {
        &self.poses
    }

    /// Affinity of the best-ranked pose (mode 1).
    pub fn best_affinity(&self) -> f64 {
        self.poses[0].affinity
    }
}

/// Parse `text` and return its best-pose affinity.
pub fn extract_affinity(text: &str) -> Result<f64, LogParseError> {
    VinaLog::parse(text).map(|log| log.best_affinity())
}

fn is_table_header(line: &str) -> bool {
    let mut parts = line.split('|');
    parts.next().is_some_and(|p| p.trim() == "mode") && parts.next().is_some()
}

fn is_separator(line: &str) -> bool {
    let line = line.trim();
    line.contains('+') && line.contains('-') && line.chars().all(|c| c == '-' || c == '+')
}

fn parse_value(field: &str, name: &str, line: usize) -> Result<f64, LogParseError> {
    match field.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(LogParseError::MalformedPose {
            line,
            reason: format!("{name} `{field}` is not a number"),
        }),
    }
}
