//! Best-binder selection.
//!
//! Lower (more negative) affinity means stronger predicted binding, so the
//! ranking sorts ascending. The key is each ligand's first-repeat affinity.

use serde::{Deserialize, Serialize};
use tracing::info;
use vinascreen_common::{Result, ScreenError};

use crate::table::SampleTable;

/// Ligand names ordered from best to worst binder, truncated to the requested size.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ranking {
    names: Vec<String>,
}

impl Ranking {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, ligand: &str) -> bool {
        self.names.iter().any(|n| n == ligand)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Ranking {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Select the `n` best binders of `samples`.
///
/// The sort is stable, so ligands with equal keys keep their table order.
/// An empty table is an error rather than an empty ranking.
pub fn rank(samples: &SampleTable, n: usize) -> Result<Ranking> {
    if samples.is_empty() {
        return Err(ScreenError::EmptyTable);
    }

    let mut keyed: Vec<(&str, f64)> = Vec::with_capacity(samples.len());
    for record in samples.records() {
        let key = record.first().ok_or_else(|| ScreenError::IncompleteSamples {
            ligand: record.name.clone(),
            expected: samples.repeats(),
            actual: 0,
        })?;
        keyed.push((record.name.as_str(), key));
    }

    keyed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let ranking: Ranking = keyed.into_iter().take(n).map(|(name, _)| name).collect();
    info!("Best binders (top {}): {:?}", n, ranking.names());
    Ok(ranking)
}
