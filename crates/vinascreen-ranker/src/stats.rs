//! Per-ligand affinity aggregation.

use serde::{Deserialize, Serialize};
use vinascreen_common::{Result, ScreenError};

/// Raw affinities collected for one ligand, ordered by repeat index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LigandRecord {
    pub name: String,
    pub affinities: Vec<f64>,
}

impl LigandRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            affinities: Vec::new(),
        }
    }

    pub fn with_affinities(name: impl Into<String>, affinities: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            affinities,
        }
    }

    pub fn push(&mut self, affinity: f64) {
        self.affinities.push(affinity);
    }

    /// Affinity of the first repeat, used as the ranking key.
    pub fn first(&self) -> Option<f64> {
        self.affinities.first().copied()
    }

    pub fn stats(&self, expected: usize) -> Result<AffinityStats> {
        AffinityStats::from_samples(&self.name, &self.affinities, expected)
    }
}

/// One statistics row: (ligand, mean, standard deviation, sample count).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffinityStats {
    pub ligand: String,
    pub mean: f64,
    pub std_dev: f64,
    pub samples: usize,
}

impl AffinityStats {
    /// Aggregate the samples of one ligand.
    ///
    /// The sample count must equal `expected` (the phase's repeat count).
    /// With a single sample the mean is that sample and the deviation is 0;
    /// from two samples on the deviation is the sample (n - 1) estimate.
    pub fn from_samples(ligand: &str, samples: &[f64], expected: usize) -> Result<Self> {
        if samples.is_empty() || samples.len() != expected {
            return Err(ScreenError::IncompleteSamples {
                ligand: ligand.to_string(),
                expected,
                actual: samples.len(),
            });
        }

        let (mean, std_dev) = if samples.len() < 2 {
            (samples[0], 0.0)
        } else {
            (mean(samples), sample_std_dev(samples))
        };

        Ok(Self {
            ligand: ligand.to_string(),
            mean,
            std_dev,
            samples: samples.len(),
        })
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (Bessel-corrected). Returns 0 below two values.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (n - 1) as f64).sqrt()
}
