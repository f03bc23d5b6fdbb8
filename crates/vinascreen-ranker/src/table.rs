//! Result tables and their comma-separated export.
//!
//! Export writes plain comma-joined fields with no quoting or escaping. A
//! ligand name containing a comma therefore corrupts its row; ligand names
//! come from file stems and are expected not to contain one.

use std::path::Path;

use tracing::{debug, info};
use vinascreen_common::Result;

use crate::stats::{AffinityStats, LigandRecord};

/// Header of the statistics table.
pub const STATISTICS_HEADER: [&str; 4] = ["Ligand", "mean-dG", "stdev-dG", "#samples"];

/// A header row followed by data rows, all as text fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutputTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl OutputTable {
    pub fn new<S: Into<String>>(header: impl IntoIterator<Item = S>) -> Self {
        Self {
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Write the table to `path`, header first, overwriting any existing file.
    ///
    /// Every row must carry as many fields as the header.
    pub fn export(&self, path: &Path) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Never)
            .from_path(path)?;

        writer.write_record(&self.header)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;

        info!("Wrote {} rows to {}", self.rows.len(), path.display());
        Ok(())
    }

    /// Read a file written by [`OutputTable::export`].
    pub fn read(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)?;

        let mut records = reader
            .records()
            .map(|r| r.map(|rec| rec.iter().map(str::to_string).collect::<Vec<_>>()));

        let header = match records.next() {
            Some(h) => h?,
            None => Vec::new(),
        };
        let rows = records.collect::<std::result::Result<Vec<_>, _>>()?;

        debug!("Read {} rows from {}", rows.len(), path.display());
        Ok(Self { header, rows })
    }
}

// ── Raw samples ──────────────────────────────────────────────────────────────

/// Raw per-repeat affinities of every processed ligand, in processing order.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleTable {
    repeats: usize,
    records: Vec<LigandRecord>,
}

impl SampleTable {
    pub fn new(repeats: usize) -> Self {
        Self {
            repeats,
            records: Vec::new(),
        }
    }

    pub fn repeats(&self) -> usize {
        self.repeats
    }

    pub fn records(&self) -> &[LigandRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn get(&self, ligand: &str) -> Option<&LigandRecord> {
        self.records.iter().find(|r| r.name == ligand)
    }

    pub fn to_table(&self) -> OutputTable {
        let header = std::iter::once("Ligand".to_string())
            .chain((0..self.repeats).map(|r| format!("pass-{r}")));
        let mut table = OutputTable::new(header);
        for record in &self.records {
            let row = std::iter::once(record.name.clone())
                .chain(record.affinities.iter().map(|a| a.to_string()))
                .collect();
            table.push_row(row);
        }
        table
    }
}

// ── Statistics ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatisticsTable {
    rows: Vec<AffinityStats>,
}

impl StatisticsTable {
    pub fn rows(&self) -> &[AffinityStats] {
        &self.rows
    }

    pub fn get(&self, ligand: &str) -> Option<&AffinityStats> {
        self.rows.iter().find(|r| r.ligand == ligand)
    }

    pub fn to_table(&self) -> OutputTable {
        let mut table = OutputTable::new(STATISTICS_HEADER);
        for row in &self.rows {
            table.push_row(vec![
                row.ligand.clone(),
                row.mean.to_string(),
                row.std_dev.to_string(),
                row.samples.to_string(),
            ]);
        }
        table
    }
}

// ── Phase tables ─────────────────────────────────────────────────────────────

/// The two tables produced by one phase (single pass or replication).
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseTables {
    pub samples: SampleTable,
    pub statistics: StatisticsTable,
}

impl PhaseTables {
    pub fn new(repeats: usize) -> Self {
        Self {
            samples: SampleTable::new(repeats),
            statistics: StatisticsTable::default(),
        }
    }

    /// Aggregate `record` and append it to both tables.
    ///
    /// A record whose sample count differs from the phase's repeat count is
    /// rejected and neither table is touched.
    pub fn push(&mut self, record: LigandRecord) -> Result<&AffinityStats> {
        let stats = record.stats(self.samples.repeats)?;
        self.samples.records.push(record);
        self.statistics.rows.push(stats);
        Ok(&self.statistics.rows[self.statistics.rows.len() - 1])
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
