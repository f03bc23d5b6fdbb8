//! vinascreen-ranker: Affinity statistics, result tables and best-binder ranking.

pub mod stats;
pub mod table;
pub mod ranking;

pub use ranking::{rank, Ranking};
pub use stats::{AffinityStats, LigandRecord};
pub use table::{OutputTable, PhaseTables, SampleTable, StatisticsTable};
