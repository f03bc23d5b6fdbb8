//! vinascreen-molecules: Virtual screening pipeline around AutoDock Vina.
//!
//! Stages of a campaign:
//! 1. Preparing ligands (Open Babel minimisation and PDBQT conversion)
//! 2. Docking every ligand, once per repeat (AutoDock Vina)
//! 3. Extracting the best-pose affinity from each Vina log
//! 4. Aggregating and ranking ligands, exporting result tables
//! 5. Re-docking the best binders with more repeats and higher exhaustiveness

pub mod tools;
pub mod babel;
pub mod docking;
pub mod ligand;
pub mod layout;
pub mod phase;
pub mod prep;
pub mod vina_log;
pub mod dispatch;
pub mod extract;
pub mod poses;
pub mod sdf_split;
pub mod pipeline;
pub mod mock;

pub use vinascreen_common::{Result, ScreenError};
