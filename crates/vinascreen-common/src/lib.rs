//! vinascreen-common: Shared error type and run configuration used across all vinascreen crates.

pub mod error;
pub mod screen_config;

// Re-export commonly used types
pub use error::{LogParseError, Result, ScreenError};
pub use screen_config::{
    DockingSettings, LigandSettings, OutputSettings, RankingSettings, ReplicationSettings,
    ScreenConfig, ToolSettings,
};
