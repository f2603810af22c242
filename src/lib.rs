#![deny(clippy::all)]

pub mod config;
pub mod consolidation;
pub mod error;

#[cfg(feature = "node")]
mod node;

pub use config::ConsolidateOptions;
pub use consolidation::host::{ItemKind, Project, SourceKind, UndoGroup};
pub use consolidation::memory::{Layer, MemoryProject, ProjectSnapshot};
pub use consolidation::run::{Decision, RunOutcome, RunReport, analyze, execute, run_consolidation};
pub use consolidation::{AssetItem, Category, Consumer, ItemId, Rgb, SyntheticSource};
pub use error::{ConsolidateError, Result};
