//! taskdown - markdown checklists to structured task files
//!
//! Converts a checkbox-style markdown task list into a JSONC task
//! record set and keeps that set consistent across repeated
//! conversions: statuses recorded in the output since the last run are
//! carried forward, never reset.

pub mod convert;
pub mod core;
pub mod discovery;
pub mod error;
pub mod jsonc;

// Re-exports
pub use convert::{convert_change, ConvertOutcome, ConvertRequest};
pub use core::{read_task_graph, Task, TaskFile, TaskGraph, TaskStatus, TaskSummary};
pub use discovery::RootCache;
pub use error::ConvertError;

/// Result type alias
pub type Result<T> = anyhow::Result<T>;
