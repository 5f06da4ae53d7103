//! Error types for the conversion pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while converting or reading task files
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Input file or change directory is missing
    #[error("source not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// Non-empty source contained no recognizable checklist lines.
    /// Distinct from the empty case: this usually means the file is
    /// not written in the task-list dialect at all.
    #[error("no tasks recognized in {path}: file is not empty but no checklist lines matched")]
    FormatMismatch { path: PathBuf },

    /// The change failed pre-conversion validation
    #[error("validation failed: {}", .issues.join("; "))]
    ValidationFailed { issues: Vec<String> },

    /// An upstream proposal this change depends on is not satisfied
    #[error("dependency unmet: {reason}")]
    DependencyUnmet { reason: String },

    /// A child reference or include pattern resolved to nothing
    #[error("dangling reference {reference} in {from}")]
    DanglingReference { reference: String, from: PathBuf },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
