//! Conversion pipeline - markdown source to persisted task files
//!
//! One conversion run is strictly sequential: validate, parse, append
//! configured extra tasks, resolve the split strategy, group, reconcile
//! against prior output, write. A failing validator or dependency check
//! aborts before any output is touched.

use crate::core::grouper::{self, SplitStrategy};
use crate::core::model::Task;
use crate::core::parser;
use crate::core::reconcile;
use crate::core::writer::{self, WriteReport, ROOT_FILE};
use crate::error::ConvertError;
use chrono::{DateTime, Utc};
use std::path::Path;

/// Markdown source file name within a change directory
pub const SOURCE_FILE: &str = "tasks.md";

/// Outcome of a pre-conversion validation run
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub passed: bool,
    pub issues: Vec<String>,
}

impl ValidationReport {
    pub fn pass() -> Self {
        Self {
            passed: true,
            issues: Vec::new(),
        }
    }
}

/// Validates the broader change structure before conversion
pub trait ChangeValidator {
    fn validate(&self, change_dir: &Path) -> Result<ValidationReport, ConvertError>;
}

/// Checks upstream-proposal prerequisites before conversion
pub trait DependencyChecker {
    fn check(&self, change_dir: &Path) -> Result<(), ConvertError>;
}

/// Externally configured fixed task, appended after parsing
#[derive(Debug, Clone)]
pub struct ExtraTask {
    pub section: String,
    pub description: String,
}

/// One conversion invocation
pub struct ConvertRequest<'a> {
    pub change_dir: &'a Path,
    pub validator: Option<&'a dyn ChangeValidator>,
    pub dependencies: Option<&'a dyn DependencyChecker>,
    pub extra_tasks: &'a [ExtraTask],
}

impl<'a> ConvertRequest<'a> {
    pub fn new(change_dir: &'a Path) -> Self {
        Self {
            change_dir,
            validator: None,
            dependencies: None,
            extra_tasks: &[],
        }
    }
}

/// What a conversion run produced
#[derive(Debug, Clone)]
pub struct ConvertOutcome {
    pub change: String,
    pub report: WriteReport,
    pub converted_at: DateTime<Utc>,
}

/// Convert a change's markdown task list into its structured output,
/// carrying forward any status recorded since the previous run.
pub fn convert_change(request: &ConvertRequest) -> Result<ConvertOutcome, ConvertError> {
    let change_dir = request.change_dir;
    if !change_dir.is_dir() {
        return Err(ConvertError::SourceNotFound {
            path: change_dir.to_path_buf(),
        });
    }
    let change = change_dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("change")
        .to_string();

    if let Some(validator) = request.validator {
        let report = validator.validate(change_dir)?;
        if !report.passed {
            return Err(ConvertError::ValidationFailed {
                issues: report.issues,
            });
        }
    }
    if let Some(checker) = request.dependencies {
        checker.check(change_dir)?;
    }

    let source_path = change_dir.join(SOURCE_FILE);
    if !source_path.exists() {
        return Err(ConvertError::SourceNotFound { path: source_path });
    }
    let source = std::fs::read_to_string(&source_path)?;
    let mut tasks = parser::parse(&source, &source_path)?;

    append_extra_tasks(&mut tasks, request.extra_tasks);

    let status_map = reconcile::load_status_map(&change_dir.join(ROOT_FILE));
    reconcile::apply_status_map(&mut tasks, &status_map);

    let strategy = SplitStrategy::resolve(change_dir);
    let grouped = grouper::group(tasks, &strategy);

    let report = writer::write_output(change_dir, &change, grouped)?;
    log::info!(
        "converted change '{}': {} task(s), {} layout",
        change,
        report.summary.total,
        if report.hierarchical { "hierarchical" } else { "flat" }
    );

    Ok(ConvertOutcome {
        change,
        report,
        converted_at: Utc::now(),
    })
}

/// Append configured extra tasks after the parsed list, continuing the
/// id sequence exactly as if their lines had been at the end of the
/// markdown source.
fn append_extra_tasks(tasks: &mut Vec<Task>, extras: &[ExtraTask]) {
    for extra in extras {
        let id = match tasks.last().and_then(|t| t.section_number()) {
            Some(num) => {
                let seq = tasks
                    .iter()
                    .filter(|t| t.section_number() == Some(num))
                    .count();
                format!("{}.{}", num, seq + 1)
            }
            None => (tasks.len() + 1).to_string(),
        };
        tasks.push(Task::new(id, extra.section.clone(), extra.description.clone()));
    }
}
