//! Task data model - the persisted task-file format and its records

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix used by `children` references, e.g. `$ref:tasks.2.jsonc`
pub const REF_PREFIX: &str = "$ref:";

/// Task status enum — replaces raw status strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// One line item of a change's task list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Dot-delimited hierarchical id, e.g. "2.3"; unique within its file
    pub id: String,
    /// Section label this task belongs to; may be empty
    #[serde(default)]
    pub section: String,
    /// Free text; round-trips losslessly through serialization
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    /// Reference to a child file (`$ref:<relative-path>`). A task with
    /// `children` set carries an aggregate status, not an edited one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<String>,
}

impl Task {
    pub fn new(id: impl Into<String>, section: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            section: section.into(),
            description: description.into(),
            status: TaskStatus::Pending,
            children: None,
        }
    }

    /// Child file path carried by a reference task, without the `$ref:` prefix
    pub fn child_ref(&self) -> Option<&str> {
        self.children
            .as_deref()
            .map(|r| r.strip_prefix(REF_PREFIX).unwrap_or(r))
    }

    /// Section number derived from the id: the prefix before the first `.`,
    /// or None for ids with no dot (the no-section bucket).
    pub fn section_number(&self) -> Option<&str> {
        let (prefix, _) = self.id.split_once('.')?;
        Some(prefix)
    }
}

/// A persisted unit: the root task file or one child file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFile {
    /// 1 = flat, 2 = hierarchical-capable
    pub version: u32,
    /// Ordered; order is significant and preserved
    #[serde(default)]
    pub tasks: Vec<Task>,
    /// Glob patterns used to discover child files (v2 root only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub includes: Option<Vec<String>>,
    /// Id of the owning reference task in the root file (v2 child only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl TaskFile {
    pub fn flat(tasks: Vec<Task>) -> Self {
        Self {
            version: 1,
            tasks,
            includes: None,
            parent: None,
        }
    }

    /// Whether this root file describes a hierarchical layout
    pub fn is_hierarchical(&self) -> bool {
        self.version >= 2
            && (self.includes.as_ref().is_some_and(|i| !i.is_empty())
                || self.tasks.iter().any(|t| t.children.is_some()))
    }
}

/// Tally of task statuses across a merged task list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub pending: usize,
}

impl TaskSummary {
    pub fn tally(tasks: &[Task]) -> Self {
        Self::tally_statuses(tasks.iter().map(|t| t.status))
    }

    pub fn tally_statuses<I: IntoIterator<Item = TaskStatus>>(statuses: I) -> Self {
        let mut summary = Self::default();
        for status in statuses {
            summary.total += 1;
            match status {
                TaskStatus::Completed => summary.completed += 1,
                TaskStatus::InProgress => summary.in_progress += 1,
                TaskStatus::Pending => summary.pending += 1,
            }
        }
        summary
    }
}
