//! Task graph reader - rehydrates what the writer produced
//!
//! The read-side counterpart used by dashboards and orchestrators:
//! resolves reference tasks and include globs back into one merged,
//! flattened task list plus a status summary. Unlike write-side
//! reconciliation, a dangling reference here is a hard failure.

use crate::core::model::{Task, TaskFile, TaskSummary};
use crate::error::ConvertError;
use crate::jsonc;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Fully merged view of a change's task files
#[derive(Debug, Clone)]
pub struct TaskGraph {
    pub tasks: Vec<Task>,
    pub summary: TaskSummary,
}

/// Read a root task file and resolve it into a flattened task list.
///
/// Flat roots are returned as-is. Hierarchical roots have every
/// reference task replaced by its child file's tasks, with child ids
/// prefixed by the reference id where not already prefixed, so ids
/// stay globally unique and traceable to their section.
pub fn read_task_graph(root_path: &Path) -> Result<TaskGraph, ConvertError> {
    if !root_path.exists() {
        return Err(ConvertError::SourceNotFound {
            path: root_path.to_path_buf(),
        });
    }
    let root = jsonc::load_task_file(root_path)?;

    if !root.is_hierarchical() {
        let summary = TaskSummary::tally(&root.tasks);
        return Ok(TaskGraph {
            tasks: root.tasks,
            summary,
        });
    }

    let dir = root_path.parent().unwrap_or_else(|| Path::new("."));
    let mut loaded: HashSet<PathBuf> = HashSet::new();
    let mut merged = Vec::new();

    // Reference tasks expand in place, keeping root order
    for task in &root.tasks {
        match task.child_ref() {
            Some(reference) => {
                let child_path = dir.join(reference);
                if !child_path.exists() {
                    return Err(ConvertError::DanglingReference {
                        reference: reference.to_string(),
                        from: root_path.to_path_buf(),
                    });
                }
                if !loaded.insert(child_path.clone()) {
                    continue;
                }
                let child = jsonc::load_task_file(&child_path)?;
                fold_child(&child, Some(task.id.as_str()), &mut merged);
            }
            None => merged.push(task.clone()),
        }
    }

    // Include globs pick up child files no reference task points at
    for pattern in root.includes.iter().flatten() {
        let full = dir.join(pattern);
        let paths = glob::glob(&full.to_string_lossy()).map_err(|_| {
            ConvertError::DanglingReference {
                reference: pattern.clone(),
                from: root_path.to_path_buf(),
            }
        })?;

        let mut matched_any = false;
        for path in paths.flatten() {
            matched_any = true;
            if path == root_path || !loaded.insert(path.clone()) {
                continue;
            }
            let child = jsonc::load_task_file(&path)?;
            fold_child(&child, child.parent.as_deref(), &mut merged);
        }
        if !matched_any {
            return Err(ConvertError::DanglingReference {
                reference: pattern.clone(),
                from: root_path.to_path_buf(),
            });
        }
    }

    let summary = TaskSummary::tally(&merged);
    Ok(TaskGraph {
        tasks: merged,
        summary,
    })
}

/// Append a child file's tasks, prefixing ids with the parent reference
/// id where the child did not already do so.
fn fold_child(child: &TaskFile, parent_id: Option<&str>, merged: &mut Vec<Task>) {
    for task in &child.tasks {
        let mut task = task.clone();
        if let Some(parent) = parent_id {
            let already_prefixed =
                task.id == parent || task.id.starts_with(&format!("{parent}."));
            if !already_prefixed {
                task.id = format!("{parent}.{}", task.id);
            }
        }
        merged.push(task);
    }
}
