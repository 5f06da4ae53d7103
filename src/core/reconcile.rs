//! Status reconciliation - carry recorded status across conversions
//!
//! Task records are rebuilt from markdown on every run; only `status`
//! has a persistent lifetime. Before writing, the statuses recorded in
//! whatever output already exists (flat or hierarchical) are loaded into
//! an id -> status map and applied to the freshly parsed tasks, so a
//! status set by an external process is never reset by a re-conversion.

use crate::core::model::{Task, TaskFile, TaskStatus};
use crate::jsonc;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Load the id -> status map from a previously written root file and,
/// for hierarchical layouts, every resolvable child file.
///
/// This is the recoverable side of reconciliation: a missing root, an
/// unparseable file or a dangling reference simply contributes nothing
/// to the map rather than aborting the run.
pub fn load_status_map(root_path: &Path) -> HashMap<String, TaskStatus> {
    let mut map = HashMap::new();

    let root = match jsonc::load_task_file(root_path) {
        Ok(file) => file,
        Err(err) => {
            if root_path.exists() {
                log::warn!(
                    "ignoring unreadable prior output {}: {}",
                    root_path.display(),
                    err
                );
            }
            return map;
        }
    };

    collect_statuses(&root, &mut map);

    if root.is_hierarchical() {
        for child_path in child_paths(root_path, &root) {
            match jsonc::load_task_file(&child_path) {
                Ok(child) => collect_statuses(&child, &mut map),
                Err(err) => log::warn!(
                    "ignoring unreadable child file {}: {}",
                    child_path.display(),
                    err
                ),
            }
        }
    }

    log::debug!("reconciliation map holds {} status(es)", map.len());
    map
}

/// First file wins: an id already present in the map is never overwritten
fn collect_statuses(file: &TaskFile, map: &mut HashMap<String, TaskStatus>) {
    for task in &file.tasks {
        map.entry(task.id.clone()).or_insert(task.status);
    }
}

/// Resolve child file paths from `children` references and `includes`
/// globs, deduplicated, skipping anything that does not exist.
fn child_paths(root_path: &Path, root: &TaskFile) -> Vec<PathBuf> {
    let dir = root_path.parent().unwrap_or_else(|| Path::new("."));
    let mut paths = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for task in &root.tasks {
        if let Some(reference) = task.child_ref() {
            let path = dir.join(reference);
            if !path.exists() {
                log::warn!("prior output references missing file {}", path.display());
                continue;
            }
            if seen.insert(path.clone()) {
                paths.push(path);
            }
        }
    }

    for pattern in root.includes.iter().flatten() {
        let full = dir.join(pattern);
        let Ok(matches) = glob::glob(&full.to_string_lossy()) else {
            log::warn!("invalid include pattern '{pattern}' in prior output");
            continue;
        };
        for path in matches.flatten() {
            if path != root_path && seen.insert(path.clone()) {
                paths.push(path);
            }
        }
    }

    paths
}

/// Apply the status map to freshly parsed tasks. A mapped id takes the
/// stored status; unmapped tasks keep their checkbox-derived value.
pub fn apply_status_map(tasks: &mut [Task], map: &HashMap<String, TaskStatus>) {
    for task in tasks.iter_mut() {
        if let Some(&status) = map.get(&task.id) {
            if status != task.status {
                log::debug!("task {} keeps recorded status {}", task.id, status);
            }
            task.status = status;
        }
    }
}

/// Fold a set of child statuses into one aggregate.
///
/// Any in_progress child makes the set in_progress; a uniform set takes
/// its common value; a partially-done mixture is in_progress, never
/// pending or completed. An empty set is pending.
pub fn aggregate_status<I>(statuses: I) -> TaskStatus
where
    I: IntoIterator<Item = TaskStatus>,
{
    let mut any = false;
    let mut all_completed = true;
    let mut all_pending = true;

    for status in statuses {
        any = true;
        match status {
            TaskStatus::InProgress => return TaskStatus::InProgress,
            TaskStatus::Completed => all_pending = false,
            TaskStatus::Pending => all_completed = false,
        }
    }

    if !any || all_pending {
        TaskStatus::Pending
    } else if all_completed {
        TaskStatus::Completed
    } else {
        TaskStatus::InProgress
    }
}
