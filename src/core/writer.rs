//! Hierarchical writer - persists grouped, reconciled tasks to disk
//!
//! Flat layout is a single `tasks.jsonc` (version 1). Hierarchical
//! layout is a version-2 root holding one reference task per split-off
//! section plus one `tasks.<key>.jsonc` child per section. Stale child
//! files from a previous layout are deleted before anything is written.

use crate::core::grouper::{GroupedTasks, SectionGroup};
use crate::core::model::{Task, TaskFile, TaskSummary, REF_PREFIX};
use crate::core::reconcile::aggregate_status;
use crate::error::ConvertError;
use crate::jsonc;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Root output file name within a change directory
pub const ROOT_FILE: &str = "tasks.jsonc";
/// Naming convention for child files; also the root `includes` glob
pub const CHILD_GLOB: &str = "tasks.*.jsonc";

/// Child file name for a section group key
pub fn child_file_name(key: &str) -> String {
    format!("tasks.{key}.jsonc")
}

/// What a conversion wrote, for caller display
#[derive(Debug, Clone)]
pub struct WriteReport {
    pub root: PathBuf,
    pub children: Vec<PathBuf>,
    pub hierarchical: bool,
    pub summary: TaskSummary,
}

/// Write the grouped task set into `change_dir`, replacing whatever
/// layout a previous run produced.
pub fn write_output(
    change_dir: &Path,
    change_name: &str,
    grouped: GroupedTasks,
) -> Result<WriteReport, ConvertError> {
    if !change_dir.is_dir() {
        return Err(ConvertError::SourceNotFound {
            path: change_dir.to_path_buf(),
        });
    }

    match grouped {
        GroupedTasks::Flat(tasks) => write_flat(change_dir, tasks),
        GroupedTasks::Hierarchical { groups, root_tasks } => {
            write_hierarchical(change_dir, change_name, groups, root_tasks)
        }
    }
}

fn write_flat(change_dir: &Path, tasks: Vec<Task>) -> Result<WriteReport, ConvertError> {
    // A previous hierarchical layout may have left children behind
    remove_stale_children(change_dir, &HashSet::new());

    let summary = TaskSummary::tally(&tasks);
    let root = change_dir.join(ROOT_FILE);
    jsonc::write_task_file(&root, &TaskFile::flat(tasks), None)?;
    log::info!("wrote flat task file {}", root.display());

    Ok(WriteReport {
        root,
        children: Vec::new(),
        hierarchical: false,
        summary,
    })
}

fn write_hierarchical(
    change_dir: &Path,
    change_name: &str,
    groups: Vec<SectionGroup>,
    root_tasks: Vec<Task>,
) -> Result<WriteReport, ConvertError> {
    let keep: HashSet<String> = groups.iter().map(|g| child_file_name(&g.key)).collect();
    remove_stale_children(change_dir, &keep);

    let mut reference_tasks = Vec::with_capacity(groups.len());
    let mut children = Vec::with_capacity(groups.len());

    for group in &groups {
        let reference = reference_task(group);
        let child_path = change_dir.join(child_file_name(&group.key));
        let child = TaskFile {
            version: 2,
            tasks: group.tasks.clone(),
            includes: None,
            parent: Some(reference.id.clone()),
        };
        let header = child_header(change_name, &reference.id, &group.section);
        jsonc::write_task_file(&child_path, &child, Some(&header))?;
        children.push(child_path);
        reference_tasks.push(reference);
    }

    let summary = TaskSummary::tally_statuses(
        groups
            .iter()
            .flat_map(|g| &g.tasks)
            .chain(&root_tasks)
            .map(|t| t.status),
    );

    let mut tasks = reference_tasks;
    tasks.extend(root_tasks);
    let root_file = TaskFile {
        version: 2,
        tasks,
        includes: Some(vec![CHILD_GLOB.to_string()]),
        parent: None,
    };
    let root = change_dir.join(ROOT_FILE);
    jsonc::write_task_file(&root, &root_file, None)?;
    log::info!(
        "wrote hierarchical layout: {} + {} child file(s)",
        root.display(),
        children.len()
    );

    Ok(WriteReport {
        root,
        children,
        hierarchical: true,
        summary,
    })
}

/// Synthesize the root-file reference task for a section group. Its id
/// is the section number the child ids are prefixed with, and its
/// status is the aggregate of the section's tasks.
fn reference_task(group: &SectionGroup) -> Task {
    let id = group
        .tasks
        .first()
        .and_then(|t| t.section_number())
        .unwrap_or(group.key.as_str())
        .to_string();

    let mut task = Task::new(id, group.section.clone(), group.section.clone());
    task.status = aggregate_status(group.tasks.iter().map(|t| t.status));
    task.children = Some(format!("{}{}", REF_PREFIX, child_file_name(&group.key)));
    task
}

/// Human-readable comment block prepended to each child file, outside
/// the structured payload.
fn child_header(change_name: &str, parent_id: &str, section: &str) -> String {
    format!(
        "// Generated by taskdown v{version} for change \"{change_name}\".\n\
         // Section: {section} (parent task {parent_id} in {ROOT_FILE})\n\
         //\n\
         // Status values: pending -> in_progress -> completed.\n\
         // Orchestrators update the \"status\" field in place as work\n\
         // progresses; recorded statuses survive re-conversion from the\n\
         // markdown source. Edit task text in tasks.md, not here.",
        version = env!("CARGO_PKG_VERSION"),
    )
}

/// Delete every child file matching the naming convention that is not
/// about to be regenerated, so sections removed from the markdown do
/// not linger as orphans.
fn remove_stale_children(change_dir: &Path, keep: &HashSet<String>) {
    let pattern = change_dir.join(CHILD_GLOB);
    let Ok(matches) = glob::glob(&pattern.to_string_lossy()) else {
        return;
    };
    for path in matches.flatten() {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if keep.contains(name) {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => log::info!("removed stale child file {}", path.display()),
            Err(err) => log::warn!("could not remove stale {}: {}", path.display(), err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::TaskStatus;
    use tempfile::TempDir;

    fn group_of(key: &str, section: &str, ids: &[&str]) -> SectionGroup {
        SectionGroup {
            key: key.to_string(),
            section: section.to_string(),
            tasks: ids
                .iter()
                .map(|id| Task::new(*id, section, format!("task {id}")))
                .collect(),
        }
    }

    #[test]
    fn test_flat_write_and_reload() {
        let dir = TempDir::new().unwrap();
        let tasks = vec![Task::new("1.1", "Setup", "Do X")];
        let report = write_output(dir.path(), "add-auth", GroupedTasks::Flat(tasks.clone())).unwrap();

        assert!(!report.hierarchical);
        let loaded = jsonc::load_task_file(&report.root).unwrap();
        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.tasks, tasks);
        assert!(loaded.includes.is_none());
    }

    #[test]
    fn test_hierarchical_write_shape() {
        let dir = TempDir::new().unwrap();
        let groups = vec![
            group_of("1", "Setup", &["1.1", "1.2"]),
            group_of("2", "Design", &["2.1"]),
        ];
        let grouped = GroupedTasks::Hierarchical {
            groups,
            root_tasks: vec![],
        };
        let report = write_output(dir.path(), "add-auth", grouped).unwrap();

        assert!(report.hierarchical);
        assert_eq!(report.children.len(), 2);

        let root = jsonc::load_task_file(&report.root).unwrap();
        assert_eq!(root.version, 2);
        assert_eq!(root.includes, Some(vec![CHILD_GLOB.to_string()]));
        assert_eq!(root.tasks.len(), 2);
        assert_eq!(root.tasks[0].children.as_deref(), Some("$ref:tasks.1.jsonc"));

        let child = jsonc::load_task_file(&dir.path().join("tasks.1.jsonc")).unwrap();
        assert_eq!(child.version, 2);
        assert_eq!(child.parent.as_deref(), Some("1"));
        assert_eq!(child.tasks.len(), 2);

        let raw = std::fs::read_to_string(dir.path().join("tasks.1.jsonc")).unwrap();
        assert!(raw.starts_with("// Generated by taskdown"));
        assert!(raw.contains("add-auth"));
        assert!(raw.contains("pending -> in_progress -> completed"));
    }

    #[test]
    fn test_reference_task_status_is_aggregate() {
        let dir = TempDir::new().unwrap();
        let mut group = group_of("1", "Setup", &["1.1", "1.2"]);
        group.tasks[0].status = TaskStatus::Completed;
        let grouped = GroupedTasks::Hierarchical {
            groups: vec![group],
            root_tasks: vec![],
        };
        let report = write_output(dir.path(), "c", grouped).unwrap();

        let root = jsonc::load_task_file(&report.root).unwrap();
        assert_eq!(root.tasks[0].status, TaskStatus::InProgress);
    }

    #[test]
    fn test_stale_children_removed() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("tasks.9.jsonc"), "{}").unwrap();
        std::fs::write(dir.path().join("tasks.old-cap.jsonc"), "{}").unwrap();

        let grouped = GroupedTasks::Hierarchical {
            groups: vec![group_of("1", "Setup", &["1.1"])],
            root_tasks: vec![],
        };
        write_output(dir.path(), "c", grouped).unwrap();

        assert!(!dir.path().join("tasks.9.jsonc").exists());
        assert!(!dir.path().join("tasks.old-cap.jsonc").exists());
        assert!(dir.path().join("tasks.1.jsonc").exists());
    }

    #[test]
    fn test_flat_write_cleans_previous_hierarchy() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("tasks.2.jsonc"), "{}").unwrap();

        write_output(dir.path(), "c", GroupedTasks::Flat(vec![Task::new("1.1", "S", "a")])).unwrap();
        assert!(!dir.path().join("tasks.2.jsonc").exists());
    }

    #[test]
    fn test_missing_change_dir_is_source_not_found() {
        let err = write_output(Path::new("/nonexistent/change"), "c", GroupedTasks::Flat(vec![]))
            .unwrap_err();
        assert!(matches!(err, ConvertError::SourceNotFound { .. }));
    }
}
