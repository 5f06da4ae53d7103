//! Section grouper - partitions parsed tasks and decides the file layout
//!
//! Two mutually exclusive split strategies, resolved once per run:
//! a size heuristic (split only when the list is big and spans several
//! sections) and a capability match (a section whose normalized name
//! matches a delta-spec subdirectory always gets its own child file).

use crate::core::model::Task;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Task count above which the size heuristic considers splitting
pub const SPLIT_THRESHOLD: usize = 20;

/// How the writer should partition tasks into files
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitStrategy {
    /// Split when the list is large and multi-section
    BySize,
    /// Split sections matching one of these capability names
    ByCapability(Vec<String>),
}

impl SplitStrategy {
    /// Resolve the strategy for a change directory: capability matching
    /// when delta-spec subdirectories exist, the size heuristic otherwise.
    pub fn resolve(change_dir: &Path) -> Self {
        let specs_dir = change_dir.join("specs");
        let mut capabilities = Vec::new();

        if let Ok(entries) = fs::read_dir(&specs_dir) {
            for entry in entries.flatten() {
                if entry.path().is_dir() {
                    if let Some(name) = entry.file_name().to_str() {
                        capabilities.push(name.to_string());
                    }
                }
            }
        }

        if capabilities.is_empty() {
            SplitStrategy::BySize
        } else {
            capabilities.sort();
            log::debug!("delta specs present, capability matching: {capabilities:?}");
            SplitStrategy::ByCapability(capabilities)
        }
    }
}

/// One section's worth of tasks destined for a child file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionGroup {
    /// Child-file key: the section number (size mode) or capability slug
    pub key: String,
    /// Section label, used for the reference task description
    pub section: String,
    pub tasks: Vec<Task>,
}

/// Layout decision plus the partitioned tasks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupedTasks {
    Flat(Vec<Task>),
    Hierarchical {
        /// Split-off sections, in source order
        groups: Vec<SectionGroup>,
        /// Tasks that stay in the root file alongside the reference tasks
        root_tasks: Vec<Task>,
    },
}

impl GroupedTasks {
    pub fn is_hierarchical(&self) -> bool {
        matches!(self, GroupedTasks::Hierarchical { .. })
    }
}

/// Normalize a section name to a lowercase-kebab capability slug:
/// strip any leading numeric/punctuation prefix, split on case, space
/// and underscore boundaries, and collapse repeated separators.
pub fn capability_slug(name: &str) -> String {
    let prefix_re = Regex::new(r"^[\d\s.\-_:)]+").unwrap();
    let stripped = prefix_re.replace(name, "");

    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_was_lower = false;
    for c in stripped.chars() {
        if c.is_alphanumeric() {
            if c.is_uppercase() && prev_was_lower && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            current.extend(c.to_lowercase());
            prev_was_lower = c.is_lowercase() || c.is_numeric();
        } else {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_was_lower = false;
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    words.join("-")
}

/// Partition tasks into per-section buckets, in order of first appearance.
/// The no-section bucket (ids without a dot) keeps the `None` key.
fn partition(tasks: Vec<Task>) -> Vec<(Option<String>, String, Vec<Task>)> {
    let mut buckets: Vec<(Option<String>, String, Vec<Task>)> = Vec::new();
    let mut index: HashMap<Option<String>, usize> = HashMap::new();

    for task in tasks {
        let key = task.section_number().map(str::to_string);
        match index.get(&key) {
            Some(&i) => buckets[i].2.push(task),
            None => {
                index.insert(key.clone(), buckets.len());
                let section = task.section.clone();
                buckets.push((key, section, vec![task]));
            }
        }
    }

    buckets
}

/// Group tasks and decide flat vs. hierarchical layout
pub fn group(tasks: Vec<Task>, strategy: &SplitStrategy) -> GroupedTasks {
    match strategy {
        SplitStrategy::BySize => group_by_size(tasks),
        SplitStrategy::ByCapability(capabilities) => group_by_capability(tasks, capabilities),
    }
}

fn group_by_size(tasks: Vec<Task>) -> GroupedTasks {
    let total = tasks.len();
    let buckets = partition(tasks);
    let numbered_sections = buckets.iter().filter(|(key, _, _)| key.is_some()).count();

    if total <= SPLIT_THRESHOLD || numbered_sections <= 1 {
        let flat = buckets.into_iter().flat_map(|(_, _, tasks)| tasks).collect();
        return GroupedTasks::Flat(flat);
    }

    let mut groups = Vec::new();
    let mut root_tasks = Vec::new();
    for (key, section, tasks) in buckets {
        match key {
            Some(num) => groups.push(SectionGroup {
                key: num,
                section,
                tasks,
            }),
            // No-section tasks stay in the root file
            None => root_tasks.extend(tasks),
        }
    }

    log::info!(
        "splitting {} task(s) into {} section file(s)",
        total,
        groups.len()
    );
    GroupedTasks::Hierarchical { groups, root_tasks }
}

fn group_by_capability(tasks: Vec<Task>, capabilities: &[String]) -> GroupedTasks {
    let buckets = partition(tasks);

    let mut groups = Vec::new();
    let mut root_tasks = Vec::new();
    for (key, section, tasks) in buckets {
        let slug = capability_slug(&section);
        if key.is_some() && !slug.is_empty() && capabilities.iter().any(|c| c == &slug) {
            log::debug!("section '{}' matched capability '{}'", section, slug);
            groups.push(SectionGroup {
                key: slug,
                section,
                tasks,
            });
        } else {
            root_tasks.extend(tasks);
        }
    }

    if groups.is_empty() {
        return GroupedTasks::Flat(root_tasks);
    }
    GroupedTasks::Hierarchical { groups, root_tasks }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, section: &str) -> Task {
        Task::new(id, section, format!("task {id}"))
    }

    fn numbered_tasks(sections: usize, per_section: usize) -> Vec<Task> {
        let mut tasks = Vec::new();
        for s in 1..=sections {
            for t in 1..=per_section {
                tasks.push(task(&format!("{s}.{t}"), &format!("Section {s}")));
            }
        }
        tasks
    }

    #[test]
    fn test_capability_slug() {
        assert_eq!(capability_slug("1. User Auth"), "user-auth");
        assert_eq!(capability_slug("2.3 TaskRunner"), "task-runner");
        assert_eq!(capability_slug("error_handling"), "error-handling");
        assert_eq!(capability_slug("Core  Engine"), "core-engine");
        assert_eq!(capability_slug("3) HTTPServer"), "httpserver");
        assert_eq!(capability_slug("12."), "");
    }

    #[test]
    fn test_small_list_stays_flat() {
        let grouped = group(numbered_tasks(3, 3), &SplitStrategy::BySize);
        assert!(matches!(grouped, GroupedTasks::Flat(ref t) if t.len() == 9));
    }

    #[test]
    fn test_single_section_stays_flat_even_when_large() {
        let grouped = group(numbered_tasks(1, 30), &SplitStrategy::BySize);
        assert!(matches!(grouped, GroupedTasks::Flat(ref t) if t.len() == 30));
    }

    #[test]
    fn test_large_multi_section_splits() {
        let grouped = group(numbered_tasks(3, 8), &SplitStrategy::BySize);
        match grouped {
            GroupedTasks::Hierarchical { groups, root_tasks } => {
                assert_eq!(groups.len(), 3);
                assert!(root_tasks.is_empty());
                assert_eq!(groups[0].key, "1");
                assert_eq!(groups[0].tasks.len(), 8);
            }
            GroupedTasks::Flat(_) => panic!("expected hierarchical layout"),
        }
    }

    #[test]
    fn test_threshold_is_exclusive() {
        // Exactly 20 tasks across two sections: still flat
        let grouped = group(numbered_tasks(2, 10), &SplitStrategy::BySize);
        assert!(matches!(grouped, GroupedTasks::Flat(_)));
    }

    #[test]
    fn test_no_section_tasks_stay_in_root_on_split() {
        let mut tasks = vec![task("1", ""), task("2", "")];
        tasks.extend(numbered_tasks(2, 11));
        let grouped = group(tasks, &SplitStrategy::BySize);
        match grouped {
            GroupedTasks::Hierarchical { groups, root_tasks } => {
                assert_eq!(groups.len(), 2);
                assert_eq!(root_tasks.len(), 2);
                assert_eq!(root_tasks[0].id, "1");
            }
            GroupedTasks::Flat(_) => panic!("expected hierarchical layout"),
        }
    }

    #[test]
    fn test_capability_match_ignores_threshold() {
        let strategy = SplitStrategy::ByCapability(vec!["user-auth".to_string()]);
        let tasks = vec![
            task("1.1", "User Auth"),
            task("1.2", "User Auth"),
            task("2.1", "Misc"),
        ];
        match group(tasks, &strategy) {
            GroupedTasks::Hierarchical { groups, root_tasks } => {
                assert_eq!(groups.len(), 1);
                assert_eq!(groups[0].key, "user-auth");
                assert_eq!(groups[0].tasks.len(), 2);
                assert_eq!(root_tasks.len(), 1);
            }
            GroupedTasks::Flat(_) => panic!("expected hierarchical layout"),
        }
    }

    #[test]
    fn test_capability_mode_with_no_matches_is_flat() {
        let strategy = SplitStrategy::ByCapability(vec!["payments".to_string()]);
        let grouped = group(numbered_tasks(3, 10), &strategy);
        assert!(matches!(grouped, GroupedTasks::Flat(ref t) if t.len() == 30));
    }

    #[test]
    fn test_order_preserved_within_groups() {
        let grouped = group(numbered_tasks(2, 11), &SplitStrategy::BySize);
        if let GroupedTasks::Hierarchical { groups, .. } = grouped {
            let ids: Vec<&str> = groups[1].tasks.iter().map(|t| t.id.as_str()).collect();
            assert_eq!(ids[0], "2.1");
            assert_eq!(ids[10], "2.11");
        } else {
            panic!("expected hierarchical layout");
        }
    }
}
