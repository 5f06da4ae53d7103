//! Markdown task parser - checklist dialect to ordered task records
//!
//! Recognized input, one construct per line:
//! ```markdown
//! ## 1. Setup              <- numbered section header
//! ## Cleanup               <- unnumbered header, number auto-assigned
//! - [ ] 1.1 Create repo    <- pending task with literal id
//! - [x] Remove old dir     <- completed task, id generated
//! ```
//!
//! Ids are normalized, not trusted: within a section the Nth checklist
//! line always becomes `{section}.{N}`, whatever literal the author
//! wrote. Tasks that appear before any header get plain sequential ids.

use crate::core::model::{Task, TaskStatus};
use crate::error::ConvertError;
use regex::Regex;
use std::path::Path;

/// Accumulator threaded through the line fold. Tracks the section and
/// sequence counters that drive id generation.
#[derive(Debug, Clone, Default)]
struct ParseState {
    /// Last explicitly numbered section seen; auto-numbering continues from it
    last_section_num: u32,
    /// Current section number, None before the first header
    section_num: Option<u32>,
    /// Current section label (without the number prefix)
    section_name: String,
    /// 1-based task counter within the current section
    task_seq: u32,
    /// 1-based task counter across the whole file
    global_seq: u32,
    tasks: Vec<Task>,
}

impl ParseState {
    fn enter_section(mut self, literal_num: Option<u32>, name: &str) -> Self {
        let num = literal_num.unwrap_or(self.last_section_num + 1);
        self.last_section_num = num;
        self.section_num = Some(num);
        self.section_name = name.trim().to_string();
        self.task_seq = 0;
        self
    }

    fn add_task(mut self, description: &str, status: TaskStatus) -> Self {
        self.global_seq += 1;
        let id = match self.section_num {
            Some(num) => {
                self.task_seq += 1;
                format!("{}.{}", num, self.task_seq)
            }
            // Before any header: sequential global ids with no dot
            None => self.global_seq.to_string(),
        };

        let mut task = Task::new(id, self.section_name.clone(), description.trim());
        task.status = status;
        self.tasks.push(task);
        self
    }
}

/// Parse markdown source into ordered tasks.
///
/// A whitespace-only source is an intentionally empty list. A non-blank
/// source in which no line matches the checklist grammar is a format
/// mismatch, so the caller can tell "nothing to convert" apart from
/// "this is not a task list".
pub fn parse(source: &str, path: &Path) -> Result<Vec<Task>, ConvertError> {
    let tasks = parse_lines(source);
    if tasks.is_empty() && !source.trim().is_empty() {
        return Err(ConvertError::FormatMismatch {
            path: path.to_path_buf(),
        });
    }
    log::debug!("parsed {} task(s) from {}", tasks.len(), path.display());
    Ok(tasks)
}

/// The pure fold: no filesystem, no error cases
pub fn parse_lines(source: &str) -> Vec<Task> {
    let header_re = Regex::new(r"^#{1,6}\s+(.+)$").unwrap();
    let checklist_re = Regex::new(r"^\s*-\s*\[([ xX])\]\s+(.+)$").unwrap();
    let numbered_re = Regex::new(r"^(\d+)\.\s*(.*)$").unwrap();
    // Leading id token on a checklist line: "1.2 ", "1. ", or "1 "
    let literal_id_re = Regex::new(r"^\d+(?:\.\d+)?\.?\s+(.+)$").unwrap();

    let state = source.lines().fold(ParseState::default(), |state, line| {
        if let Some(caps) = header_re.captures(line) {
            let content = caps[1].trim();
            return match numbered_re.captures(content) {
                Some(num_caps) => {
                    let num = num_caps[1].parse::<u32>().ok();
                    state.enter_section(num, &num_caps[2])
                }
                None => state.enter_section(None, content),
            };
        }

        if let Some(caps) = checklist_re.captures(line) {
            let status = match &caps[1] {
                " " => TaskStatus::Pending,
                _ => TaskStatus::Completed,
            };
            // Drop any literal id; generated ids are authoritative
            let body = caps[2].trim();
            let description = literal_id_re
                .captures(body)
                .map(|id_caps| id_caps[1].to_string())
                .unwrap_or_else(|| body.to_string());
            return state.add_task(&description, status);
        }

        state
    });

    state.tasks
}
