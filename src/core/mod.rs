//! Core engine - parsing, grouping, status reconciliation, file IO

pub mod grouper;
pub mod model;
pub mod parser;
pub mod reader;
pub mod reconcile;
pub mod writer;

pub use grouper::{GroupedTasks, SectionGroup, SplitStrategy};
pub use model::{Task, TaskFile, TaskStatus, TaskSummary};
pub use reader::{read_task_graph, TaskGraph};
pub use writer::WriteReport;
