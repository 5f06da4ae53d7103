//! taskdown CLI entry point

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use taskdown::convert::{convert_change, ConvertRequest};
use taskdown::core::{read_task_graph, writer::ROOT_FILE};
use taskdown::discovery::{RootCache, CHANGES_DIR};

#[derive(Parser)]
#[command(name = "taskdown", version, about = "Markdown checklists to structured task files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a change's tasks.md into its structured task files
    Convert {
        /// Change name under the project's changes/ directory
        change: String,
        /// Project root (default: discovered from the current directory)
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Show the merged task list and status summary for a change
    Show {
        /// Change name under the project's changes/ directory
        change: String,
        /// Project root (default: discovered from the current directory)
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

fn change_dir(root: Option<PathBuf>, change: &str) -> Result<PathBuf> {
    let root = match root {
        Some(root) => root,
        None => {
            let cwd = std::env::current_dir()?;
            let mut cache = RootCache::new();
            cache.resolve(&cwd)?
        }
    };
    Ok(root.join(CHANGES_DIR).join(change))
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Convert { change, root } => {
            let dir = change_dir(root, &change)?;
            let outcome = convert_change(&ConvertRequest::new(&dir))?;
            let summary = &outcome.report.summary;
            println!(
                "Converted '{}' at {}: {} task(s) ({} completed, {} in progress, {} pending)",
                outcome.change,
                outcome.converted_at.format("%Y-%m-%d %H:%M:%S UTC"),
                summary.total,
                summary.completed,
                summary.in_progress,
                summary.pending
            );
            println!("  root: {}", outcome.report.root.display());
            for child in &outcome.report.children {
                println!("  child: {}", child.display());
            }
        }
        Command::Show { change, root } => {
            let dir = change_dir(root, &change)?;
            let graph = read_task_graph(&dir.join(ROOT_FILE))?;
            for task in &graph.tasks {
                println!("[{}] {} {}", task.status, task.id, task.description);
            }
            let s = &graph.summary;
            println!(
                "{} task(s): {} completed, {} in progress, {} pending",
                s.total, s.completed, s.in_progress, s.pending
            );
        }
    }

    Ok(())
}
