//! Handler for the `add` command.

use super::open_store;
use anyhow::Result;
use chrono::NaiveDate;
use colored::Colorize;
use gantt::config::Config;
use gantt::engine::types::{parse_dependencies, Priority, TaskDraft};

pub struct AddArgs {
    pub wbs: String,
    pub name: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub progress: f64,
    pub priority: Priority,
    pub deps: Option<String>,
    pub desc: Option<String>,
    pub color: String,
}

/// Handles adding a new task.
///
/// # Errors
/// Returns error if validation fails, the path exists, or the database is locked.
pub fn handle(config: &Config, args: AddArgs) -> Result<()> {
    let mut store = open_store(config)?;
    let today = config.today();

    let draft = TaskDraft {
        wbs: args.wbs,
        name: args.name,
        start_date: args.start,
        end_date: args.end,
        progress: args.progress,
        dependencies: args.deps.as_deref().map(parse_dependencies).unwrap_or_default(),
        priority: args.priority,
        description: args.desc,
        color: args.color,
    };

    let task = store.create(&draft, today)?;
    println!(
        "{} Added task #{} [{}] {}",
        "✓".green(),
        task.id,
        task.wbs.yellow(),
        task.name
    );

    if !task.is_root() {
        let root = gantt::engine::wbs::root_of(&task.wbs);
        if let Ok(root_task) = store.resolve(root, today) {
            println!(
                "   {} [{}] overall progress now {:.1}%",
                "↑".cyan(),
                root_task.wbs,
                root_task.derived.overall_progress
            );
        }
    }
    Ok(())
}
