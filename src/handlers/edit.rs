//! Handler for the `edit` command.

use super::open_store;
use anyhow::{bail, Result};
use chrono::NaiveDate;
use colored::Colorize;
use gantt::config::Config;
use gantt::engine::types::{parse_dependencies, Priority, TaskPatch};

pub struct EditArgs {
    pub wbs: Option<String>,
    pub name: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub progress: Option<f64>,
    pub priority: Option<Priority>,
    pub deps: Option<String>,
    pub desc: Option<String>,
    pub color: Option<String>,
}

/// Applies field changes to one task.
///
/// # Errors
/// Returns error if the task is unknown or the merged record is invalid.
pub fn handle(config: &Config, task_ref: &str, args: EditArgs) -> Result<()> {
    let mut store = open_store(config)?;
    let today = config.today();
    let target = store.resolve(task_ref, today)?;

    let patch = TaskPatch {
        wbs: args.wbs,
        name: args.name,
        start_date: args.start,
        end_date: args.end,
        progress: args.progress,
        dependencies: args.deps.as_deref().map(parse_dependencies),
        priority: args.priority,
        description: args.desc,
        color: args.color,
    };
    if patch == TaskPatch::default() {
        bail!("Nothing to change. Pass at least one field, e.g. --progress 50");
    }

    let task = store.update(target.id, &patch, today)?;
    println!(
        "{} Updated task #{} [{}] {} ({:.1}%)",
        "✓".green(),
        task.id,
        task.wbs.yellow(),
        task.name,
        task.progress
    );
    Ok(())
}
