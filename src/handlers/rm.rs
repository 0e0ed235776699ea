//! Handler for the `rm` command.

use super::open_store;
use anyhow::Result;
use colored::Colorize;
use gantt::config::Config;

/// Deletes a task. Its root's overall progress is recomputed.
///
/// # Errors
/// Returns error if the task is unknown.
pub fn handle(config: &Config, task_ref: &str) -> Result<()> {
    let mut store = open_store(config)?;
    let today = config.today();
    let target = store.resolve(task_ref, today)?;
    let task = store.delete(target.id, today)?;
    println!(
        "{} Deleted task #{} [{}] {}",
        "✗".red(),
        task.id,
        task.wbs.yellow(),
        task.name
    );
    Ok(())
}
