//! Handler for the `list` command.

use super::{open_store, priority_label, progress_label};
use anyhow::Result;
use colored::Colorize;
use gantt::config::Config;
use gantt::engine::wbs::WbsPath;

/// Lists tasks, indented by WBS depth.
///
/// # Errors
/// Returns error if database query fails.
pub fn handle(config: &Config, root: Option<&WbsPath>, json: bool) -> Result<()> {
    let store = open_store(config)?;
    let tasks = store.list(root.map(WbsPath::as_str), config.today())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
        return Ok(());
    }

    println!("{} Tasks:", "📋".cyan());
    if tasks.is_empty() {
        println!("   (No tasks defined)");
        return Ok(());
    }

    for task in tasks {
        let depth = WbsPath::parse(&task.wbs).map_or(0, |p| p.depth() - 1);
        let delayed = if task.derived.is_delayed {
            " DELAYED".red().bold().to_string()
        } else {
            String::new()
        };
        println!(
            "   {}[{}] {} {} ({}, {}d){}",
            "  ".repeat(depth),
            task.wbs.blue(),
            task.name,
            progress_label(&task),
            priority_label(task.priority),
            task.derived.duration,
            delayed
        );
    }
    Ok(())
}
