//! Handler for the `show` command.

use super::{format_date, open_store, priority_label};
use anyhow::Result;
use colored::Colorize;
use gantt::config::Config;

/// Prints one task with its derived fields evaluated for today.
///
/// # Errors
/// Returns error if the task cannot be resolved.
pub fn handle(config: &Config, task_ref: &str, json: bool) -> Result<()> {
    let store = open_store(config)?;
    let task = store.resolve(task_ref, config.today())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&task)?);
        return Ok(());
    }

    println!("#{} [{}] {}", task.id, task.wbs.cyan().bold(), task.name);
    println!(
        "   Dates:     {} → {} ({} days)",
        format_date(task.start_date),
        format_date(task.end_date),
        task.derived.duration
    );
    println!("   Progress:  {:.1}%", task.progress);
    if task.is_root() {
        println!("   Overall:   {:.1}%", task.derived.overall_progress);
    }
    println!("   Priority:  {}", priority_label(task.priority));
    println!("   Colour:    {}", task.color);
    if task.derived.is_delayed {
        println!("   Status:    {}", "DELAYED".red().bold());
    }
    if !task.dependencies.is_empty() {
        println!("   Depends:   {}", task.dependencies.join(", "));
    }
    if let Some(desc) = &task.description {
        println!();
        println!("   {}", desc.dimmed());
    }
    Ok(())
}
