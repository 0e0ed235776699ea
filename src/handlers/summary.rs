//! Handler for the `summary` command.

use super::{format_date, open_store};
use anyhow::Result;
use colored::Colorize;
use gantt::config::Config;
use gantt::engine::summary::{ProjectSummary, TaskRef};
use gantt::engine::wbs::WbsPath;

/// Displays statistics for one project.
///
/// # Errors
/// Returns error if database query fails.
pub fn handle(config: &Config, root: &WbsPath, json: bool) -> Result<()> {
    let store = open_store(config)?;
    let tasks = store.list(Some(root.as_str()), config.today())?;
    let summary = ProjectSummary::build(root, &tasks)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    print_human(&summary);
    Ok(())
}

fn print_human(s: &ProjectSummary) {
    println!("{} {}", "📊".cyan(), s.project_name.bold());
    if let Some(overall) = s.overall_progress {
        println!("   Overall:     {overall:.1}%");
    }
    println!(
        "   Timeline:    {} → {} ({} days)",
        format_date(s.start_date),
        format_date(s.end_date),
        s.duration
    );
    println!(
        "   Tasks:       {} total, {} done, {} in progress, {} delayed",
        s.counts.total,
        s.counts.completed.to_string().green(),
        s.counts.in_progress.to_string().yellow(),
        s.counts.delayed.to_string().red()
    );

    print_group("Delayed", &s.delayed);
    print_group("Critical", &s.critical);
    println!("\n   Next task path: {}", s.next_wbs.to_string().dimmed());
}

fn print_group(title: &str, tasks: &[TaskRef]) {
    if tasks.is_empty() {
        return;
    }
    println!("\n   {title}:");
    for t in tasks {
        println!("     - [{}] {} ({:.0}%)", t.wbs.yellow(), t.name, t.progress);
    }
}
