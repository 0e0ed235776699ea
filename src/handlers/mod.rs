pub mod add;
pub mod chart;
pub mod edit;
pub mod init;
pub mod list;
pub mod refresh;
pub mod rm;
pub mod seed;
pub mod show;
pub mod summary;

use anyhow::Result;
use colored::Colorize;
use gantt::config::Config;
use gantt::engine::db::Db;
use gantt::engine::store::TaskStore;
use gantt::engine::types::{Priority, Task};

/// Opens the configured database as a task store.
///
/// # Errors
/// Returns error if the database has not been initialized.
pub fn open_store(config: &Config) -> Result<TaskStore> {
    Ok(TaskStore::new(Db::connect(&config.db_path)?))
}

pub fn priority_label(priority: Priority) -> colored::ColoredString {
    match priority {
        Priority::Low => "low".dimmed(),
        Priority::Medium => "medium".normal(),
        Priority::High => "high".yellow(),
        Priority::Urgent => "urgent".red().bold(),
    }
}

pub fn progress_label(task: &Task) -> colored::ColoredString {
    let text = format!("{:>5.1}%", task.derived.overall_progress);
    if task.derived.is_delayed {
        text.red()
    } else if task.derived.overall_progress >= 100.0 {
        text.green()
    } else {
        text.normal()
    }
}

pub fn format_date(date: Option<chrono::NaiveDate>) -> String {
    date.map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string())
}
