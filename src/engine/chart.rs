//! Chart data: the rows a Gantt renderer draws as bars.

use super::types::{Priority, Task};
use serde::Serialize;
use tracing::warn;

/// One renderable bar. Dates are ISO 8601 (`YYYY-MM-DD`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GanttBar {
    pub id: i64,
    pub name: String,
    pub wbs: String,
    pub start: String,
    pub end: String,
    pub progress: f64,
    pub dependencies: Vec<String>,
    pub priority: Priority,
    pub custom_class: String,
    pub color: String,
    pub duration: i64,
    pub is_delayed: bool,
}

impl GanttBar {
    /// Builds a bar, or `None` if the task lacks a name or either date.
    #[must_use]
    pub fn from_task(task: &Task) -> Option<Self> {
        if task.name.trim().is_empty() {
            return None;
        }
        let (start, end) = (task.start_date?, task.end_date?);

        Some(Self {
            id: task.id,
            name: task.name.clone(),
            wbs: task.wbs.clone(),
            start: start.format("%Y-%m-%d").to_string(),
            end: end.format("%Y-%m-%d").to_string(),
            progress: task.progress,
            dependencies: task.dependencies.clone(),
            priority: task.priority,
            custom_class: format!("priority-{}", task.priority),
            color: task.color.clone(),
            duration: task.derived.duration,
            is_delayed: task.derived.is_delayed,
        })
    }
}

/// Converts tasks to bars, skipping incomplete records entirely.
///
/// Expects derived fields to be fresh (see `TaskStore::list`).
#[must_use]
pub fn gantt_bars(tasks: &[Task]) -> Vec<GanttBar> {
    tasks
        .iter()
        .filter_map(|t| {
            let bar = GanttBar::from_task(t);
            if bar.is_none() {
                warn!(id = t.id, wbs = %t.wbs, "skipping task with missing name or dates");
            }
            bar
        })
        .collect()
}
