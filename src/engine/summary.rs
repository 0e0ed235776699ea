//! Project summary: statistics for one root and everything under it.

use super::aggregate::duration;
use super::types::Task;
use super::wbs::{self, WbsPath};
use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

/// Aggregate counts of tasks in a project.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct TaskCounts {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub delayed: usize,
}

/// Compact task reference used in summary listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskRef {
    pub id: i64,
    pub wbs: String,
    pub name: String,
    pub progress: f64,
}

impl From<&Task> for TaskRef {
    fn from(t: &Task) -> Self {
        Self {
            id: t.id,
            wbs: t.wbs.clone(),
            name: t.name.clone(),
            progress: t.progress,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub wbs_root: WbsPath,
    pub project_name: String,
    pub counts: TaskCounts,
    /// Overall progress of the root task, if it exists.
    pub overall_progress: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub duration: i64,
    pub completed: Vec<TaskRef>,
    pub delayed: Vec<TaskRef>,
    pub critical: Vec<TaskRef>,
    /// Suggested path for the next direct child.
    pub next_wbs: WbsPath,
}

impl ProjectSummary {
    /// Summarises `tasks` (the root and its descendants, derived fields
    /// fresh). Tasks outside the root's scope are ignored.
    ///
    /// # Errors
    /// Returns an error if the next child path cannot be formed.
    pub fn build(root: &WbsPath, tasks: &[Task]) -> Result<Self> {
        let scoped: Vec<&Task> = tasks
            .iter()
            .filter(|t| {
                WbsPath::parse(&t.wbs).is_ok_and(|p| p == *root || p.is_descendant_of(root))
            })
            .collect();

        let mut counts = TaskCounts {
            total: scoped.len(),
            ..TaskCounts::default()
        };
        let mut completed = Vec::new();
        let mut delayed = Vec::new();
        let mut critical = Vec::new();

        for task in &scoped {
            if task.is_complete() {
                counts.completed += 1;
                completed.push(TaskRef::from(*task));
            } else if task.is_in_progress() {
                counts.in_progress += 1;
            }
            if task.derived.is_delayed {
                counts.delayed += 1;
                delayed.push(TaskRef::from(*task));
            }
            if task.priority.is_critical() {
                critical.push(TaskRef::from(*task));
            }
        }

        let start_date = scoped.iter().filter_map(|t| t.start_date).min();
        let end_date = scoped.iter().filter_map(|t| t.end_date).max();
        let overall_progress = scoped
            .iter()
            .find(|t| t.wbs == root.as_str())
            .map(|t| t.derived.overall_progress);

        Ok(Self {
            wbs_root: root.clone(),
            project_name: format!("Project {root}"),
            counts,
            overall_progress,
            start_date,
            end_date,
            duration: duration(start_date, end_date),
            completed,
            delayed,
            critical,
            next_wbs: next_child(root, &scoped)?,
        })
    }
}

/// One past the highest numeric direct child segment, starting at 1.
///
/// Segments are read as `u64`; the successor is formed in `u128` so the
/// largest segment still has one.
fn next_child(root: &WbsPath, tasks: &[&Task]) -> Result<WbsPath> {
    let highest = tasks
        .iter()
        .filter_map(|t| WbsPath::parse(&t.wbs).ok())
        .filter(|p| p.parent().as_ref() == Some(root))
        .filter_map(|p| p.as_str().rsplit(wbs::SEPARATOR).next()?.parse::<u64>().ok())
        .max()
        .map_or(0, u128::from);
    Ok(root.child(&(highest + 1).to_string())?)
}
