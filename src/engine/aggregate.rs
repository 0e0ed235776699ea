//! Aggregation Engine: derived fields computed bottom-up from stored values.
//!
//! This module never writes. It reads one task plus whatever the injected
//! `TaskView` returns and hands the derived values back to the caller.
//!
//! The aggregation is two-level and flat: a root averages the progress of
//! every task under `root.`, at any depth, so `"1.1"` and `"1.1.1"` count as
//! peers. Non-root tasks report their own progress.

use super::types::{DerivedFields, Task};
use super::wbs;
use anyhow::Result;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use tracing::debug;

/// Read-only access to tasks by WBS prefix.
pub trait TaskView {
    /// All tasks whose wbs starts with `prefix`, in a stable order.
    ///
    /// # Errors
    /// Returns an error if the underlying store cannot be read.
    fn with_prefix(&self, prefix: &str) -> Result<Vec<Task>>;
}

impl TaskView for [Task] {
    fn with_prefix(&self, prefix: &str) -> Result<Vec<Task>> {
        Ok(self
            .iter()
            .filter(|t| t.wbs.starts_with(prefix))
            .cloned()
            .collect())
    }
}

impl TaskView for Vec<Task> {
    fn with_prefix(&self, prefix: &str) -> Result<Vec<Task>> {
        self.as_slice().with_prefix(prefix)
    }
}

/// Inclusive day count, or 0 if either date is absent. Never negative.
#[must_use]
pub fn duration(start: Option<NaiveDate>, end: Option<NaiveDate>) -> i64 {
    match (start, end) {
        (Some(start), Some(end)) => ((end - start).num_days() + 1).max(0),
        _ => 0,
    }
}

/// Past its end date and not finished.
#[must_use]
pub fn is_delayed(end: Option<NaiveDate>, progress: f64, today: NaiveDate) -> bool {
    end.is_some_and(|end| end < today) && progress < 100.0
}

/// Mean progress of a root's descendants, or the task's own progress.
///
/// # Errors
/// Returns an error only if the view cannot be read.
pub fn overall_progress<V: TaskView + ?Sized>(task: &Task, view: &V) -> Result<f64> {
    if !wbs::is_root(&task.wbs) {
        return Ok(task.progress);
    }

    let descendants = view.with_prefix(&wbs::descendant_prefix(&task.wbs))?;
    if descendants.is_empty() {
        return Ok(task.progress);
    }

    let total: f64 = descendants.iter().map(|t| t.progress).sum();
    #[allow(clippy::cast_precision_loss)]
    let mean = total / descendants.len() as f64;
    debug!(wbs = %task.wbs, children = descendants.len(), mean, "aggregated root progress");
    Ok(mean)
}

/// Computes every derived field for one task.
///
/// Pure given its inputs: calling it twice over unchanged data returns
/// identical values.
///
/// # Errors
/// Returns an error only if the view cannot be read.
pub fn recompute_aggregates<V: TaskView + ?Sized>(
    task: &Task,
    view: &V,
    today: NaiveDate,
) -> Result<DerivedFields> {
    Ok(DerivedFields {
        duration: duration(task.start_date, task.end_date),
        is_delayed: is_delayed(task.end_date, task.progress, today),
        overall_progress: overall_progress(task, view)?,
    })
}

/// Roots whose overall progress may change when `task` changes.
///
/// A root changing affects no other root; callers still recompute the
/// changed task itself.
#[must_use]
pub fn affected_roots(task: &Task) -> BTreeSet<String> {
    affected_roots_of_path(&task.wbs)
}

#[must_use]
pub fn affected_roots_of_path(path: &str) -> BTreeSet<String> {
    // The furthest ancestor is the root; roots themselves have none.
    wbs::ancestors(path)
        .last()
        .map(|root| (*root).to_string())
        .into_iter()
        .collect()
}

/// Union of `affected_roots` over a batch, each root listed once.
#[must_use]
pub fn affected_roots_for<'a, I>(tasks: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks.into_iter().flat_map(affected_roots).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::Priority;
    use chrono::Duration;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn make_task(id: i64, wbs: &str, progress: f64) -> Task {
        Task {
            id,
            wbs: wbs.to_string(),
            name: format!("Task {wbs}"),
            start_date: Some(d("2024-01-01")),
            end_date: Some(d("2024-01-10")),
            progress,
            dependencies: Vec::new(),
            priority: Priority::Medium,
            description: None,
            color: "#3498db".to_string(),
            created_at: "2024-01-01".to_string(),
            derived: DerivedFields::default(),
        }
    }

    #[test]
    fn test_duration_inclusive() {
        assert_eq!(duration(Some(d("2024-01-01")), Some(d("2024-01-05"))), 5);
        assert_eq!(duration(Some(d("2024-01-01")), Some(d("2024-01-01"))), 1);
        assert_eq!(duration(Some(d("2024-02-28")), Some(d("2024-03-01"))), 3);
        assert_eq!(duration(None, Some(d("2024-01-01"))), 0);
        assert_eq!(duration(Some(d("2024-01-01")), None), 0);
        assert_eq!(duration(Some(d("2024-01-05")), Some(d("2024-01-01"))), 0);
    }

    #[test]
    fn test_delay_semantics() {
        let today = d("2024-06-15");
        let yesterday = Some(today - Duration::days(1));
        let tomorrow = Some(today + Duration::days(1));

        assert!(is_delayed(yesterday, 99.0, today));
        assert!(!is_delayed(yesterday, 100.0, today));
        assert!(!is_delayed(tomorrow, 0.0, today));
        assert!(!is_delayed(tomorrow, 100.0, today));
        assert!(!is_delayed(Some(today), 10.0, today));
        assert!(!is_delayed(None, 0.0, today));
    }

    #[test]
    fn test_root_averages_children() {
        let tasks = vec![
            make_task(1, "1", 0.0),
            make_task(2, "1.1", 40.0),
            make_task(3, "1.2", 60.0),
        ];
        assert_eq!(overall_progress(&tasks[0], &tasks).unwrap(), 50.0);
    }

    #[test]
    fn test_root_without_children_uses_own_progress() {
        let tasks = vec![make_task(1, "1", 30.0), make_task(2, "12", 90.0)];
        assert_eq!(overall_progress(&tasks[0], &tasks).unwrap(), 30.0);
    }

    #[test]
    fn test_non_root_uses_own_progress() {
        let tasks = vec![make_task(2, "1.1", 40.0), make_task(3, "1.1.1", 100.0)];
        assert_eq!(overall_progress(&tasks[0], &tasks).unwrap(), 40.0);
    }

    #[test]
    fn test_flat_aggregation_counts_all_depths() {
        let tasks = vec![
            make_task(1, "1", 0.0),
            make_task(2, "1.1", 30.0),
            make_task(3, "1.1.1", 90.0),
            make_task(4, "2.1", 0.0),
        ];
        assert_eq!(overall_progress(&tasks[0], &tasks).unwrap(), 60.0);
    }

    #[test]
    fn test_recompute_idempotent() {
        let tasks = vec![
            make_task(1, "1", 0.0),
            make_task(2, "1.1", 33.3),
            make_task(3, "1.2", 66.7),
            make_task(4, "1.3", 12.5),
        ];
        let today = d("2024-01-20");
        let first = recompute_aggregates(&tasks[0], &tasks, today).unwrap();
        let second = recompute_aggregates(&tasks[0], &tasks, today).unwrap();
        assert_eq!(
            first.overall_progress.to_bits(),
            second.overall_progress.to_bits()
        );
        assert_eq!(first, second);
        assert_eq!(first.duration, 10);
        assert!(first.is_delayed);
    }

    #[test]
    fn test_affected_roots() {
        assert!(affected_roots(&make_task(1, "1", 0.0)).is_empty());
        assert_eq!(
            affected_roots(&make_task(2, "1.2.3", 0.0)),
            BTreeSet::from(["1".to_string()])
        );

        let batch = vec![
            make_task(2, "1.1", 0.0),
            make_task(3, "1.2", 0.0),
            make_task(4, "2.1", 0.0),
            make_task(5, "3", 0.0),
        ];
        assert_eq!(
            affected_roots_for(&batch),
            BTreeSet::from(["1".to_string(), "2".to_string()])
        );
    }
}
