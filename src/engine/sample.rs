//! Demo data: two small projects for trying out the chart.

use super::store::TaskStore;
use super::types::{Priority, Task, TaskDraft};
use anyhow::{Context, Result};
use chrono::NaiveDate;

struct Seed {
    wbs: &'static str,
    name: &'static str,
    start: (i32, u32, u32),
    end: (i32, u32, u32),
    progress: f64,
    priority: Priority,
    deps: &'static str,
}

const SEEDS: &[Seed] = &[
    Seed { wbs: "1", name: "Project Planning", start: (2024, 1, 1), end: (2024, 1, 5), progress: 100.0, priority: Priority::High, deps: "" },
    Seed { wbs: "1.1", name: "Design Phase", start: (2024, 1, 6), end: (2024, 1, 15), progress: 75.0, priority: Priority::Medium, deps: "1" },
    Seed { wbs: "1.2", name: "Development", start: (2024, 1, 16), end: (2024, 1, 30), progress: 50.0, priority: Priority::High, deps: "2" },
    Seed { wbs: "1.3", name: "Testing", start: (2024, 1, 25), end: (2024, 2, 5), progress: 25.0, priority: Priority::Medium, deps: "3" },
    Seed { wbs: "1.4", name: "Deployment", start: (2024, 2, 6), end: (2024, 2, 10), progress: 0.0, priority: Priority::Urgent, deps: "4" },
    Seed { wbs: "2", name: "Project Alpha Planning", start: (2024, 2, 1), end: (2024, 2, 5), progress: 80.0, priority: Priority::High, deps: "" },
    Seed { wbs: "2.1", name: "Alpha Analysis", start: (2024, 2, 6), end: (2024, 2, 15), progress: 60.0, priority: Priority::Medium, deps: "6" },
];

fn date((y, m, d): (i32, u32, u32)) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d).with_context(|| format!("invalid seed date {y}-{m}-{d}"))
}

/// The sample tasks as drafts, in insertion order.
///
/// # Errors
/// Returns an error if a seed date is invalid.
pub fn sample_drafts() -> Result<Vec<TaskDraft>> {
    SEEDS
        .iter()
        .map(|s| -> Result<TaskDraft> {
            Ok(TaskDraft::new(s.wbs, s.name)
                .dates(date(s.start)?, date(s.end)?)
                .progress(s.progress)
                .priority(s.priority)
                .depends_on(s.deps))
        })
        .collect()
}

/// Inserts the sample tasks through the store so aggregates are computed.
///
/// # Errors
/// Returns an error if any sample path already exists.
pub fn seed(store: &mut TaskStore, today: NaiveDate) -> Result<Vec<Task>> {
    let mut created = Vec::new();
    for draft in sample_drafts()? {
        created.push(store.create(&draft, today)?);
    }
    Ok(created)
}
