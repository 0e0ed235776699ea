//! Task Store: the explicit mutate-then-recompute protocol.
//!
//! Every mutation runs in one transaction: validate the candidate, write the
//! raw fields, recompute the task itself and each affected root through the
//! engine, persist the derived values, commit. Validation failures abort
//! only the record they belong to.

use super::aggregate::{
    affected_roots, affected_roots_for, affected_roots_of_path, recompute_aggregates,
};
use super::error::EngineError;
use super::repo::TaskRepo;
use super::types::{DerivedFields, Task, TaskDraft, TaskPatch};
use super::validate::validate_candidate;
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Outcome of `TaskStore::apply_batch`.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub applied: Vec<Task>,
    pub rejected: Vec<(i64, EngineError)>,
    /// Roots recomputed after the batch, each exactly once.
    pub recomputed_roots: Vec<String>,
}

pub struct TaskStore {
    conn: Connection,
}

impl TaskStore {
    #[must_use]
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Returns the underlying database connection.
    #[must_use]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Validates and inserts a task, then refreshes the aggregates it affects.
    ///
    /// # Errors
    /// Returns an `EngineError` (inside `anyhow`) when validation fails, or a
    /// database error.
    pub fn create(&mut self, draft: &TaskDraft, today: NaiveDate) -> Result<Task> {
        validate_candidate(&draft_candidate(draft))?;

        let tx = self.conn.transaction()?;
        let repo = TaskRepo::new(&tx);
        let task = repo.create(draft)?;
        recompute_one(&repo, &task, today)?;
        recompute_roots(&repo, &affected_roots(&task), today)?;
        let task = repo.require(task.id)?;
        tx.commit()?;

        info!(id = task.id, wbs = %task.wbs, "created task");
        Ok(task)
    }

    /// Merges a patch into a stored task and refreshes the aggregates of
    /// both its old and new position.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown id, a validation `EngineError` for an
    /// invalid merged record, or a database error.
    pub fn update(&mut self, id: i64, patch: &TaskPatch, today: NaiveDate) -> Result<Task> {
        let tx = self.conn.transaction()?;
        let repo = TaskRepo::new(&tx);

        let before = repo.require(id)?;
        let mut candidate = before.clone();
        candidate.apply(patch);
        validate_candidate(&candidate)?;

        let task = repo.update(&candidate)?;
        recompute_one(&repo, &task, today)?;

        let mut roots = affected_roots(&task);
        if patch.touches_aggregates() {
            roots.extend(affected_roots_of_path(&before.wbs));
        }
        // Already recomputed above.
        roots.remove(&task.wbs);
        recompute_roots(&repo, &roots, today)?;

        let task = repo.require(id)?;
        tx.commit()?;

        info!(id, wbs = %task.wbs, "updated task");
        Ok(task)
    }

    /// Deletes a task and refreshes the root it belonged to.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown id, or a database error.
    pub fn delete(&mut self, id: i64, today: NaiveDate) -> Result<Task> {
        let tx = self.conn.transaction()?;
        let repo = TaskRepo::new(&tx);

        let task = repo.require(id)?;
        repo.delete(id)?;
        recompute_roots(&repo, &affected_roots(&task), today)?;
        tx.commit()?;

        info!(id, wbs = %task.wbs, "deleted task");
        Ok(task)
    }

    /// Applies many patches in one transaction.
    ///
    /// Invalid, missing or path-conflicting records are reported and skipped;
    /// the rest are written. Affected roots are collected across the batch and each is
    /// recomputed once at the end.
    ///
    /// # Errors
    /// Returns an error only for database failures, which abort the batch.
    pub fn apply_batch(
        &mut self,
        updates: &[(i64, TaskPatch)],
        today: NaiveDate,
    ) -> Result<BatchReport> {
        let tx = self.conn.transaction()?;
        let repo = TaskRepo::new(&tx);
        let mut report = BatchReport::default();
        let mut touched = Vec::new();

        for (id, patch) in updates {
            let Some(before) = repo.find_by_id(*id)? else {
                warn!(id, "batch update skipped: task not found");
                report.rejected.push((*id, EngineError::NotFound(*id)));
                continue;
            };

            let mut candidate = before.clone();
            candidate.apply(patch);
            if let Err(e) = validate_candidate(&candidate) {
                warn!(id, error = %e, "batch update rejected");
                report.rejected.push((*id, e));
                continue;
            }
            if repo
                .find_by_exact_path(&candidate.wbs)?
                .is_some_and(|other| other.id != *id)
            {
                let e = EngineError::DuplicatePath(candidate.wbs.clone());
                warn!(id, error = %e, "batch update rejected");
                report.rejected.push((*id, e));
                continue;
            }

            let task = repo.update(&candidate)?;
            recompute_one(&repo, &task, today)?;
            if patch.touches_aggregates() {
                touched.push(before);
                touched.push(task.clone());
            }
            report.applied.push(task);
        }

        let roots = affected_roots_for(&touched);
        recompute_roots(&repo, &roots, today)?;
        report.recomputed_roots = roots.into_iter().collect();

        let mut applied = Vec::with_capacity(report.applied.len());
        for task in &report.applied {
            applied.push(repo.require(task.id)?);
        }
        report.applied = applied;
        tx.commit()?;

        info!(
            applied = report.applied.len(),
            rejected = report.rejected.len(),
            roots = report.recomputed_roots.len(),
            "applied batch"
        );
        Ok(report)
    }

    /// Loads a task with its derived fields evaluated for `today`.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown id, or a database error.
    pub fn get(&self, id: i64, today: NaiveDate) -> Result<Task> {
        let repo = TaskRepo::new(&self.conn);
        let task = repo.require(id)?;
        fresh(&repo, task, today)
    }

    /// Finds a task by exact WBS path or, failing that, by numeric id.
    ///
    /// # Errors
    /// Returns an error if nothing matches.
    pub fn resolve(&self, reference: &str, today: NaiveDate) -> Result<Task> {
        let repo = TaskRepo::new(&self.conn);
        if let Some(task) = repo.find_by_exact_path(reference)? {
            return fresh(&repo, task, today);
        }
        if let Ok(id) = reference.parse::<i64>() {
            if let Some(task) = repo.find_by_id(id)? {
                return fresh(&repo, task, today);
            }
        }
        anyhow::bail!("No task matches '{reference}'")
    }

    /// Tasks in scope (a root and its descendants, or all) with fresh
    /// derived fields.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn list(&self, root: Option<&str>, today: NaiveDate) -> Result<Vec<Task>> {
        let repo = TaskRepo::new(&self.conn);
        let mut tasks = repo.find_in_scope(root)?;
        for task in &mut tasks {
            task.derived = recompute_aggregates(task, &repo, today)?;
        }
        Ok(tasks)
    }

    /// Recomputes and persists the derived fields of every task, e.g. after
    /// the date has moved on.
    ///
    /// # Errors
    /// Returns an error if the database fails.
    pub fn refresh(&mut self, today: NaiveDate) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let repo = TaskRepo::new(&tx);
        let tasks = repo.get_all()?;
        let mut changed = 0;
        for task in &tasks {
            if recompute_one(&repo, task, today)? != task.derived {
                changed += 1;
            }
        }
        tx.commit()?;
        info!(total = tasks.len(), changed, "refreshed derived fields");
        Ok(changed)
    }
}

fn draft_candidate(draft: &TaskDraft) -> Task {
    Task {
        id: 0,
        wbs: draft.wbs.clone(),
        name: draft.name.clone(),
        start_date: draft.start_date,
        end_date: draft.end_date,
        progress: draft.progress,
        dependencies: draft.dependencies.clone(),
        priority: draft.priority,
        description: draft.description.clone(),
        color: draft.color.clone(),
        created_at: String::new(),
        derived: DerivedFields::default(),
    }
}

fn fresh(repo: &TaskRepo<'_>, mut task: Task, today: NaiveDate) -> Result<Task> {
    task.derived = recompute_aggregates(&task, repo, today)?;
    Ok(task)
}

fn recompute_one(repo: &TaskRepo<'_>, task: &Task, today: NaiveDate) -> Result<DerivedFields> {
    let derived = recompute_aggregates(task, repo, today)?;
    repo.save_derived(task.id, &derived)?;
    debug!(id = task.id, wbs = %task.wbs, ?derived, "recomputed task");
    Ok(derived)
}

/// Recomputes each root once. Roots with no stored task are skipped.
fn recompute_roots(repo: &TaskRepo<'_>, roots: &BTreeSet<String>, today: NaiveDate) -> Result<()> {
    for root in roots {
        let Some(task) = repo.find_by_exact_path(root)? else {
            debug!(root = %root, "root task not found, skipping recompute");
            continue;
        };
        recompute_one(repo, &task, today)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::db::Db;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 20).unwrap()
    }

    fn store() -> TaskStore {
        TaskStore::new(Db::memory().unwrap())
    }

    fn engine_err(err: &anyhow::Error) -> Option<&EngineError> {
        err.downcast_ref::<EngineError>()
    }

    #[test]
    fn test_create_validates_before_write() {
        let mut store = store();
        let start = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();

        let err = store
            .create(&TaskDraft::new("1", "Plan").dates(start, end), today())
            .unwrap_err();
        assert!(matches!(engine_err(&err), Some(EngineError::DateOrder { .. })));

        let err = store
            .create(&TaskDraft::new("1", "Plan").progress(101.0), today())
            .unwrap_err();
        assert!(matches!(engine_err(&err), Some(EngineError::Range { .. })));

        let err = store
            .create(&TaskDraft::new("1.", "Plan"), today())
            .unwrap_err();
        assert!(matches!(engine_err(&err), Some(EngineError::InvalidPath(_))));

        assert!(store.list(None, today()).unwrap().is_empty());
    }

    #[test]
    fn test_root_created_after_children_picks_them_up() {
        let mut store = store();
        store
            .create(&TaskDraft::new("1.1", "a").progress(20.0), today())
            .unwrap();
        let root = store
            .create(&TaskDraft::new("1", "root").progress(90.0), today())
            .unwrap();
        assert_eq!(root.derived.overall_progress, 20.0);
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let mut store = store();
        let err = store
            .update(7, &TaskPatch::progress(10.0), today())
            .unwrap_err();
        assert_eq!(engine_err(&err), Some(&EngineError::NotFound(7)));
    }

    #[test]
    fn test_moving_child_updates_both_roots() {
        let mut store = store();
        let one = store.create(&TaskDraft::new("1", "one"), today()).unwrap();
        let two = store.create(&TaskDraft::new("2", "two"), today()).unwrap();
        store
            .create(&TaskDraft::new("1.1", "stay").progress(10.0), today())
            .unwrap();
        let mover = store
            .create(&TaskDraft::new("1.2", "move").progress(90.0), today())
            .unwrap();
        assert_eq!(store.get(one.id, today()).unwrap().derived.overall_progress, 50.0);

        let patch = TaskPatch {
            wbs: Some("2.1".into()),
            ..TaskPatch::default()
        };
        store.update(mover.id, &patch, today()).unwrap();

        let repo = TaskRepo::new(store.conn());
        assert_eq!(repo.require(one.id).unwrap().derived.overall_progress, 10.0);
        assert_eq!(repo.require(two.id).unwrap().derived.overall_progress, 90.0);
    }

    #[test]
    fn test_refresh_reports_changes() {
        let mut store = store();
        let end = NaiveDate::from_ymd_opt(2024, 1, 25).unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        store
            .create(&TaskDraft::new("1", "a").dates(start, end), today())
            .unwrap();

        assert_eq!(store.refresh(today()).unwrap(), 0);
        let later = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(store.refresh(later).unwrap(), 1);
        assert!(store.list(None, later).unwrap()[0].derived.is_delayed);
    }

    #[test]
    fn test_resolve_by_path_then_id() {
        let mut store = store();
        let a = store.create(&TaskDraft::new("1", "a"), today()).unwrap();
        let b = store.create(&TaskDraft::new("1.1", "b"), today()).unwrap();
        assert_eq!(store.resolve("1.1", today()).unwrap().id, b.id);
        assert_eq!(store.resolve(&a.id.to_string(), today()).unwrap().wbs, "1");
        assert!(store.resolve("9.9", today()).is_err());
    }
}
