//! Task Repository: All database operations in one place.
//!
//! The repository stores and loads rows. It does not validate or derive
//! anything; `store::TaskStore` drives it together with the engine.

use super::aggregate::TaskView;
use super::error::EngineError;
use super::types::{join_dependencies, parse_dependencies, DerivedFields, Task, TaskDraft};
use super::wbs;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};

pub const TASK_SELECT: &str = "SELECT id, wbs, name, start_date, end_date, progress, dependencies, \
     priority, description, color, created_at, duration, is_delayed, overall_progress FROM tasks";

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct TaskRepo<'a> {
    conn: &'a Connection,
}

impl<'a> TaskRepo<'a> {
    /// Creates a new repository instance borrowing the connection.
    #[must_use]
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Inserts a task and returns the stored row.
    ///
    /// # Errors
    /// Returns an error if the path is taken or the insertion fails.
    pub fn create(&self, draft: &TaskDraft) -> Result<Task> {
        if self.find_by_exact_path(&draft.wbs)?.is_some() {
            return Err(EngineError::DuplicatePath(draft.wbs.clone()).into());
        }

        self.conn.execute(
            "INSERT INTO tasks (wbs, name, start_date, end_date, progress, dependencies, priority, description, color)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                draft.wbs,
                draft.name,
                draft.start_date.map(|d| d.format(DATE_FORMAT).to_string()),
                draft.end_date.map(|d| d.format(DATE_FORMAT).to_string()),
                draft.progress,
                join_dependencies(&draft.dependencies),
                draft.priority.as_str(),
                draft.description,
                draft.color,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.require(id)
    }

    /// Overwrites the raw (non-derived) columns of an existing task.
    ///
    /// # Errors
    /// Returns `NotFound` if the row is gone, or an error if the path is
    /// already used by another task.
    pub fn update(&self, task: &Task) -> Result<Task> {
        self.ensure_path_free(&task.wbs, task.id)?;

        let changed = self.conn.execute(
            "UPDATE tasks SET wbs = ?1, name = ?2, start_date = ?3, end_date = ?4, progress = ?5,
                 dependencies = ?6, priority = ?7, description = ?8, color = ?9
             WHERE id = ?10",
            params![
                task.wbs,
                task.name,
                task.start_date.map(|d| d.format(DATE_FORMAT).to_string()),
                task.end_date.map(|d| d.format(DATE_FORMAT).to_string()),
                task.progress,
                join_dependencies(&task.dependencies),
                task.priority.as_str(),
                task.description,
                task.color,
                task.id,
            ],
        )?;
        if changed == 0 {
            return Err(EngineError::NotFound(task.id).into());
        }
        self.require(task.id)
    }

    /// Fails with `DuplicatePath` if a task other than `id` holds `path`.
    ///
    /// # Errors
    /// Returns `DuplicatePath` on a conflict, or an error if the query fails.
    pub fn ensure_path_free(&self, path: &str, id: i64) -> Result<()> {
        match self.find_by_exact_path(path)? {
            Some(other) if other.id != id => {
                Err(EngineError::DuplicatePath(path.to_string()).into())
            }
            _ => Ok(()),
        }
    }

    /// Writes the cached derived columns.
    ///
    /// # Errors
    /// Returns `NotFound` if the row is gone.
    pub fn save_derived(&self, id: i64, derived: &DerivedFields) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE tasks SET duration = ?1, is_delayed = ?2, overall_progress = ?3 WHERE id = ?4",
            params![
                derived.duration,
                derived.is_delayed,
                derived.overall_progress,
                id
            ],
        )?;
        if changed == 0 {
            return Err(EngineError::NotFound(id).into());
        }
        Ok(())
    }

    /// Deletes a task.
    ///
    /// # Errors
    /// Returns `NotFound` if no row had this id.
    pub fn delete(&self, id: i64) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(EngineError::NotFound(id).into());
        }
        Ok(())
    }

    /// Retrieves all tasks ordered by path.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn get_all(&self) -> Result<Vec<Task>> {
        let sql = format!("{TASK_SELECT} ORDER BY wbs, id");
        self.query(&sql, params![])
    }

    /// Finds a task by its internal ID.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn find_by_id(&self, id: i64) -> Result<Option<Task>> {
        let sql = format!("{TASK_SELECT} WHERE id = ?1");
        self.conn
            .query_row(&sql, params![id], row_to_task)
            .optional()
            .context("Search by ID failed")
    }

    /// Like `find_by_id`, but a missing row is an error.
    ///
    /// # Errors
    /// Returns `NotFound` if no row has this id.
    pub fn require(&self, id: i64) -> Result<Task> {
        self.find_by_id(id)?
            .ok_or_else(|| EngineError::NotFound(id).into())
    }

    /// Finds the task stored under exactly this path.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn find_by_exact_path(&self, path: &str) -> Result<Option<Task>> {
        let sql = format!("{TASK_SELECT} WHERE wbs = ?1");
        self.conn
            .query_row(&sql, params![path], row_to_task)
            .optional()
            .context("Search by WBS failed")
    }

    /// Tasks whose path starts with `prefix`, byte for byte.
    ///
    /// Uses `substr` rather than `LIKE` so `%` and `_` in paths stay literal.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn find_by_prefix(&self, prefix: &str) -> Result<Vec<Task>> {
        let sql = format!(
            "{TASK_SELECT} WHERE substr(wbs, 1, length(?1)) = ?1 ORDER BY wbs, id"
        );
        self.query(&sql, params![prefix])
    }

    /// A root and all of its descendants, or every task when `root` is `None`.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn find_in_scope(&self, root: Option<&str>) -> Result<Vec<Task>> {
        let Some(root) = root else {
            return self.get_all();
        };
        let sql = format!(
            "{TASK_SELECT} WHERE wbs = ?1 OR substr(wbs, 1, length(?2)) = ?2 ORDER BY wbs, id"
        );
        self.query(&sql, params![root, wbs::descendant_prefix(root)])
    }

    fn query(&self, sql: &str, args: impl rusqlite::Params) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(args, row_to_task)?;
        let mut tasks = Vec::new();
        for task in rows {
            tasks.push(task?);
        }
        Ok(tasks)
    }
}

impl TaskView for TaskRepo<'_> {
    fn with_prefix(&self, prefix: &str) -> Result<Vec<Task>> {
        self.find_by_prefix(prefix)
    }
}

/// Converts a database row to a Task object.
///
/// # Errors
/// Returns a `rusqlite` error if data conversion fails.
pub fn row_to_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
    let deps: String = row.get(6)?;
    let priority: String = row.get(7)?;

    Ok(Task {
        id: row.get(0)?,
        wbs: row.get(1)?,
        name: row.get(2)?,
        start_date: parse_date_column(row, 3)?,
        end_date: parse_date_column(row, 4)?,
        progress: row.get(5)?,
        dependencies: parse_dependencies(&deps),
        priority: priority.parse().map_err(|e: EngineError| {
            rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e))
        })?,
        description: row.get(8)?,
        color: row.get(9)?,
        created_at: row.get::<_, Option<String>>(10)?.unwrap_or_default(),
        derived: DerivedFields {
            duration: row.get(11)?,
            is_delayed: row.get(12)?,
            overall_progress: row.get(13)?,
        },
    })
}

fn parse_date_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let raw: Option<String> = row.get(idx)?;
    raw.filter(|s| !s.is_empty())
        .map(|s| {
            NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::db::Db;
    use crate::engine::types::Priority;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_create_and_find() {
        let conn = Db::memory().unwrap();
        let repo = TaskRepo::new(&conn);
        let draft = TaskDraft::new("1.1", "Design")
            .dates(d("2024-01-06"), d("2024-01-15"))
            .progress(75.0)
            .priority(Priority::High)
            .depends_on("1, 3");

        let task = repo.create(&draft).unwrap();
        assert_eq!(task.wbs, "1.1");
        assert_eq!(task.start_date, Some(d("2024-01-06")));
        assert_eq!(task.dependencies, vec!["1", "3"]);
        assert_eq!(task.priority, Priority::High);

        let by_path = repo.find_by_exact_path("1.1").unwrap().unwrap();
        assert_eq!(by_path.id, task.id);
        assert!(repo.find_by_exact_path("1").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_path_rejected() {
        let conn = Db::memory().unwrap();
        let repo = TaskRepo::new(&conn);
        repo.create(&TaskDraft::new("1", "Plan")).unwrap();
        let err = repo.create(&TaskDraft::new("1", "Again")).unwrap_err();
        assert_eq!(
            err.downcast_ref::<EngineError>(),
            Some(&EngineError::DuplicatePath("1".to_string()))
        );

        let mut other = repo.create(&TaskDraft::new("2", "Other")).unwrap();
        other.wbs = "1".to_string();
        let err = repo.update(&other).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::DuplicatePath(p)) if p == "1"
        ));
        assert!(repo.ensure_path_free("2", other.id).is_ok());
    }

    #[test]
    fn test_corrupt_priority_is_an_error() {
        let conn = Db::memory().unwrap();
        let repo = TaskRepo::new(&conn);
        let task = repo.create(&TaskDraft::new("1", "Plan")).unwrap();
        conn.execute(
            "UPDATE tasks SET priority = 'whenever' WHERE id = ?1",
            params![task.id],
        )
        .unwrap();
        assert!(repo.find_by_id(task.id).is_err());
    }

    #[test]
    fn test_prefix_is_literal() {
        let conn = Db::memory().unwrap();
        let repo = TaskRepo::new(&conn);
        for path in ["1", "1.1", "1.2", "12", "1_x", "a%.1"] {
            repo.create(&TaskDraft::new(path, "t")).unwrap();
        }

        let paths: Vec<_> = repo
            .find_by_prefix("1.")
            .unwrap()
            .into_iter()
            .map(|t| t.wbs)
            .collect();
        assert_eq!(paths, vec!["1.1", "1.2"]);

        assert_eq!(repo.find_by_prefix("a%.").unwrap().len(), 1);
        assert!(repo.find_by_prefix("a_.").unwrap().is_empty());

        let scope: Vec<_> = repo
            .find_in_scope(Some("1"))
            .unwrap()
            .into_iter()
            .map(|t| t.wbs)
            .collect();
        assert_eq!(scope, vec!["1", "1.1", "1.2"]);
        assert_eq!(repo.find_in_scope(None).unwrap().len(), 6);
    }

    #[test]
    fn test_ids_not_reused() {
        let conn = Db::memory().unwrap();
        let repo = TaskRepo::new(&conn);
        let first = repo.create(&TaskDraft::new("1", "a")).unwrap();
        repo.delete(first.id).unwrap();
        let second = repo.create(&TaskDraft::new("1", "b")).unwrap();
        assert!(second.id > first.id);
    }

    #[test]
    fn test_missing_rows_report_not_found() {
        let conn = Db::memory().unwrap();
        let repo = TaskRepo::new(&conn);
        let err = repo.delete(42).unwrap_err();
        assert_eq!(
            err.downcast_ref::<EngineError>(),
            Some(&EngineError::NotFound(42))
        );
        assert!(repo.save_derived(42, &DerivedFields::default()).is_err());
        assert!(repo.require(42).is_err());
    }
}
