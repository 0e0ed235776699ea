use anyhow::{Context, Result};
use rusqlite::Connection;
use std::fs;
use std::path::Path;

pub struct Db;

impl Db {
    /// Creates the parent directory and `SQLite` schema at `path`.
    ///
    /// # Errors
    /// Returns error if directory creation, DB opening, or migration fails.
    pub fn init(path: &Path) -> Result<Connection> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if !dir.exists() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
            }
        }

        let conn = Connection::open(path).context("Failed to open database")?;
        Self::migrate(&conn)?;
        tracing::info!(path = %path.display(), "initialized task database");
        Ok(conn)
    }

    /// Connects to an existing database.
    ///
    /// # Errors
    /// Returns error if the database file does not exist or cannot be opened.
    pub fn connect(path: &Path) -> Result<Connection> {
        if !path.exists() {
            anyhow::bail!("Task database not initialized. Run `gantt init` first.");
        }
        let conn = Connection::open(path).context("Failed to open database")?;
        Self::migrate(&conn)?;
        Ok(conn)
    }

    /// Opens a private in-memory database with the schema applied.
    ///
    /// # Errors
    /// Returns error if migration fails.
    pub fn memory() -> Result<Connection> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::migrate(&conn)?;
        Ok(conn)
    }

    /// Applies the schema migrations.
    fn migrate(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                wbs TEXT UNIQUE NOT NULL,
                name TEXT NOT NULL,
                start_date TEXT,
                end_date TEXT,
                progress REAL NOT NULL DEFAULT 0,
                dependencies TEXT NOT NULL DEFAULT '',
                priority TEXT NOT NULL DEFAULT 'medium',
                description TEXT,
                color TEXT NOT NULL DEFAULT '#3498db',
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                duration INTEGER NOT NULL DEFAULT 0,
                is_delayed INTEGER NOT NULL DEFAULT 0,
                overall_progress REAL NOT NULL DEFAULT 0
            )",
            [],
        )
        .context("Failed to create tasks table")?;

        if !has_column(conn, "tasks", "color")? {
            conn.execute(
                "ALTER TABLE tasks ADD COLUMN color TEXT NOT NULL DEFAULT '#3498db'",
                [],
            )
            .context("Failed to add color column")?;
        }

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_tasks_wbs ON tasks (wbs)",
            [],
        )
        .context("Failed to create wbs index")?;

        Ok(())
    }
}

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
    for name in names {
        if name? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_creates_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.db");
        Db::init(&path).unwrap();
        assert!(path.exists());
        assert!(Db::connect(&path).is_ok());
    }

    #[test]
    fn test_connect_requires_init() {
        let dir = tempfile::tempdir().unwrap();
        let err = Db::connect(&dir.path().join("missing.db")).unwrap_err();
        assert!(err.to_string().contains("gantt init"));
    }

    #[test]
    fn test_migrate_adds_color_to_old_table() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            "CREATE TABLE tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                wbs TEXT UNIQUE NOT NULL,
                name TEXT NOT NULL,
                start_date TEXT,
                end_date TEXT,
                progress REAL NOT NULL DEFAULT 0,
                dependencies TEXT NOT NULL DEFAULT '',
                priority TEXT NOT NULL DEFAULT 'medium',
                description TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                duration INTEGER NOT NULL DEFAULT 0,
                is_delayed INTEGER NOT NULL DEFAULT 0,
                overall_progress REAL NOT NULL DEFAULT 0
            )",
            [],
        )
        .unwrap();
        conn.execute("INSERT INTO tasks (wbs, name) VALUES ('1', 'Old')", [])
            .unwrap();

        Db::migrate(&conn).unwrap();
        Db::migrate(&conn).unwrap();
        let color: String = conn
            .query_row("SELECT color FROM tasks WHERE wbs = '1'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(color, "#3498db");
    }
}
