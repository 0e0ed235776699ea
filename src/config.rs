//! Runtime configuration resolved from CLI flags and environment.

use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

pub const DEFAULT_DB_DIR: &str = ".gantt";
pub const DEFAULT_DB_FILE: &str = "state.db";
pub const LOG_ENV: &str = "GANTT_LOG";

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    /// Fixed "today" for delay computation; the local date when `None`.
    pub today: Option<NaiveDate>,
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: Path::new(DEFAULT_DB_DIR).join(DEFAULT_DB_FILE),
            today: None,
            verbose: false,
        }
    }
}

impl Config {
    #[must_use]
    pub fn new(db_path: Option<PathBuf>, today: Option<NaiveDate>, verbose: bool) -> Self {
        let defaults = Self::default();
        Self {
            db_path: db_path.unwrap_or(defaults.db_path),
            today,
            verbose,
        }
    }

    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Log filter: `GANTT_LOG` if set, else `debug` with `-v`, else `warn`.
    #[must_use]
    pub fn log_filter(&self) -> EnvFilter {
        let fallback = if self.verbose { "gantt=debug" } else { "warn" };
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback))
    }

    /// Installs the global tracing subscriber, writing to stderr.
    pub fn init_logging(&self) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(self.log_filter())
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}
