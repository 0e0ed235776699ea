//! Core types for the Gantt task engine.
//!
//! Note: `DerivedFields` on a stored `Task` is a cache written by the store.
//! The true values are always the ones `aggregate::recompute_aggregates()`
//! returns for the current data and date.

use super::error::EngineError;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Bar colour used when a task does not set one.
pub const DEFAULT_COLOR: &str = "#3498db";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// High and urgent tasks count as critical in project summaries.
    #[must_use]
    pub fn is_critical(self) -> bool {
        matches!(self, Self::High | Self::Urgent)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(EngineError::InvalidPriority(s.to_string())),
        }
    }
}

/// Values computed from other fields, never set directly.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DerivedFields {
    /// Inclusive day count; 0 when either date is absent.
    pub duration: i64,
    pub is_delayed: bool,
    pub overall_progress: f64,
}

/// A task row as held by the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub id: i64,
    pub wbs: String,
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub progress: f64,
    pub dependencies: Vec<String>,
    pub priority: Priority,
    pub description: Option<String>,
    pub color: String,
    pub created_at: String,
    #[serde(flatten)]
    pub derived: DerivedFields,
}

impl Task {
    #[must_use]
    pub fn is_root(&self) -> bool {
        super::wbs::is_root(&self.wbs)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.progress >= 100.0
    }

    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.progress > 0.0 && self.progress < 100.0
    }

    /// Applies a patch in place. Validation happens on the merged result.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(wbs) = &patch.wbs {
            self.wbs.clone_from(wbs);
        }
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(start) = patch.start_date {
            self.start_date = Some(start);
        }
        if let Some(end) = patch.end_date {
            self.end_date = Some(end);
        }
        if let Some(progress) = patch.progress {
            self.progress = progress;
        }
        if let Some(deps) = &patch.dependencies {
            self.dependencies.clone_from(deps);
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(desc) = &patch.description {
            self.description = Some(desc.clone());
        }
        if let Some(color) = &patch.color {
            self.color.clone_from(color);
        }
    }
}

/// Caller-supplied fields for a new task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub wbs: String,
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub progress: f64,
    pub dependencies: Vec<String>,
    pub priority: Priority,
    pub description: Option<String>,
    pub color: String,
}

impl TaskDraft {
    #[must_use]
    pub fn new(wbs: &str, name: &str) -> Self {
        Self {
            wbs: wbs.to_string(),
            name: name.to_string(),
            start_date: None,
            end_date: None,
            progress: 0.0,
            dependencies: Vec::new(),
            priority: Priority::default(),
            description: None,
            color: DEFAULT_COLOR.to_string(),
        }
    }

    #[must_use]
    pub fn dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    #[must_use]
    pub fn progress(mut self, progress: f64) -> Self {
        self.progress = progress;
        self
    }

    #[must_use]
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn depends_on(mut self, deps: &str) -> Self {
        self.dependencies = parse_dependencies(deps);
        self
    }

    #[must_use]
    pub fn color(mut self, color: &str) -> Self {
        self.color = color.to_string();
        self
    }
}

/// Partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskPatch {
    pub wbs: Option<String>,
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub progress: Option<f64>,
    pub dependencies: Option<Vec<String>>,
    pub priority: Option<Priority>,
    pub description: Option<String>,
    pub color: Option<String>,
}

impl TaskPatch {
    #[must_use]
    pub fn progress(progress: f64) -> Self {
        Self {
            progress: Some(progress),
            ..Self::default()
        }
    }

    /// True if applying this patch can change any root's overall progress.
    #[must_use]
    pub fn touches_aggregates(&self) -> bool {
        self.progress.is_some() || self.wbs.is_some()
    }
}

/// Splits the free-text dependency list (`"1, 2,3"`) into identifiers.
#[must_use]
pub fn parse_dependencies(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Inverse of `parse_dependencies`, used for the stored column.
#[must_use]
pub fn join_dependencies(deps: &[String]) -> String {
    deps.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_parse_and_display() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(Priority::Urgent.to_string(), "urgent");
        assert_eq!(Priority::default(), Priority::Medium);
        assert!(matches!(
            "soon".parse::<Priority>(),
            Err(EngineError::InvalidPriority(_))
        ));
        assert!(Priority::High.is_critical());
        assert!(!Priority::Medium.is_critical());
    }

    #[test]
    fn test_dependencies_free_text() {
        assert_eq!(parse_dependencies(" 1, 2,,3 "), vec!["1", "2", "3"]);
        assert!(parse_dependencies("").is_empty());
        assert_eq!(join_dependencies(&parse_dependencies("4, 5")), "4,5");
    }

    #[test]
    fn test_patch_touches_aggregates() {
        assert!(TaskPatch::progress(10.0).touches_aggregates());
        let rename = TaskPatch {
            name: Some("x".into()),
            ..TaskPatch::default()
        };
        assert!(!rename.touches_aggregates());
    }
}
