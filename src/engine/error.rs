//! Error taxonomy for the task engine.
//!
//! Each validation failure has its own variant so the store can tell them
//! apart and reject a single record without failing a whole batch.

use thiserror::Error;

/// Failures raised by path parsing, validation and record lookup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Empty WBS path or a path with an empty segment (`"1..2"`, `"1."`).
    #[error("invalid WBS path '{0}'")]
    InvalidPath(String),

    /// Start date falls after end date. Equal dates are accepted.
    #[error("end date must not be before start date ({start} > {end})")]
    DateOrder {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    /// A numeric field lies outside its inclusive bounds.
    #[error("{field} must be between {min} and {max} (got {value})")]
    Range {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    /// Colour is not `#rgb` or `#rrggbb` hex.
    #[error("invalid colour '{0}' (expected hex such as #3498db)")]
    InvalidColor(String),

    /// A required field is empty.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Another task is already stored under this path.
    #[error("task with WBS '{0}' already exists")]
    DuplicatePath(String),

    /// No task with this id exists in the store.
    #[error("task {0} not found")]
    NotFound(i64),

    #[error("unknown priority '{0}' (expected low, medium, high or urgent)")]
    InvalidPriority(String),
}
