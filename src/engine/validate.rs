//! Consistency Validator: field invariants checked before any write.
//!
//! Every check is a pure function of the candidate values. Nothing is
//! written or rolled back here; the store decides what to do on failure.

use super::error::EngineError;
use super::types::Task;
use super::wbs;
use chrono::NaiveDate;

pub const PROGRESS_MIN: f64 = 0.0;
pub const PROGRESS_MAX: f64 = 100.0;

/// Rejects a start date after the end date. Equal or absent dates pass.
///
/// # Errors
/// Returns `DateOrder` if `start > end`.
pub fn validate_date_order(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), EngineError> {
    match (start, end) {
        (Some(start), Some(end)) if start > end => Err(EngineError::DateOrder { start, end }),
        _ => Ok(()),
    }
}

/// Rejects progress outside `[0, 100]`, including NaN.
///
/// # Errors
/// Returns `Range` with the offending value.
pub fn validate_progress_range(progress: f64) -> Result<(), EngineError> {
    if (PROGRESS_MIN..=PROGRESS_MAX).contains(&progress) {
        return Ok(());
    }
    Err(EngineError::Range {
        field: "progress",
        min: PROGRESS_MIN,
        max: PROGRESS_MAX,
        value: progress,
    })
}

/// # Errors
/// Returns `InvalidPath` for a malformed path.
pub fn validate_wbs(path: &str) -> Result<(), EngineError> {
    wbs::segments(path).map(|_| ())
}

/// # Errors
/// Returns `MissingField("name")` for a blank name.
pub fn validate_name(name: &str) -> Result<(), EngineError> {
    if name.trim().is_empty() {
        return Err(EngineError::MissingField("name"));
    }
    Ok(())
}

/// # Errors
/// Returns `InvalidColor` unless `color` is `#` followed by 3 or 6 hex digits.
pub fn validate_color(color: &str) -> Result<(), EngineError> {
    let valid = color.strip_prefix('#').is_some_and(|hex| {
        matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
    });
    if valid {
        Ok(())
    } else {
        Err(EngineError::InvalidColor(color.to_string()))
    }
}

/// Runs every check against a candidate task, path first.
///
/// # Errors
/// Returns the first failing check.
pub fn validate_candidate(task: &Task) -> Result<(), EngineError> {
    validate_wbs(&task.wbs)?;
    validate_name(&task.name)?;
    validate_date_order(task.start_date, task.end_date)?;
    validate_progress_range(task.progress)?;
    validate_color(&task.color)
}
