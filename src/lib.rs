//! Gantt task tracking over WBS paths.
//!
//! Tasks live in a `SQLite` store and are arranged by dot-separated WBS
//! paths (`"1"`, `"1.2"`, `"1.2.3"`). After every mutation the store asks
//! the engine for fresh derived values (duration, delay flag, overall
//! progress) and persists them.

pub mod config;
pub mod engine;
