//! Core engine modules for gantt.

pub mod aggregate;
pub mod chart;
pub mod db;
pub mod error;
pub mod repo;
pub mod sample;
pub mod store;
pub mod summary;
pub mod types;
pub mod validate;
pub mod wbs;
