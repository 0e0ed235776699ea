//! Handler for the `seed` command.

use super::open_store;
use anyhow::Result;
use colored::Colorize;
use gantt::config::Config;
use gantt::engine::sample;

/// Inserts the sample projects.
///
/// # Errors
/// Returns error if a sample path already exists.
pub fn handle(config: &Config) -> Result<()> {
    let mut store = open_store(config)?;
    let created = sample::seed(&mut store, config.today())?;
    println!("{} Seeded {} sample tasks", "✓".green(), created.len());
    Ok(())
}
