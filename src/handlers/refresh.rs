//! Handler for the `refresh` command.

use super::open_store;
use anyhow::Result;
use colored::Colorize;
use gantt::config::Config;

/// Re-derives stored fields as of today (delay flags go stale overnight).
///
/// # Errors
/// Returns error if the database fails.
pub fn handle(config: &Config) -> Result<()> {
    let mut store = open_store(config)?;
    let changed = store.refresh(config.today())?;
    println!("{} Refreshed derived fields ({changed} changed)", "✓".green());
    Ok(())
}
