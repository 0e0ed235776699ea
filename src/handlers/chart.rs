//! Handler for the `chart` command.

use super::open_store;
use anyhow::Result;
use chrono::NaiveDate;
use colored::Colorize;
use gantt::config::Config;
use gantt::engine::chart::{gantt_bars, GanttBar};
use gantt::engine::wbs::WbsPath;
use serde::Serialize;

const WIDTH: i64 = 40;

#[derive(Serialize)]
struct ChartReport<'a> {
    wbs_root: Option<&'a str>,
    tasks: Vec<GanttBar>,
}

/// Prints chart bars for all tasks or a single project.
///
/// # Errors
/// Returns error if database query fails.
pub fn handle(config: &Config, root: Option<&WbsPath>, json: bool) -> Result<()> {
    let store = open_store(config)?;
    let root = root.map(WbsPath::as_str);
    let tasks = store.list(root, config.today())?;
    let bars = gantt_bars(&tasks);

    if json {
        let report = ChartReport {
            wbs_root: root,
            tasks: bars,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_human(&bars);
    Ok(())
}

fn print_human(bars: &[GanttBar]) {
    let rows: Vec<(&GanttBar, (NaiveDate, NaiveDate))> = bars
        .iter()
        .filter_map(|b| span(b).map(|s| (b, s)))
        .collect();
    let (Some(first), Some(last)) = (
        rows.iter().map(|(_, s)| s.0).min(),
        rows.iter().map(|(_, s)| s.1).max(),
    ) else {
        println!("   (Nothing to chart)");
        return;
    };
    let total = (last - first).num_days() + 1;

    println!("   {first} → {last}");
    for (bar, (start, end)) in rows {
        let offset = (start - first).num_days() * WIDTH / total;
        let len = ((end - start).num_days() + 1) * WIDTH / total;
        let cells = "█".repeat(usize::try_from(len.max(1)).unwrap_or(1));
        let cells = if bar.is_delayed {
            cells.red()
        } else if bar.progress >= 100.0 {
            cells.green()
        } else {
            cells.cyan()
        };
        println!(
            "   {:<8} {}{} {:.0}% {}",
            bar.wbs,
            " ".repeat(usize::try_from(offset).unwrap_or(0)),
            cells,
            bar.progress,
            bar.name.dimmed()
        );
    }
}

fn span(bar: &GanttBar) -> Option<(NaiveDate, NaiveDate)> {
    let start = bar.start.parse().ok()?;
    let end = bar.end.parse().ok()?;
    Some((start, end))
}
