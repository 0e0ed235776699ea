mod handlers;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use gantt::config::Config;
use gantt::engine::types::{Priority, DEFAULT_COLOR};
use gantt::engine::wbs::WbsPath;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gantt", version, about = "Gantt task tracking over WBS paths")]
struct Cli {
    /// Path to the task database
    #[arg(long, global = true, env = "GANTT_DB")]
    db: Option<PathBuf>,
    /// Evaluate delays as of this date (YYYY-MM-DD) instead of today
    #[arg(long, global = true, env = "GANTT_TODAY")]
    today: Option<NaiveDate>,
    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Initialize the task database
    Init,
    /// Add a new task
    Add {
        /// WBS path, e.g. 1 or 1.2
        wbs: String,
        name: String,
        #[arg(long, short = 's')]
        start: Option<NaiveDate>,
        #[arg(long, short = 'e')]
        end: Option<NaiveDate>,
        #[arg(long, short = 'p', default_value_t = 0.0)]
        progress: f64,
        #[arg(long, default_value_t = Priority::Medium)]
        priority: Priority,
        /// Comma-separated task identifiers
        #[arg(long, short = 'd')]
        deps: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        /// Bar colour as hex, e.g. #3498db
        #[arg(long, default_value = DEFAULT_COLOR)]
        color: String,
    },
    /// Edit an existing task
    Edit {
        /// Task id or WBS path
        task: String,
        #[arg(long)]
        wbs: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, short = 's')]
        start: Option<NaiveDate>,
        #[arg(long, short = 'e')]
        end: Option<NaiveDate>,
        #[arg(long, short = 'p')]
        progress: Option<f64>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long, short = 'd')]
        deps: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a task
    Rm {
        /// Task id or WBS path
        task: String,
    },
    /// List tasks ordered by WBS path
    List {
        #[arg(long, short = 'r')]
        root: Option<WbsPath>,
        #[arg(long)]
        json: bool,
    },
    /// Show one task with its derived fields
    Show {
        task: String,
        #[arg(long)]
        json: bool,
    },
    /// Show chart bars for all tasks or one project
    Chart {
        #[arg(long, short = 'r')]
        root: Option<WbsPath>,
        #[arg(long)]
        json: bool,
    },
    /// Summarise one project (a root path and its descendants)
    Summary {
        root: WbsPath,
        #[arg(long)]
        json: bool,
    },
    /// Insert sample projects
    Seed,
    /// Recompute stored derived fields for the current date
    Refresh,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::new(cli.db, cli.today, cli.verbose);
    config.init_logging();

    match cli.command {
        Commands::Init
        | Commands::Add { .. }
        | Commands::Edit { .. }
        | Commands::Rm { .. }
        | Commands::Seed
        | Commands::Refresh => dispatch_write_ops(&config, cli.command),
        Commands::List { .. }
        | Commands::Show { .. }
        | Commands::Chart { .. }
        | Commands::Summary { .. } => dispatch_read_ops(&config, cli.command),
    }
}

fn dispatch_write_ops(config: &Config, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Init => handlers::init::handle(config),
        Commands::Add {
            wbs,
            name,
            start,
            end,
            progress,
            priority,
            deps,
            desc,
            color,
        } => handlers::add::handle(
            config,
            handlers::add::AddArgs {
                wbs,
                name,
                start,
                end,
                progress,
                priority,
                deps,
                desc,
                color,
            },
        ),
        Commands::Edit {
            task,
            wbs,
            name,
            start,
            end,
            progress,
            priority,
            deps,
            desc,
            color,
        } => handlers::edit::handle(
            config,
            &task,
            handlers::edit::EditArgs {
                wbs,
                name,
                start,
                end,
                progress,
                priority,
                deps,
                desc,
                color,
            },
        ),
        Commands::Rm { task } => handlers::rm::handle(config, &task),
        Commands::Seed => handlers::seed::handle(config),
        Commands::Refresh => handlers::refresh::handle(config),
        _ => unreachable!("Invalid write command dispatch"),
    }
}

fn dispatch_read_ops(config: &Config, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::List { root, json } => handlers::list::handle(config, root.as_ref(), json),
        Commands::Show { task, json } => handlers::show::handle(config, &task, json),
        Commands::Chart { root, json } => handlers::chart::handle(config, root.as_ref(), json),
        Commands::Summary { root, json } => handlers::summary::handle(config, &root, json),
        _ => unreachable!("Invalid read command dispatch"),
    }
}
