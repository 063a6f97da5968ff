//! Command-line interface for dtt
//!
//! This module defines the CLI structure using clap derive macros.
//! Each group of subcommands is implemented in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::Result;
use crate::store::TaskStore;

mod init;
mod remind;
mod task;

/// dtt - Daily Task Tracker
///
/// Record tasks with a date, description, status and deadline in a CSV file,
/// and send a daily email reminder to update them.
#[derive(Parser, Debug)]
#[command(name = "dtt")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Project directory holding .dtt.toml (defaults to current directory)
    #[arg(long, global = true, env = "DTT_DIR")]
    pub dir: Option<PathBuf>,

    /// Data file (overrides store.path from .dtt.toml)
    #[arg(long, global = true, env = "DTT_FILE")]
    pub file: Option<PathBuf>,

    /// Active user (one of the configured names)
    #[arg(long, global = true, env = "DTT_USER")]
    pub user: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug) logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write default .dtt.toml and create the data file with its header
    Init,

    /// Add a task, or update status/deadline of the same (user, date, task)
    Add {
        /// Task description
        description: String,

        /// Task date, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,

        /// Status: "Yet to Start", "In Progress", "Completed"
        #[arg(long, default_value = "Yet to Start")]
        status: String,

        /// Deadline, YYYY-MM-DD (default: today)
        #[arg(long)]
        deadline: Option<String>,
    },

    /// Show tasks sorted by date and deadline
    List {
        /// Show every user's tasks
        #[arg(long)]
        all: bool,
    },

    /// Write the task view as CSV
    Export {
        /// Export every user's tasks
        #[arg(long)]
        all: bool,

        /// Destination file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace the user's tasks (or all tasks) with the rows of a CSV file
    Import {
        /// CSV file with a user,date,task,status,deadline header
        #[arg(value_name = "FILE")]
        source: PathBuf,

        /// Replace the whole table instead of the active user's rows
        #[arg(long)]
        all: bool,
    },

    /// Edit the task view in $VISUAL/$EDITOR and save the result
    Edit {
        /// Edit every user's tasks
        #[arg(long)]
        all: bool,
    },

    /// List the configured users
    Users,

    /// Interactive task board with a user sidebar
    Board,

    /// Send the reminder email now
    Remind,

    /// Send the reminder every day at a fixed time (runs until killed)
    Schedule {
        /// Time of day, HH:MM (default: reminder.at)
        #[arg(long)]
        at: Option<String>,

        /// Polling interval in seconds (default: reminder.poll_secs)
        #[arg(long)]
        poll_secs: Option<u64>,
    },
}

impl Commands {
    /// Name reported in the JSON envelope's `command` field
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Init => "init",
            Commands::Add { .. } => "add",
            Commands::List { .. } => "list",
            Commands::Export { .. } => "export",
            Commands::Import { .. } => "import",
            Commands::Edit { .. } => "edit",
            Commands::Users => "users",
            Commands::Board => "board",
            Commands::Remind => "remind",
            Commands::Schedule { .. } => "schedule",
        }
    }
}

/// Resolved project directory, config and store for one invocation
pub(crate) struct Context {
    pub dir: PathBuf,
    pub config: Config,
    pub store: TaskStore,
}

pub(crate) fn load_context(dir: Option<PathBuf>, file: Option<PathBuf>) -> Result<Context> {
    let dir = match dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let config = Config::load_from_dir(&dir)?;
    let path = file.unwrap_or_else(|| config.store_path(&dir));
    Ok(Context {
        dir,
        config,
        store: TaskStore::new(path),
    })
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => init::run(init::InitOptions {
                dir: self.dir,
                file: self.file,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Add {
                description,
                date,
                status,
                deadline,
            } => task::run_add(task::AddOptions {
                description,
                date,
                status,
                deadline,
                user: self.user,
                dir: self.dir,
                file: self.file,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::List { all } => task::run_list(task::ListOptions {
                all,
                user: self.user,
                dir: self.dir,
                file: self.file,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Export { all, output } => task::run_export(task::ExportOptions {
                all,
                output,
                user: self.user,
                dir: self.dir,
                file: self.file,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Import { source, all } => task::run_import(task::ImportOptions {
                source,
                all,
                user: self.user,
                dir: self.dir,
                file: self.file,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Edit { all } => task::run_edit(task::EditOptions {
                all,
                user: self.user,
                dir: self.dir,
                file: self.file,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Users => task::run_users(task::UsersOptions {
                user: self.user,
                dir: self.dir,
                file: self.file,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Board => {
                let ctx = load_context(self.dir, self.file)?;
                let user = crate::user::resolve_user(&ctx.config.users, self.user.as_deref())?;
                crate::ui::board::run(ctx.store, ctx.config.users, user)
            }
            Commands::Remind => remind::run_remind(remind::RemindOptions {
                dir: self.dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Schedule { at, poll_secs } => {
                remind::run_schedule(remind::ScheduleOptions {
                    at,
                    poll_secs,
                    dir: self.dir,
                    json: self.json,
                    quiet: self.quiet,
                })
            }
        }
    }
}
