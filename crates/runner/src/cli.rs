#![forbid(unsafe_code)]

use clap::{Args, Parser, Subcommand};
use dispatch_core::{SortField, TaskId, TaskIdError, TaskStatus, TaskType};
use std::path::PathBuf;

pub(crate) const DEFAULT_STORAGE_DIR: &str = ".dispatch";
pub(crate) const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub(crate) const DEFAULT_WATCH_INTERVAL_S: u64 = 30;

#[derive(Debug, Parser)]
#[command(name = "dispatch")]
#[command(about = "Local-first task tracker with offline sync to a spreadsheet")]
#[command(version)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Debug, Args)]
pub(crate) struct GlobalArgs {
    /// Directory holding dispatch.db
    #[arg(long, global = true, env = "DISPATCH_STORAGE_DIR", default_value = DEFAULT_STORAGE_DIR)]
    pub storage_dir: PathBuf,

    /// Remote API base url; overrides the stored one for this run
    #[arg(long, global = true, env = "DISPATCH_BASE_URL")]
    pub base_url: Option<String>,

    /// Spreadsheet id; overrides the stored one for this run
    #[arg(long, global = true, env = "DISPATCH_SPREADSHEET_ID")]
    pub spreadsheet_id: Option<String>,

    /// Sheet (tab) holding the task rows
    #[arg(long, global = true, env = "DISPATCH_SHEET_NAME")]
    pub sheet_name: Option<String>,

    /// Per-request timeout for remote calls
    #[arg(long, global = true, env = "DISPATCH_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Create a task locally and queue it for sync
    Add(AddArgs),
    /// Change fields of an existing task
    Edit(EditArgs),
    /// Delete a task
    Rm {
        #[arg(value_parser = parse_task_id)]
        id: TaskId,
    },
    /// Print one task
    Show {
        #[arg(value_parser = parse_task_id)]
        id: TaskId,
    },
    /// List tasks with optional filters
    List(ListArgs),
    /// Print the pending-sync queue in replay order
    Pending,
    /// Run one push-then-pull cycle
    Sync,
    /// Run a cycle now and then on every tick
    Watch(WatchArgs),
    /// Manage the remote endpoint
    #[command(subcommand)]
    Remote(RemoteCommand),
    /// Probe the configured remote
    Health,
}

#[derive(Debug, Args)]
pub(crate) struct AddArgs {
    /// Task name
    pub name: String,

    /// Explicit id; a random one is generated otherwise
    #[arg(long, value_parser = parse_task_id)]
    pub id: Option<TaskId>,

    #[arg(long = "type", default_value = "one-shot")]
    pub task_type: TaskType,

    #[arg(long, default_value = "Scheduled")]
    pub status: TaskStatus,

    #[arg(long, default_value = "")]
    pub schedule: String,

    #[arg(long, default_value = "")]
    pub description: String,

    #[arg(long, default_value = "")]
    pub next_run: String,
}

#[derive(Debug, Args)]
pub(crate) struct EditArgs {
    #[arg(value_parser = parse_task_id)]
    pub id: TaskId,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub status: Option<TaskStatus>,

    #[arg(long)]
    pub schedule: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub next_run: Option<String>,

    #[arg(long)]
    pub last_run: Option<String>,

    #[arg(long)]
    pub last_result: Option<String>,
}

#[derive(Debug, Args)]
pub(crate) struct ListArgs {
    #[arg(long = "type")]
    pub task_type: Option<TaskType>,

    #[arg(long)]
    pub status: Option<TaskStatus>,

    /// Case-insensitive match on name and description
    #[arg(long)]
    pub search: Option<String>,

    /// nextRun, name, createdAt or status
    #[arg(long, default_value = "nextRun")]
    pub sort: SortField,

    #[arg(long)]
    pub desc: bool,
}

#[derive(Debug, Args)]
pub(crate) struct WatchArgs {
    #[arg(
        long,
        default_value_t = DEFAULT_WATCH_INTERVAL_S,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval_s: u64,

    /// Stop after this many cycles
    #[arg(long)]
    pub max_cycles: Option<u64>,
}

#[derive(Debug, Subcommand)]
pub(crate) enum RemoteCommand {
    /// Store a remote endpoint after a successful health check
    Set {
        base_url: String,
        spreadsheet_id: String,
    },
    /// Print the stored endpoint
    Show,
    /// Forget the stored endpoint; sync becomes a no-op
    Clear,
}

fn parse_task_id(raw: &str) -> Result<TaskId, TaskIdError> {
    TaskId::try_new(raw)
}
