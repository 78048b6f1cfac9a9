#![forbid(unsafe_code)]

use crate::cli::{AddArgs, Cli, Command, EditArgs, GlobalArgs, ListArgs, RemoteCommand, WatchArgs};
use crate::error::RunnerError;
use crate::render::{cycle_json, intent_json, remote_json};
use crate::settings::{apply_overrides, resolve_sync_config};
use dispatch_core::{NewTask, SortDirection, TaskPatch, TaskQuery, Timestamp};
use dispatch_storage::{LocalStore, SqliteStore};
use dispatch_sync::{
    ConfigError, RemoteConfig, RemoteSheet, SheetsDbClient, SyncConfig, SyncEngine,
    connect_remote, create_task, delete_task, update_task,
};
use serde::Serialize;
use serde_json::json;
use std::io::Write;
use std::thread::sleep;
use std::time::Duration;

pub(crate) fn execute(cli: Cli, out: &mut impl Write) -> Result<(), RunnerError> {
    let Cli { global, command } = cli;
    let mut store = SqliteStore::open(&global.storage_dir)?;

    match command {
        Command::Add(args) => add(&mut store, args, out),
        Command::Edit(args) => edit(&mut store, args, out),
        Command::Rm { id } => {
            delete_task(&mut store, &id, Timestamp::now())?;
            write_json(out, &json!({ "deleted": id.as_str() }))
        }
        Command::Show { id } => {
            let task = store.get_task(&id)?.ok_or(RunnerError::NotFound(id))?;
            write_json(out, &task)
        }
        Command::List(args) => list(&store, args, out),
        Command::Pending => {
            let pending = store
                .queue_list()?
                .iter()
                .map(intent_json)
                .collect::<Vec<_>>();
            write_json(out, &pending)
        }
        Command::Sync => {
            let config = resolve_sync_config(&store, &global)?;
            let outcome = SyncEngine::from_config(&config).run_cycle(&mut store)?;
            write_json(out, &cycle_json(&outcome))
        }
        Command::Watch(args) => {
            let config = resolve_sync_config(&store, &global)?;
            watch(&mut store, &config, &args, out)
        }
        Command::Remote(remote) => remote_command(&mut store, &global, remote, out),
        Command::Health => {
            let config = resolve_sync_config(&store, &global)?;
            let remote = config.remote().ok_or(RunnerError::NotConfigured)?;
            let health = SheetsDbClient::new(remote).health_check()?;
            write_json(out, &json!({ "status": health.status, "ok": health.is_ok() }))?;
            if health.is_ok() {
                Ok(())
            } else {
                Err(ConfigError::Unhealthy(health.status).into())
            }
        }
    }
}

fn add(store: &mut SqliteStore, args: AddArgs, out: &mut impl Write) -> Result<(), RunnerError> {
    let new_task = NewTask {
        id: args.id,
        name: args.name,
        task_type: args.task_type,
        status: args.status,
        schedule: args.schedule,
        description: args.description,
        next_run: args.next_run,
        ..NewTask::default()
    };
    let task = create_task(store, new_task, Timestamp::now())?;
    write_json(out, &task)
}

fn edit(store: &mut SqliteStore, args: EditArgs, out: &mut impl Write) -> Result<(), RunnerError> {
    let patch = TaskPatch {
        name: args.name,
        status: args.status,
        schedule: args.schedule,
        description: args.description,
        next_run: args.next_run,
        last_run: args.last_run,
        last_result: args.last_result,
    };
    let task = update_task(store, &args.id, patch, Timestamp::now())?;
    write_json(out, &task)
}

fn list(store: &SqliteStore, args: ListArgs, out: &mut impl Write) -> Result<(), RunnerError> {
    let query = TaskQuery {
        task_type: args.task_type,
        status: args.status,
        search: args.search,
        sort: args.sort,
        direction: if args.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        },
    };
    let tasks = query.apply(&store.list_tasks()?);
    write_json(out, &tasks)
}

fn watch(
    store: &mut SqliteStore,
    config: &SyncConfig,
    args: &WatchArgs,
    out: &mut impl Write,
) -> Result<(), RunnerError> {
    let engine = SyncEngine::from_config(config);
    if !engine.is_configured() {
        tracing::warn!("no remote configured; cycles only read local state");
    }
    let interval = Duration::from_secs(args.interval_s);
    tracing::info!(interval_s = args.interval_s, "watching");

    let mut cycles = 0u64;
    loop {
        match engine.run_cycle(store) {
            Ok(outcome) => {
                serde_json::to_writer(&mut *out, &cycle_json(&outcome))?;
                writeln!(out)?;
                out.flush()?;
            }
            Err(err) => tracing::error!(error = %err, "sync cycle failed"),
        }
        cycles += 1;
        if args.max_cycles.is_some_and(|max| cycles >= max) {
            return Ok(());
        }
        sleep(interval);
    }
}

fn remote_command(
    store: &mut SqliteStore,
    global: &GlobalArgs,
    command: RemoteCommand,
    out: &mut impl Write,
) -> Result<(), RunnerError> {
    match command {
        RemoteCommand::Set {
            base_url,
            spreadsheet_id,
        } => {
            let remote = apply_overrides(RemoteConfig::new(base_url, spreadsheet_id)?, global)?;
            let health = connect_remote(store, &remote, SheetsDbClient::new)?;
            let mut shown = remote_json(Some(&remote));
            shown["health"] = json!(health.status);
            write_json(out, &shown)
        }
        RemoteCommand::Show => {
            let config = resolve_sync_config(store, global)?;
            write_json(out, &remote_json(config.remote()))
        }
        RemoteCommand::Clear => {
            let cleared = SyncConfig::clear(store)?;
            write_json(out, &json!({ "cleared": cleared }))
        }
    }
}

pub(crate) fn write_json<T: Serialize + ?Sized>(
    out: &mut impl Write,
    value: &T,
) -> Result<(), RunnerError> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
