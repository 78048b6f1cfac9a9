#![forbid(unsafe_code)]

mod support;

use dispatch_core::{IntentOp, NewTask, SyncOperation, TaskPatch, TaskStatus};
use dispatch_storage::LocalStore;
use dispatch_sync::{
    ConfigError, RemoteConfig, RemoteError, SyncConfig, TaskError, connect_remote, create_task,
    delete_task, update_task,
};
use std::time::Duration;
use support::{Call, MemorySheet, id, open_store, ts};

#[test]
fn create_stamps_both_timestamps_and_enqueues_the_snapshot() {
    let (_dir, mut store) = open_store();
    let now = ts("2024-05-01T08:00:00Z");

    let task = create_task(&mut store, NewTask::named("Rotate logs"), now.clone()).expect("create");
    assert!(!task.id.as_str().is_empty());
    assert_eq!(task.created_at, now);
    assert_eq!(task.updated_at, now);
    assert_eq!(store.get_task(&task.id).expect("get"), Some(task.clone()));

    let queue = store.queue_list().expect("queue");
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].task_id, task.id);
    assert_eq!(queue[0].op, IntentOp::Create(task));
    assert_eq!(queue[0].enqueued_at, now);
}

#[test]
fn create_rejects_blank_names_and_taken_ids() {
    let (_dir, mut store) = open_store();

    let err = create_task(&mut store, NewTask::named("   "), ts("2024-05-01T08:00:00Z"))
        .expect_err("blank name");
    assert!(matches!(err, TaskError::EmptyName));

    let first = NewTask {
        id: Some(id("t1")),
        ..NewTask::named("First")
    };
    create_task(&mut store, first.clone(), ts("2024-05-01T08:00:00Z")).expect("first");
    let err = create_task(&mut store, first, ts("2024-05-01T08:01:00Z")).expect_err("dup");
    assert!(matches!(err, TaskError::DuplicateId(dup) if dup == id("t1")));
    assert_eq!(store.queue_list().expect("queue").len(), 1);
}

#[test]
fn update_touches_only_patched_fields() {
    let (_dir, mut store) = open_store();
    let created = create_task(
        &mut store,
        NewTask {
            schedule: "0 3 * * *".to_string(),
            ..NewTask::named("Nightly")
        },
        ts("2024-05-01T08:00:00Z"),
    )
    .expect("create");

    let updated = update_task(
        &mut store,
        &created.id,
        TaskPatch {
            status: Some(TaskStatus::Paused),
            ..TaskPatch::default()
        },
        ts("2024-05-02T08:00:00Z"),
    )
    .expect("update");

    assert_eq!(updated.status, TaskStatus::Paused);
    assert_eq!(updated.schedule, "0 3 * * *");
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.updated_at, ts("2024-05-02T08:00:00Z"));

    let ops = store
        .queue_list()
        .expect("queue")
        .iter()
        .map(|intent| intent.operation())
        .collect::<Vec<_>>();
    assert_eq!(ops, vec![SyncOperation::Create, SyncOperation::Update]);
}

#[test]
fn update_rejects_empty_patches_and_unknown_ids() {
    let (_dir, mut store) = open_store();
    let created = create_task(&mut store, NewTask::named("Nightly"), ts("2024-05-01T08:00:00Z"))
        .expect("create");

    let err = update_task(
        &mut store,
        &created.id,
        TaskPatch::default(),
        ts("2024-05-02T00:00:00Z"),
    )
    .expect_err("empty patch");
    assert!(matches!(err, TaskError::EmptyPatch));

    let rename_blank = TaskPatch {
        name: Some(" ".to_string()),
        ..TaskPatch::default()
    };
    let err = update_task(&mut store, &created.id, rename_blank, ts("2024-05-02T00:00:00Z"))
        .expect_err("blank rename");
    assert!(matches!(err, TaskError::EmptyName));

    let err = update_task(
        &mut store,
        &id("missing"),
        TaskPatch {
            status: Some(TaskStatus::Done),
            ..TaskPatch::default()
        },
        ts("2024-05-02T00:00:00Z"),
    )
    .expect_err("unknown");
    assert!(matches!(err, TaskError::UnknownTask(_)));
    assert_eq!(store.queue_list().expect("queue").len(), 1);
}

#[test]
fn delete_removes_locally_and_enqueues_a_bare_intent() {
    let (_dir, mut store) = open_store();
    let created = create_task(&mut store, NewTask::named("Nightly"), ts("2024-05-01T08:00:00Z"))
        .expect("create");

    delete_task(&mut store, &created.id, ts("2024-05-03T00:00:00Z")).expect("delete");
    assert_eq!(store.get_task(&created.id).expect("get"), None);

    let queue = store.queue_list().expect("queue");
    assert_eq!(queue.len(), 2);
    assert_eq!(queue[1].op, IntentOp::Delete);
    assert_eq!(queue[1].task_id, created.id);

    let err = delete_task(&mut store, &created.id, ts("2024-05-03T00:01:00Z")).expect_err("twice");
    assert!(matches!(err, TaskError::UnknownTask(_)));
}

#[test]
fn remote_config_is_validated_and_normalized() {
    let remote = RemoteConfig::new(" https://sheets.example.test/api/ ", "abc123").expect("valid");
    assert_eq!(remote.base_url(), "https://sheets.example.test/api");
    assert_eq!(remote.sheet_name(), "Cron");

    assert!(matches!(RemoteConfig::new("", "abc"), Err(ConfigError::EmptyBaseUrl)));
    assert!(matches!(
        RemoteConfig::new("ftp://host", "abc"),
        Err(ConfigError::UnsupportedScheme)
    ));
    assert!(matches!(
        RemoteConfig::new("http://host", " "),
        Err(ConfigError::EmptySpreadsheetId)
    ));
    assert!(matches!(
        RemoteConfig::new("http://host", "a/b"),
        Err(ConfigError::InvalidSpreadsheetId)
    ));
    assert!(matches!(
        remote.clone().with_timeout(Duration::ZERO),
        Err(ConfigError::ZeroTimeout)
    ));
}

#[test]
fn healthy_remote_is_persisted() {
    let (_dir, mut store) = open_store();
    let sheet = MemorySheet::new();
    let remote = RemoteConfig::new("http://localhost:8080", "sheet-1").expect("config");

    assert!(!SyncConfig::load(&store).expect("load").is_configured());
    let health = connect_remote(&mut store, &remote, |_| &sheet).expect("connect");
    assert!(health.is_ok());
    assert_eq!(sheet.calls(), vec![Call::Health]);

    let loaded = SyncConfig::load(&store).expect("load");
    assert_eq!(loaded.remote(), Some(&remote));
}

#[test]
fn unhealthy_remote_is_rolled_back_to_nothing() {
    let (_dir, mut store) = open_store();
    let sheet = MemorySheet::new();
    sheet.set_health("degraded");
    let remote = RemoteConfig::new("http://localhost:8080", "sheet-1").expect("config");

    let err = connect_remote(&mut store, &remote, |_| &sheet).expect_err("unhealthy");
    assert!(matches!(err, ConfigError::Unhealthy(status) if status == "degraded"));
    assert_eq!(SyncConfig::load(&store).expect("load"), SyncConfig::disabled());
}

#[test]
fn unreachable_remote_keeps_the_previous_endpoint() {
    let (_dir, mut store) = open_store();
    let working = RemoteConfig::new("http://localhost:8080", "sheet-1").expect("config");
    SyncConfig::save(&mut store, &working).expect("save");

    let sheet = MemorySheet::new();
    sheet.fail_all(RemoteError::Timeout);
    let typo = RemoteConfig::new("http://localhost:8081", "sheet-1").expect("config");

    let err = connect_remote(&mut store, &typo, |_| &sheet).expect_err("unreachable");
    assert!(matches!(err, ConfigError::Unreachable(RemoteError::Timeout)));
    assert_eq!(
        SyncConfig::load(&store).expect("load"),
        SyncConfig::with_remote(working)
    );
}

#[test]
fn clearing_the_remote_disables_sync() {
    let (_dir, mut store) = open_store();
    let remote = RemoteConfig::new("http://localhost:8080", "sheet-1").expect("config");
    SyncConfig::save(&mut store, &remote).expect("save");

    assert!(SyncConfig::clear(&mut store).expect("clear"));
    assert!(!SyncConfig::clear(&mut store).expect("clear again"));
    assert!(!SyncConfig::load(&store).expect("load").is_configured());
}
