#![forbid(unsafe_code)]

use dispatch_core::{
    IntentOp, NewIntent, NewTask, SyncOperation, Task, TaskId, TaskStatus, TaskType, Timestamp,
};
use dispatch_storage::{LocalMutation, LocalStore, RemoteConfigRecord, SqliteStore, StoreError};
use rusqlite::{Connection, params};

fn task(id: &str, name: &str, updated_at: &str) -> Task {
    let mut task = NewTask {
        name: name.to_string(),
        task_type: TaskType::Recurring,
        status: TaskStatus::Scheduled,
        schedule: "0 3 * * *".to_string(),
        ..NewTask::default()
    }
    .into_task(
        TaskId::try_new(id).expect("task id"),
        Timestamp::from("2024-01-01T00:00:00Z"),
    );
    task.updated_at = Timestamp::from(updated_at);
    task
}

fn intent(task: &Task, op: IntentOp) -> NewIntent {
    NewIntent {
        task_id: task.id.clone(),
        op,
        enqueued_at: Timestamp::from("2024-01-01T00:00:01Z"),
    }
}

#[test]
fn tasks_round_trip_through_sqlite() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut store = SqliteStore::open(dir.path()).expect("open store");

    let mut backup = task("t1", "Backup", "2024-01-01T00:00:00Z");
    backup.description = "nightly".to_string();
    backup.status = TaskStatus::InProgress;
    store.put_task(&backup).expect("put task");

    let loaded = store.get_task(&backup.id).expect("get task");
    assert_eq!(loaded, Some(backup.clone()));

    backup.name = "Backup v2".to_string();
    backup.updated_at = Timestamp::from("2024-01-02T00:00:00Z");
    store.put_task(&backup).expect("overwrite task");
    assert_eq!(store.list_tasks().expect("list tasks"), vec![backup.clone()]);

    assert!(store.delete_task(&backup.id).expect("delete task"));
    assert!(!store.delete_task(&backup.id).expect("delete missing task"));
    assert_eq!(store.get_task(&backup.id).expect("get deleted"), None);
}

#[test]
fn queue_lists_in_sequence_order_and_keeps_duplicates() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut store = SqliteStore::open(dir.path()).expect("open store");

    let v1 = task("t1", "v1", "2024-01-01T00:00:01Z");
    let v2 = task("t1", "v2", "2024-01-01T00:00:02Z");
    let first = store
        .queue_append(intent(&v1, IntentOp::Update(v1.clone())))
        .expect("append update v1");
    let second = store
        .queue_append(intent(&v2, IntentOp::Update(v2.clone())))
        .expect("append update v2");
    let third = store
        .queue_append(intent(&v2, IntentOp::Delete))
        .expect("append delete");

    assert!(first.seq < second.seq && second.seq < third.seq);

    let pending = store.queue_list().expect("list queue");
    let ops = pending
        .iter()
        .map(|intent| (intent.seq, intent.operation()))
        .collect::<Vec<_>>();
    assert_eq!(
        ops,
        vec![
            (first.seq, SyncOperation::Update),
            (second.seq, SyncOperation::Update),
            (third.seq, SyncOperation::Delete),
        ]
    );
    assert_eq!(pending[0].op, IntentOp::Update(v1));
    assert_eq!(pending[1].op, IntentOp::Update(v2));
    assert_eq!(pending[2].op.payload(), None);
}

#[test]
fn sequence_numbers_are_never_reused_after_removal_or_restart() {
    let dir = tempfile::tempdir().expect("temp dir");
    let t1 = task("t1", "Backup", "2024-01-01T00:00:00Z");

    let last_seq = {
        let mut store = SqliteStore::open(dir.path()).expect("open store");
        let a = store
            .queue_append(intent(&t1, IntentOp::Create(t1.clone())))
            .expect("append a");
        let b = store
            .queue_append(intent(&t1, IntentOp::Delete))
            .expect("append b");
        assert!(store.queue_remove(b.seq).expect("remove b"));
        assert!(!store.queue_remove(b.seq).expect("remove b twice"));
        assert!(store.queue_remove(a.seq).expect("remove a"));
        assert!(store.queue_list().expect("list").is_empty());
        b.seq
    };

    let mut reopened = SqliteStore::open(dir.path()).expect("reopen store");
    let c = reopened
        .queue_append(intent(&t1, IntentOp::Delete))
        .expect("append c");
    assert!(c.seq > last_seq, "seq {} must exceed {}", c.seq, last_seq);
}

#[test]
fn queue_survives_reopen() {
    let dir = tempfile::tempdir().expect("temp dir");
    let t1 = task("t1", "Backup", "2024-01-01T00:00:00Z");
    {
        let mut store = SqliteStore::open(dir.path()).expect("open store");
        store
            .commit_mutation(LocalMutation::Create(&t1), &Timestamp::from("2024-01-01T00:00:00Z"))
            .expect("commit create");
    }

    let reopened = SqliteStore::open(dir.path()).expect("reopen store");
    let pending = reopened.queue_list().expect("list queue");
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].op, IntentOp::Create(t1.clone()));
    assert_eq!(pending[0].enqueued_at.as_str(), "2024-01-01T00:00:00Z");
    assert_eq!(reopened.get_task(&t1.id).expect("get"), Some(t1));
}

#[test]
fn commit_mutation_writes_task_and_intent_together() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut store = SqliteStore::open(dir.path()).expect("open store");
    let t1 = task("t1", "Backup", "2024-01-01T00:00:00Z");
    let now = Timestamp::from("2024-01-01T00:00:00Z");

    store
        .commit_mutation(LocalMutation::Create(&t1), &now)
        .expect("commit create");
    store
        .commit_mutation(LocalMutation::Delete(&t1.id), &now)
        .expect("commit delete");

    assert_eq!(store.get_task(&t1.id).expect("get"), None);
    let ops = store
        .queue_list()
        .expect("list")
        .into_iter()
        .map(|intent| intent.operation())
        .collect::<Vec<_>>();
    assert_eq!(ops, vec![SyncOperation::Create, SyncOperation::Delete]);
    assert_eq!(
        store.pending_task_ids().expect("pending ids").into_iter().collect::<Vec<_>>(),
        vec![t1.id.clone()]
    );
}

#[test]
fn failed_commit_leaves_no_intent_behind() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut store = SqliteStore::open(dir.path()).expect("open store");

    let blocker = Connection::open(dir.path().join("dispatch.db")).expect("open raw connection");
    blocker
        .execute_batch(
            "CREATE TRIGGER reject_tasks BEFORE INSERT ON tasks \
             BEGIN SELECT RAISE(ABORT, 'disk says no'); END;",
        )
        .expect("install trigger");

    let t1 = task("t1", "Backup", "2024-01-01T00:00:00Z");
    let err = store
        .commit_mutation(LocalMutation::Create(&t1), &Timestamp::from("2024-01-01T00:00:00Z"))
        .expect_err("insert must fail");
    assert_eq!(err.code(), "SQLITE");
    assert!(store.queue_list().expect("list").is_empty());
    assert_eq!(store.get_task(&t1.id).expect("get"), None);
}

#[test]
fn corrupt_queue_rows_are_reported_not_skipped() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = SqliteStore::open(dir.path()).expect("open store");

    let raw = Connection::open(dir.path().join("dispatch.db")).expect("open raw connection");
    raw.execute(
        "INSERT INTO pending_sync(task_id, operation, payload_json, enqueued_at) \
         VALUES (?1, ?2, NULL, ?3)",
        params!["t1", "update", "2024-01-01T00:00:00Z"],
    )
    .expect("insert corrupt row");

    let err = store.queue_list().expect_err("update without payload is corrupt");
    assert!(matches!(err, StoreError::CorruptRow { table: "pending_sync", .. }));
}

#[test]
fn remote_config_persists_and_clears() {
    let dir = tempfile::tempdir().expect("temp dir");
    let record = RemoteConfigRecord {
        base_url: "https://sheets.example.test".to_string(),
        spreadsheet_id: "sheet-123".to_string(),
    };
    {
        let mut store = SqliteStore::open(dir.path()).expect("open store");
        assert_eq!(store.remote_config_get().expect("get"), None);
        store.remote_config_set(&record).expect("set");
    }

    let mut store = SqliteStore::open(dir.path()).expect("reopen store");
    assert_eq!(store.remote_config_get().expect("get"), Some(record));
    assert!(store.remote_config_clear().expect("clear"));
    assert!(!store.remote_config_clear().expect("clear twice"));
    assert_eq!(store.remote_config_get().expect("get"), None);

    let err = store
        .remote_config_set(&RemoteConfigRecord {
            base_url: " ".to_string(),
            spreadsheet_id: "x".to_string(),
        })
        .expect_err("blank base url rejected");
    assert!(matches!(err, StoreError::InvalidInput(_)));
}
