#![forbid(unsafe_code)]

use crate::StoreError;
use dispatch_core::{
    IntentOp, IntentSeq, NewIntent, PendingIntent, SyncOperation, Task, TaskId, Timestamp,
};
use rusqlite::{Connection, params};
use std::collections::BTreeSet;

pub(crate) fn append_intent(
    conn: &Connection,
    intent: NewIntent,
) -> Result<PendingIntent, StoreError> {
    let payload_json = match intent.op.payload() {
        Some(task) => Some(
            serde_json::to_string(task)
                .map_err(|err| StoreError::corrupt("pending_sync", &intent.task_id, err))?,
        ),
        None => None,
    };

    conn.execute(
        r#"
        INSERT INTO pending_sync(task_id, operation, payload_json, enqueued_at)
        VALUES (?1, ?2, ?3, ?4)
        "#,
        params![
            intent.task_id.as_str(),
            intent.op.operation().as_str(),
            payload_json,
            intent.enqueued_at.as_str(),
        ],
    )?;
    let seq = IntentSeq::new(conn.last_insert_rowid());

    Ok(PendingIntent {
        seq,
        task_id: intent.task_id,
        op: intent.op,
        enqueued_at: intent.enqueued_at,
    })
}

pub(crate) fn list_intents(conn: &Connection) -> Result<Vec<PendingIntent>, StoreError> {
    let mut stmt = conn.prepare(
        r#"
        SELECT seq, task_id, operation, payload_json, enqueued_at
        FROM pending_sync
        ORDER BY seq ASC
        "#,
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, Option<String>>(3)?,
            row.get::<_, String>(4)?,
        ))
    })?;

    let mut out = Vec::new();
    for row in rows {
        let (seq, task_id, operation, payload_json, enqueued_at) = row?;
        out.push(decode_intent(seq, task_id, &operation, payload_json, enqueued_at)?);
    }
    Ok(out)
}

pub(crate) fn remove_intent(conn: &Connection, seq: IntentSeq) -> Result<bool, StoreError> {
    let deleted = conn.execute("DELETE FROM pending_sync WHERE seq = ?1", params![seq.get()])?;
    Ok(deleted > 0)
}

pub(crate) fn pending_task_ids(conn: &Connection) -> Result<BTreeSet<TaskId>, StoreError> {
    let mut stmt = conn.prepare("SELECT DISTINCT task_id FROM pending_sync")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    let mut out = BTreeSet::new();
    for row in rows {
        let raw = row?;
        let id = TaskId::try_new(raw.clone())
            .map_err(|err| StoreError::corrupt("pending_sync", &raw, err))?;
        out.insert(id);
    }
    Ok(out)
}

fn decode_intent(
    seq: i64,
    task_id: String,
    operation: &str,
    payload_json: Option<String>,
    enqueued_at: String,
) -> Result<PendingIntent, StoreError> {
    let key = format!("seq={seq}");
    let task_id =
        TaskId::try_new(task_id).map_err(|err| StoreError::corrupt("pending_sync", &key, err))?;
    let operation = operation
        .parse::<SyncOperation>()
        .map_err(|err| StoreError::corrupt("pending_sync", &key, err))?;

    let payload = payload_json
        .map(|json| serde_json::from_str::<Task>(&json))
        .transpose()
        .map_err(|err| StoreError::corrupt("pending_sync", &key, err))?;

    let op = match (operation, payload) {
        (SyncOperation::Create, Some(task)) => IntentOp::Create(task),
        (SyncOperation::Update, Some(task)) => IntentOp::Update(task),
        (SyncOperation::Delete, _) => IntentOp::Delete,
        (operation, None) => {
            return Err(StoreError::corrupt(
                "pending_sync",
                &key,
                format!("{operation} intent without payload"),
            ));
        }
    };

    Ok(PendingIntent {
        seq: IntentSeq::new(seq),
        task_id,
        op,
        enqueued_at: Timestamp::from_raw(enqueued_at),
    })
}
