#![forbid(unsafe_code)]

use crate::StoreError;
use rusqlite::{Connection, params};

const SCHEMA_VERSION: &str = "v1";

pub(crate) fn migrate_sqlite_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode=WAL;
        PRAGMA synchronous=NORMAL;

        CREATE TABLE IF NOT EXISTS meta (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tasks (
          id TEXT PRIMARY KEY,
          name TEXT NOT NULL,
          type TEXT NOT NULL,
          status TEXT NOT NULL,
          schedule TEXT NOT NULL DEFAULT '',
          description TEXT NOT NULL DEFAULT '',
          next_run TEXT NOT NULL DEFAULT '',
          last_run TEXT NOT NULL DEFAULT '',
          last_result TEXT NOT NULL DEFAULT '',
          created_at TEXT NOT NULL,
          updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS pending_sync (
          seq INTEGER PRIMARY KEY AUTOINCREMENT,
          task_id TEXT NOT NULL,
          operation TEXT NOT NULL CHECK (operation IN ('create', 'update', 'delete')),
          payload_json TEXT,
          enqueued_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_tasks_next_run ON tasks(next_run);
        CREATE INDEX IF NOT EXISTS idx_pending_sync_task ON pending_sync(task_id, seq);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO meta(key, value) VALUES (?1, ?2)",
        params!["schema_version", SCHEMA_VERSION],
    )?;

    Ok(())
}
