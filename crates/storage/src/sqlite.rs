#![forbid(unsafe_code)]

use crate::local::{LocalMutation, LocalStore};
use crate::schema::migrate_sqlite_schema;
use crate::{StoreError, queue, tasks};
use dispatch_core::{IntentSeq, NewIntent, PendingIntent, Task, TaskId, Timestamp};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DB_FILE_NAME: &str = "dispatch.db";
const META_REMOTE_BASE_URL: &str = "remote.base_url";
const META_REMOTE_SPREADSHEET_ID: &str = "remote.spreadsheet_id";

/// Persisted remote endpoint, stored verbatim. Validation happens where it is used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteConfigRecord {
    pub base_url: String,
    pub spreadsheet_id: String,
}

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    storage_dir: PathBuf,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let db_path = storage_dir.join(DB_FILE_NAME);
        let conn = Connection::open(&db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        migrate_sqlite_schema(&conn)?;

        tracing::debug!(db = %db_path.display(), "opened local store");
        Ok(Self { conn, storage_dir })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn meta_get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT value FROM meta WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?)
    }

    pub fn remote_config_get(&self) -> Result<Option<RemoteConfigRecord>, StoreError> {
        let base_url = self.meta_get(META_REMOTE_BASE_URL)?;
        let spreadsheet_id = self.meta_get(META_REMOTE_SPREADSHEET_ID)?;
        match (base_url, spreadsheet_id) {
            (Some(base_url), Some(spreadsheet_id))
                if !base_url.trim().is_empty() && !spreadsheet_id.trim().is_empty() =>
            {
                Ok(Some(RemoteConfigRecord {
                    base_url,
                    spreadsheet_id,
                }))
            }
            _ => Ok(None),
        }
    }

    pub fn remote_config_set(&mut self, record: &RemoteConfigRecord) -> Result<(), StoreError> {
        if record.base_url.trim().is_empty() || record.spreadsheet_id.trim().is_empty() {
            return Err(StoreError::InvalidInput(
                "remote base url and spreadsheet id must not be empty",
            ));
        }
        let tx = self.conn.transaction()?;
        for (key, value) in [
            (META_REMOTE_BASE_URL, record.base_url.as_str()),
            (META_REMOTE_SPREADSHEET_ID, record.spreadsheet_id.as_str()),
        ] {
            tx.execute(
                r#"
                INSERT INTO meta(key, value) VALUES (?1, ?2)
                ON CONFLICT(key) DO UPDATE SET value=excluded.value
                "#,
                params![key, value],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Returns `true` when a stored configuration was removed.
    pub fn remote_config_clear(&mut self) -> Result<bool, StoreError> {
        let deleted = self.conn.execute(
            "DELETE FROM meta WHERE key IN (?1, ?2)",
            params![META_REMOTE_BASE_URL, META_REMOTE_SPREADSHEET_ID],
        )?;
        Ok(deleted > 0)
    }
}

impl LocalStore for SqliteStore {
    fn get_task(&self, id: &TaskId) -> Result<Option<Task>, StoreError> {
        tasks::get_task(&self.conn, id)
    }

    fn put_task(&mut self, task: &Task) -> Result<(), StoreError> {
        tasks::put_task(&self.conn, task)
    }

    fn delete_task(&mut self, id: &TaskId) -> Result<bool, StoreError> {
        tasks::delete_task(&self.conn, id)
    }

    fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        tasks::list_tasks(&self.conn)
    }

    fn queue_append(&mut self, intent: NewIntent) -> Result<PendingIntent, StoreError> {
        queue::append_intent(&self.conn, intent)
    }

    fn queue_list(&self) -> Result<Vec<PendingIntent>, StoreError> {
        queue::list_intents(&self.conn)
    }

    fn queue_remove(&mut self, seq: IntentSeq) -> Result<bool, StoreError> {
        queue::remove_intent(&self.conn, seq)
    }

    fn pending_task_ids(&self) -> Result<BTreeSet<TaskId>, StoreError> {
        queue::pending_task_ids(&self.conn)
    }

    fn commit_mutation(
        &mut self,
        mutation: LocalMutation<'_>,
        enqueued_at: &Timestamp,
    ) -> Result<PendingIntent, StoreError> {
        let tx = self.conn.transaction()?;
        match mutation {
            LocalMutation::Create(task) | LocalMutation::Update(task) => {
                tasks::put_task(&tx, task)?;
            }
            LocalMutation::Delete(id) => {
                tasks::delete_task(&tx, id)?;
            }
        }
        let intent = queue::append_intent(&tx, mutation.to_intent(enqueued_at))?;
        tx.commit()?;
        Ok(intent)
    }
}
