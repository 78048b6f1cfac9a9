#![forbid(unsafe_code)]
#![allow(dead_code)]

use dispatch_core::{IntentSeq, NewIntent, PendingIntent, SheetRow, Task, TaskId, Timestamp};
use dispatch_storage::{LocalMutation, LocalStore, SqliteStore, StoreError};
use dispatch_sync::{RemoteError, RemoteHealth, RemoteSheet, RowPosition};
use std::collections::BTreeSet;
use std::sync::Mutex;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    List,
    Create(String),
    Update(u32, String),
    Delete(u32),
    Health,
}

impl Call {
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Create(_) | Self::Update(..) | Self::Delete(_))
    }
}

#[derive(Default)]
struct SheetState {
    rows: Vec<SheetRow>,
    calls: Vec<Call>,
    fail_all: Option<RemoteError>,
    fail_writes_for: Vec<(String, RemoteError)>,
    health_status: Option<String>,
}

/// In-memory sheet with the same positional semantics as the HTTP API.
#[derive(Default)]
pub struct MemorySheet {
    state: Mutex<SheetState>,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<SheetRow>) -> Self {
        let sheet = Self::default();
        sheet.state.lock().unwrap().rows = rows;
        sheet
    }

    pub fn rows(&self) -> Vec<SheetRow> {
        self.state.lock().unwrap().rows.clone()
    }

    pub fn row(&self, id: &str) -> Option<SheetRow> {
        self.rows().into_iter().find(|row| row.id == id)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn write_calls(&self) -> usize {
        self.calls().iter().filter(|call| call.is_write()).count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// Every call fails with `error` until [`MemorySheet::heal`].
    pub fn fail_all(&self, error: RemoteError) {
        self.state.lock().unwrap().fail_all = Some(error);
    }

    /// Writes carrying or targeting this id fail with `error`.
    pub fn fail_writes_for(&self, id: &str, error: RemoteError) {
        self.state
            .lock()
            .unwrap()
            .fail_writes_for
            .push((id.to_string(), error));
    }

    pub fn set_health(&self, status: &str) {
        self.state.lock().unwrap().health_status = Some(status.to_string());
    }

    pub fn heal(&self) {
        let mut state = self.state.lock().unwrap();
        state.fail_all = None;
        state.fail_writes_for.clear();
    }
}

impl SheetState {
    fn check(&self, touched_id: Option<&str>) -> Result<(), RemoteError> {
        if let Some(err) = &self.fail_all {
            return Err(err.clone());
        }
        if let Some(id) = touched_id {
            if let Some((_, err)) = self.fail_writes_for.iter().find(|(bad, _)| bad == id) {
                return Err(err.clone());
            }
        }
        Ok(())
    }

    fn id_at(&self, position: RowPosition) -> Result<String, RemoteError> {
        self.rows
            .get(position.index())
            .map(|row| row.id.clone())
            .ok_or(RemoteError::Status {
                code: 404,
                message: format!("no {position}"),
            })
    }
}

impl RemoteSheet for MemorySheet {
    fn list_rows(&self) -> Result<Vec<SheetRow>, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::List);
        state.check(None)?;
        Ok(state.rows.clone())
    }

    fn create_row(&self, row: &SheetRow) -> Result<RowPosition, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Create(row.id.clone()));
        state.check(Some(&row.id))?;
        state.rows.push(row.clone());
        Ok(RowPosition::from_index(state.rows.len() - 1).expect("row position"))
    }

    fn update_row(&self, position: RowPosition, row: &SheetRow) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Update(position.get(), row.id.clone()));
        let target = state.id_at(position)?;
        state.check(Some(&target))?;
        state.rows[position.index()] = row.clone();
        Ok(())
    }

    fn delete_row(&self, position: RowPosition) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Delete(position.get()));
        let target = state.id_at(position)?;
        state.check(Some(&target))?;
        state.rows.remove(position.index());
        Ok(())
    }

    fn health_check(&self) -> Result<RemoteHealth, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Health);
        state.check(None)?;
        Ok(RemoteHealth {
            status: state.health_status.clone().unwrap_or_else(|| "ok".to_string()),
        })
    }
}

/// Wraps a real store and fails selected operations on demand.
pub struct FlakyStore {
    pub inner: SqliteStore,
    pub fail_queue_remove: bool,
    pub fail_put: bool,
}

impl FlakyStore {
    pub fn new(inner: SqliteStore) -> Self {
        Self {
            inner,
            fail_queue_remove: false,
            fail_put: false,
        }
    }
}

impl LocalStore for FlakyStore {
    fn get_task(&self, id: &TaskId) -> Result<Option<Task>, StoreError> {
        self.inner.get_task(id)
    }

    fn put_task(&mut self, task: &Task) -> Result<(), StoreError> {
        if self.fail_put {
            return Err(StoreError::InvalidInput("injected put failure"));
        }
        self.inner.put_task(task)
    }

    fn delete_task(&mut self, id: &TaskId) -> Result<bool, StoreError> {
        self.inner.delete_task(id)
    }

    fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        self.inner.list_tasks()
    }

    fn queue_append(&mut self, intent: NewIntent) -> Result<PendingIntent, StoreError> {
        self.inner.queue_append(intent)
    }

    fn queue_list(&self) -> Result<Vec<PendingIntent>, StoreError> {
        self.inner.queue_list()
    }

    fn queue_remove(&mut self, seq: IntentSeq) -> Result<bool, StoreError> {
        if self.fail_queue_remove {
            return Err(StoreError::InvalidInput("injected queue failure"));
        }
        self.inner.queue_remove(seq)
    }

    fn pending_task_ids(&self) -> Result<BTreeSet<TaskId>, StoreError> {
        self.inner.pending_task_ids()
    }

    fn commit_mutation(
        &mut self,
        mutation: LocalMutation<'_>,
        enqueued_at: &Timestamp,
    ) -> Result<PendingIntent, StoreError> {
        self.inner.commit_mutation(mutation, enqueued_at)
    }
}

pub fn open_store() -> (tempfile::TempDir, SqliteStore) {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = SqliteStore::open(dir.path()).expect("open store");
    (dir, store)
}

pub fn ts(value: &str) -> Timestamp {
    Timestamp::from(value)
}

pub fn id(value: &str) -> TaskId {
    TaskId::try_new(value).expect("task id")
}

pub fn row(id: &str, name: &str, updated_at: &str) -> SheetRow {
    SheetRow {
        id: id.to_string(),
        name: name.to_string(),
        task_type: "recurring".to_string(),
        status: "Scheduled".to_string(),
        created_at: "2024-01-01T00:00:00Z".to_string(),
        updated_at: updated_at.to_string(),
        ..SheetRow::default()
    }
}
