#![forbid(unsafe_code)]

use crate::StoreError;
use dispatch_core::{IntentOp, IntentSeq, NewIntent, PendingIntent, Task, TaskId, Timestamp};
use std::collections::BTreeSet;

/// A user-facing change to one task, paired with the intent it produces.
#[derive(Clone, Copy, Debug)]
pub enum LocalMutation<'a> {
    Create(&'a Task),
    Update(&'a Task),
    Delete(&'a TaskId),
}

impl LocalMutation<'_> {
    pub fn task_id(&self) -> &TaskId {
        match self {
            Self::Create(task) | Self::Update(task) => &task.id,
            Self::Delete(id) => id,
        }
    }

    pub fn to_intent(&self, enqueued_at: &Timestamp) -> NewIntent {
        let op = match self {
            Self::Create(task) => IntentOp::Create((*task).clone()),
            Self::Update(task) => IntentOp::Update((*task).clone()),
            Self::Delete(_) => IntentOp::Delete,
        };
        NewIntent {
            task_id: self.task_id().clone(),
            op,
            enqueued_at: enqueued_at.clone(),
        }
    }
}

/// Durable local persistence for tasks and the pending-sync queue.
///
/// Every method is a single atomic step at the storage layer. Implementations
/// that can do better override [`LocalStore::commit_mutation`] so the task
/// write and its intent land together.
pub trait LocalStore {
    fn get_task(&self, id: &TaskId) -> Result<Option<Task>, StoreError>;

    fn put_task(&mut self, task: &Task) -> Result<(), StoreError>;

    /// Returns `true` when a task was removed.
    fn delete_task(&mut self, id: &TaskId) -> Result<bool, StoreError>;

    fn list_tasks(&self) -> Result<Vec<Task>, StoreError>;

    fn queue_append(&mut self, intent: NewIntent) -> Result<PendingIntent, StoreError>;

    /// All intents awaiting replay, ascending by sequence number.
    fn queue_list(&self) -> Result<Vec<PendingIntent>, StoreError>;

    /// Returns `true` when an intent was removed.
    fn queue_remove(&mut self, seq: IntentSeq) -> Result<bool, StoreError>;

    fn pending_task_ids(&self) -> Result<BTreeSet<TaskId>, StoreError> {
        Ok(self
            .queue_list()?
            .into_iter()
            .map(|intent| intent.task_id)
            .collect())
    }

    fn commit_mutation(
        &mut self,
        mutation: LocalMutation<'_>,
        enqueued_at: &Timestamp,
    ) -> Result<PendingIntent, StoreError> {
        match mutation {
            LocalMutation::Create(task) | LocalMutation::Update(task) => self.put_task(task)?,
            LocalMutation::Delete(id) => {
                self.delete_task(id)?;
            }
        }
        self.queue_append(mutation.to_intent(enqueued_at))
    }
}
