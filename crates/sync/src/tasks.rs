#![forbid(unsafe_code)]

//! User-facing mutations: each one writes the local store and enqueues the
//! matching intent in the same step.

use dispatch_core::{NewTask, Task, TaskId, TaskPatch, Timestamp};
use dispatch_storage::{LocalMutation, LocalStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("task name must not be empty")]
    EmptyName,
    #[error("nothing to update")]
    EmptyPatch,
    #[error("unknown task {0}")]
    UnknownTask(TaskId),
    #[error("task {0} already exists")]
    DuplicateId(TaskId),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub fn create_task<S: LocalStore>(
    store: &mut S,
    new_task: NewTask,
    now: Timestamp,
) -> Result<Task, TaskError> {
    if new_task.name.trim().is_empty() {
        return Err(TaskError::EmptyName);
    }
    let id = new_task.id.clone().unwrap_or_else(TaskId::generate);
    if store.get_task(&id)?.is_some() {
        return Err(TaskError::DuplicateId(id));
    }

    let task = new_task.into_task(id, now.clone());
    let intent = store.commit_mutation(LocalMutation::Create(&task), &now)?;
    tracing::debug!(task_id = %task.id, seq = %intent.seq, "task created");
    Ok(task)
}

pub fn update_task<S: LocalStore>(
    store: &mut S,
    id: &TaskId,
    patch: TaskPatch,
    now: Timestamp,
) -> Result<Task, TaskError> {
    if patch.is_empty() {
        return Err(TaskError::EmptyPatch);
    }
    if patch
        .name
        .as_deref()
        .is_some_and(|name| name.trim().is_empty())
    {
        return Err(TaskError::EmptyName);
    }
    let Some(mut task) = store.get_task(id)? else {
        return Err(TaskError::UnknownTask(id.clone()));
    };

    patch.apply_to(&mut task, now.clone());
    let intent = store.commit_mutation(LocalMutation::Update(&task), &now)?;
    tracing::debug!(task_id = %task.id, seq = %intent.seq, "task updated");
    Ok(task)
}

pub fn delete_task<S: LocalStore>(
    store: &mut S,
    id: &TaskId,
    now: Timestamp,
) -> Result<(), TaskError> {
    if store.get_task(id)?.is_none() {
        return Err(TaskError::UnknownTask(id.clone()));
    }
    let intent = store.commit_mutation(LocalMutation::Delete(id), &now)?;
    tracing::debug!(task_id = %id, seq = %intent.seq, "task deleted");
    Ok(())
}
