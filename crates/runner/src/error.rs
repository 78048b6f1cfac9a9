#![forbid(unsafe_code)]

use dispatch_core::TaskId;
use dispatch_storage::StoreError;
use dispatch_sync::{ConfigError, RemoteError, SyncError, TaskError};

#[derive(Debug, thiserror::Error)]
pub(crate) enum RunnerError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error("remote: {0}")]
    Remote(#[from] RemoteError),
    #[error("unknown task {0}")]
    NotFound(TaskId),
    #[error("no remote configured; run `dispatch remote set <base-url> <spreadsheet-id>`")]
    NotConfigured,
    #[error("output: {0}")]
    Output(#[from] std::io::Error),
    #[error("output: {0}")]
    Json(#[from] serde_json::Error),
}
