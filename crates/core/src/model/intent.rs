#![forbid(unsafe_code)]

use super::types::Task;
use crate::{TaskId, Timestamp};
use std::str::FromStr;

/// Queue-assigned ordering key. Strictly increasing, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IntentSeq(i64);

impl IntentSeq {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for IntentSeq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SyncOperation {
    Create,
    Update,
    Delete,
}

impl SyncOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl FromStr for SyncOperation {
    type Err = super::UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            other => Err(super::UnknownVariant {
                kind: "sync operation",
                raw: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an intent asks the remote to do. Create and update carry the full
/// snapshot taken at mutation time; delete carries nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IntentOp {
    Create(Task),
    Update(Task),
    Delete,
}

impl IntentOp {
    pub fn operation(&self) -> SyncOperation {
        match self {
            Self::Create(_) => SyncOperation::Create,
            Self::Update(_) => SyncOperation::Update,
            Self::Delete => SyncOperation::Delete,
        }
    }

    pub fn payload(&self) -> Option<&Task> {
        match self {
            Self::Create(task) | Self::Update(task) => Some(task),
            Self::Delete => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewIntent {
    pub task_id: TaskId,
    pub op: IntentOp,
    pub enqueued_at: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingIntent {
    pub seq: IntentSeq,
    pub task_id: TaskId,
    pub op: IntentOp,
    /// Diagnostics only; replay order is `seq`.
    pub enqueued_at: Timestamp,
}

impl PendingIntent {
    pub fn operation(&self) -> SyncOperation {
        self.op.operation()
    }
}
