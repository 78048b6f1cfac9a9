#![forbid(unsafe_code)]

use crate::{TaskId, Timestamp};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Outcome of a lenient enum parse: either the raw text named a variant, or the
/// default was substituted for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Parsed<T> {
    Valid(T),
    Defaulted { value: T, raw: String },
}

impl<T: Copy> Parsed<T> {
    pub fn value(&self) -> T {
        match self {
            Self::Valid(value) => *value,
            Self::Defaulted { value, .. } => *value,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, Self::Defaulted { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{raw}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub raw: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskType {
    #[serde(rename = "recurring")]
    Recurring,
    #[default]
    #[serde(rename = "one-shot")]
    OneShot,
    #[serde(rename = "reminder")]
    Reminder,
}

impl TaskType {
    pub const ALL: [TaskType; 3] = [Self::Recurring, Self::OneShot, Self::Reminder];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Recurring => "recurring",
            Self::OneShot => "one-shot",
            Self::Reminder => "reminder",
        }
    }

    pub fn parse_lenient(raw: &str) -> Parsed<Self> {
        match raw.parse() {
            Ok(value) => Parsed::Valid(value),
            Err(_) => Parsed::Defaulted {
                value: Self::default(),
                raw: raw.to_string(),
            },
        }
    }
}

impl FromStr for TaskType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "task type",
                raw: s.to_string(),
            })
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    Scheduled,
    #[serde(rename = "In Progress")]
    InProgress,
    Done,
    Error,
    Paused,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 5] = [
        Self::Scheduled,
        Self::InProgress,
        Self::Done,
        Self::Error,
        Self::Paused,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
            Self::Error => "Error",
            Self::Paused => "Paused",
        }
    }

    pub fn parse_lenient(raw: &str) -> Parsed<Self> {
        match raw.parse() {
            Ok(value) => Parsed::Valid(value),
            Err(_) => Parsed::Defaulted {
                value: Self::default(),
                raw: raw.to_string(),
            },
        }
    }
}

impl FromStr for TaskStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "task status",
                raw: s.to_string(),
            })
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task as held in the local store and replayed to the remote sheet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub status: TaskStatus,
    pub schedule: String,
    pub description: String,
    pub next_run: String,
    pub last_run: String,
    pub last_result: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// User-settable fields of a task about to be created.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewTask {
    pub id: Option<TaskId>,
    pub name: String,
    pub task_type: TaskType,
    pub status: TaskStatus,
    pub schedule: String,
    pub description: String,
    pub next_run: String,
    pub last_run: String,
    pub last_result: String,
}

impl NewTask {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn into_task(self, id: TaskId, now: Timestamp) -> Task {
        Task {
            id,
            name: self.name,
            task_type: self.task_type,
            status: self.status,
            schedule: self.schedule,
            description: self.description,
            next_run: self.next_run,
            last_run: self.last_run,
            last_result: self.last_result,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Partial edit. `id`, `type` and `createdAt` cannot be edited.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub status: Option<TaskStatus>,
    pub schedule: Option<String>,
    pub description: Option<String>,
    pub next_run: Option<String>,
    pub last_run: Option<String>,
    pub last_result: Option<String>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.status.is_none()
            && self.schedule.is_none()
            && self.description.is_none()
            && self.next_run.is_none()
            && self.last_run.is_none()
            && self.last_result.is_none()
    }

    /// Applies the patch and stamps `updated_at`, never earlier than `created_at`.
    pub fn apply_to(self, task: &mut Task, now: Timestamp) {
        if let Some(name) = self.name {
            task.name = name;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(schedule) = self.schedule {
            task.schedule = schedule;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(next_run) = self.next_run {
            task.next_run = next_run;
        }
        if let Some(last_run) = self.last_run {
            task.last_run = last_run;
        }
        if let Some(last_result) = self.last_result {
            task.last_result = last_result;
        }
        task.updated_at = now.not_before(&task.created_at);
    }
}
