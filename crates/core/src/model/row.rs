#![forbid(unsafe_code)]

use super::types::{Parsed, Task, TaskStatus, TaskType};
use crate::{TaskId, TaskIdError, Timestamp};
use serde::{Deserialize, Serialize};

/// Wire form of a task: every field is a string, absent fields read as empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SheetRow {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub task_type: String,
    pub status: String,
    pub schedule: String,
    pub description: String,
    pub next_run: String,
    pub last_run: String,
    pub last_result: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepairReason {
    UnknownType,
    UnknownStatus,
    MissingCreatedAt,
    MissingUpdatedAt,
}

impl RepairReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnknownType => "unknown type, defaulted",
            Self::UnknownStatus => "unknown status, defaulted",
            Self::MissingCreatedAt => "missing createdAt, stamped now",
            Self::MissingUpdatedAt => "missing updatedAt, stamped now",
        }
    }
}

/// One field that did not survive conversion verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowRepair {
    pub field: &'static str,
    pub raw: String,
    pub reason: RepairReason,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowConversion {
    pub task: Task,
    pub repairs: Vec<RowRepair>,
}

impl RowConversion {
    pub fn is_clean(&self) -> bool {
        self.repairs.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("row id '{raw}' rejected: {source}")]
pub struct RowError {
    pub raw: String,
    #[source]
    pub source: TaskIdError,
}

pub fn task_to_row(task: &Task) -> SheetRow {
    SheetRow {
        id: task.id.as_str().to_string(),
        name: task.name.clone(),
        task_type: task.task_type.as_str().to_string(),
        status: task.status.as_str().to_string(),
        schedule: task.schedule.clone(),
        description: task.description.clone(),
        next_run: task.next_run.clone(),
        last_run: task.last_run.clone(),
        last_result: task.last_result.clone(),
        created_at: task.created_at.as_str().to_string(),
        updated_at: task.updated_at.as_str().to_string(),
    }
}

/// Converts a remote row into a task, coercing what can be coerced.
///
/// Only the id is load-bearing: without a valid id the row cannot be joined
/// against the local store, so it is rejected. Everything else is repaired and
/// the repair is recorded in [`RowConversion::repairs`].
pub fn row_to_task(row: &SheetRow) -> Result<RowConversion, RowError> {
    let id = TaskId::try_new(row.id.clone()).map_err(|source| RowError {
        raw: row.id.clone(),
        source,
    })?;

    let mut repairs = Vec::new();

    let task_type = TaskType::parse_lenient(&row.task_type);
    if let Parsed::Defaulted { raw, .. } = &task_type {
        repairs.push(RowRepair {
            field: "type",
            raw: raw.clone(),
            reason: RepairReason::UnknownType,
        });
    }

    let status = TaskStatus::parse_lenient(&row.status);
    if let Parsed::Defaulted { raw, .. } = &status {
        repairs.push(RowRepair {
            field: "status",
            raw: raw.clone(),
            reason: RepairReason::UnknownStatus,
        });
    }

    let created_at = stamp_or_now(
        &row.created_at,
        "createdAt",
        RepairReason::MissingCreatedAt,
        &mut repairs,
    );
    let updated_at = stamp_or_now(
        &row.updated_at,
        "updatedAt",
        RepairReason::MissingUpdatedAt,
        &mut repairs,
    );

    Ok(RowConversion {
        task: Task {
            id,
            name: row.name.clone(),
            task_type: task_type.value(),
            status: status.value(),
            schedule: row.schedule.clone(),
            description: row.description.clone(),
            next_run: row.next_run.clone(),
            last_run: row.last_run.clone(),
            last_result: row.last_result.clone(),
            created_at,
            updated_at,
        },
        repairs,
    })
}

fn stamp_or_now(
    raw: &str,
    field: &'static str,
    reason: RepairReason,
    repairs: &mut Vec<RowRepair>,
) -> Timestamp {
    let stamp = Timestamp::from_raw(raw);
    if !stamp.is_empty() {
        return stamp;
    }
    repairs.push(RowRepair {
        field,
        raw: raw.to_string(),
        reason,
    });
    Timestamp::now()
}
