#![forbid(unsafe_code)]

use crate::StoreError;
use dispatch_core::{Task, TaskId, TaskStatus, TaskType, Timestamp};
use rusqlite::{Connection, OptionalExtension, Row, params};

const TASK_COLUMNS: &str = "id, name, type, status, schedule, description, \
     next_run, last_run, last_result, created_at, updated_at";

struct TaskRow {
    id: String,
    name: String,
    task_type: String,
    status: String,
    schedule: String,
    description: String,
    next_run: String,
    last_run: String,
    last_result: String,
    created_at: String,
    updated_at: String,
}

impl TaskRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            task_type: row.get(2)?,
            status: row.get(3)?,
            schedule: row.get(4)?,
            description: row.get(5)?,
            next_run: row.get(6)?,
            last_run: row.get(7)?,
            last_result: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    fn into_task(self) -> Result<Task, StoreError> {
        let id = TaskId::try_new(self.id.clone())
            .map_err(|err| StoreError::corrupt("tasks", &self.id, err))?;
        let task_type = self
            .task_type
            .parse::<TaskType>()
            .map_err(|err| StoreError::corrupt("tasks", &self.id, err))?;
        let status = self
            .status
            .parse::<TaskStatus>()
            .map_err(|err| StoreError::corrupt("tasks", &self.id, err))?;
        Ok(Task {
            id,
            name: self.name,
            task_type,
            status,
            schedule: self.schedule,
            description: self.description,
            next_run: self.next_run,
            last_run: self.last_run,
            last_result: self.last_result,
            created_at: Timestamp::from_raw(self.created_at),
            updated_at: Timestamp::from_raw(self.updated_at),
        })
    }
}

pub(crate) fn get_task(conn: &Connection, id: &TaskId) -> Result<Option<Task>, StoreError> {
    let row = conn
        .query_row(
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
            params![id.as_str()],
            TaskRow::read,
        )
        .optional()?;
    row.map(TaskRow::into_task).transpose()
}

pub(crate) fn put_task(conn: &Connection, task: &Task) -> Result<(), StoreError> {
    conn.execute(
        &format!(
            r#"
            INSERT INTO tasks({TASK_COLUMNS})
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(id) DO UPDATE SET
              name=excluded.name,
              type=excluded.type,
              status=excluded.status,
              schedule=excluded.schedule,
              description=excluded.description,
              next_run=excluded.next_run,
              last_run=excluded.last_run,
              last_result=excluded.last_result,
              created_at=excluded.created_at,
              updated_at=excluded.updated_at
            "#
        ),
        params![
            task.id.as_str(),
            task.name,
            task.task_type.as_str(),
            task.status.as_str(),
            task.schedule,
            task.description,
            task.next_run,
            task.last_run,
            task.last_result,
            task.created_at.as_str(),
            task.updated_at.as_str(),
        ],
    )?;
    Ok(())
}

pub(crate) fn delete_task(conn: &Connection, id: &TaskId) -> Result<bool, StoreError> {
    let deleted = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id.as_str()])?;
    Ok(deleted > 0)
}

pub(crate) fn list_tasks(conn: &Connection) -> Result<Vec<Task>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at ASC, id ASC"
    ))?;
    let rows = stmt.query_map([], TaskRow::read)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?.into_task()?);
    }
    Ok(out)
}
