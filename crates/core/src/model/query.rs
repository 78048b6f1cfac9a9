#![forbid(unsafe_code)]

use super::types::{Task, TaskStatus, TaskType};
use std::cmp::Ordering;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    NextRun,
    Name,
    CreatedAt,
    Status,
}

impl SortField {
    fn key<'a>(self, task: &'a Task) -> &'a str {
        match self {
            Self::NextRun => &task.next_run,
            Self::Name => &task.name,
            Self::CreatedAt => task.created_at.as_str(),
            Self::Status => task.status.as_str(),
        }
    }
}

impl FromStr for SortField {
    type Err = super::UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nextRun" | "next-run" => Ok(Self::NextRun),
            "name" => Ok(Self::Name),
            "createdAt" | "created-at" => Ok(Self::CreatedAt),
            "status" => Ok(Self::Status),
            other => Err(super::UnknownVariant {
                kind: "sort field",
                raw: other.to_string(),
            }),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Filter and ordering over a task list, as used by list views.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub task_type: Option<TaskType>,
    pub status: Option<TaskStatus>,
    pub search: Option<String>,
    pub sort: SortField,
    pub direction: SortDirection,
}

impl TaskQuery {
    pub fn matches(&self, task: &Task) -> bool {
        if self.task_type.is_some_and(|wanted| wanted != task.task_type) {
            return false;
        }
        if self.status.is_some_and(|wanted| wanted != task.status) {
            return false;
        }
        let Some(search) = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        else {
            return true;
        };
        let needle = search.to_lowercase();
        task.name.to_lowercase().contains(&needle)
            || task.description.to_lowercase().contains(&needle)
    }

    pub fn apply(&self, tasks: &[Task]) -> Vec<Task> {
        let mut out = tasks
            .iter()
            .filter(|task| self.matches(task))
            .cloned()
            .collect::<Vec<_>>();
        out.sort_by(|a, b| {
            let ordering = compare_keys(self.sort.key(a), self.sort.key(b));
            let ordering = match self.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            ordering.then_with(|| a.id.cmp(&b.id))
        });
        out
    }
}

fn compare_keys(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
