#![forbid(unsafe_code)]

pub mod ids {
    use serde::{Deserialize, Serialize};

    const MAX_TASK_ID_LEN: usize = 256;

    #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
    #[serde(try_from = "String", into = "String")]
    pub struct TaskId(String);

    impl TaskId {
        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn into_string(self) -> String {
            self.0
        }

        pub fn try_new(value: impl Into<String>) -> Result<Self, TaskIdError> {
            let value = value.into();
            validate_task_id(&value)?;
            Ok(Self(value))
        }

        pub fn generate() -> Self {
            Self(uuid::Uuid::new_v4().to_string())
        }
    }

    impl std::fmt::Display for TaskId {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl TryFrom<String> for TaskId {
        type Error = TaskIdError;

        fn try_from(value: String) -> Result<Self, Self::Error> {
            Self::try_new(value)
        }
    }

    impl From<TaskId> for String {
        fn from(value: TaskId) -> Self {
            value.0
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
    pub enum TaskIdError {
        #[error("task id must not be empty")]
        Empty,
        #[error("task id is too long")]
        TooLong,
        #[error("task id must not have surrounding whitespace")]
        Untrimmed,
        #[error("task id contains control characters")]
        ContainsControl,
    }

    fn validate_task_id(value: &str) -> Result<(), TaskIdError> {
        if value.trim().is_empty() {
            return Err(TaskIdError::Empty);
        }
        if value.len() > MAX_TASK_ID_LEN {
            return Err(TaskIdError::TooLong);
        }
        if value.trim() != value {
            return Err(TaskIdError::Untrimmed);
        }
        if value.chars().any(|c| c.is_control()) {
            return Err(TaskIdError::ContainsControl);
        }
        Ok(())
    }
}

pub mod model;
pub mod timestamp;

pub use ids::{TaskId, TaskIdError};
pub use model::*;
pub use timestamp::Timestamp;
