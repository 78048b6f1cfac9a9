#![forbid(unsafe_code)]

mod error;
mod local;
mod queue;
mod schema;
mod sqlite;
mod tasks;

pub use error::StoreError;
pub use local::{LocalMutation, LocalStore};
pub use sqlite::{RemoteConfigRecord, SqliteStore};
