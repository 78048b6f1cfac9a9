#![forbid(unsafe_code)]

mod intent;
mod query;
mod row;
mod types;

pub use intent::*;
pub use query::*;
pub use row::*;
pub use types::*;
