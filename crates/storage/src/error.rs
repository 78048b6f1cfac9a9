#![forbid(unsafe_code)]

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("corrupt {table} row ({key}): {detail}")]
    CorruptRow {
        table: &'static str,
        key: String,
        detail: String,
    },
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "IO",
            Self::Sql(_) => "SQLITE",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::CorruptRow { .. } => "CORRUPT_ROW",
        }
    }

    pub(crate) fn corrupt(table: &'static str, key: impl ToString, detail: impl ToString) -> Self {
        Self::CorruptRow {
            table,
            key: key.to_string(),
            detail: detail.to_string(),
        }
    }
}
