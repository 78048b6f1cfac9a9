#![forbid(unsafe_code)]

use dispatch_core::{SheetRow, TaskId};

/// 1-based offset into one listing of the sheet.
///
/// Only meaningful for the listing it came from: re-list before every
/// update or delete. A concurrent writer between listing and mutation can
/// still shift rows under the caller; the row-CRUD API offers no stable row
/// handle to close that gap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowPosition(u32);

impl RowPosition {
    pub fn new(position: u32) -> Option<Self> {
        (position > 0).then_some(Self(position))
    }

    pub fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index)
            .ok()
            .and_then(|index| index.checked_add(1))
            .map(Self)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }
}

impl std::fmt::Display for RowPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteHealth {
    pub status: String,
}

impl RemoteHealth {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("request timed out")]
    Timeout,
    #[error("transport: {0}")]
    Transport(String),
    #[error("remote returned {code}: {message}")]
    Status { code: u16, message: String },
    #[error("decode: {0}")]
    Decode(String),
}

/// Row-level CRUD against one named sheet.
pub trait RemoteSheet {
    /// Complete current snapshot, in no particular order.
    fn list_rows(&self) -> Result<Vec<SheetRow>, RemoteError>;

    fn create_row(&self, row: &SheetRow) -> Result<RowPosition, RemoteError>;

    fn update_row(&self, position: RowPosition, row: &SheetRow) -> Result<(), RemoteError>;

    fn delete_row(&self, position: RowPosition) -> Result<(), RemoteError>;

    fn health_check(&self) -> Result<RemoteHealth, RemoteError>;
}

impl<R: RemoteSheet + ?Sized> RemoteSheet for &R {
    fn list_rows(&self) -> Result<Vec<SheetRow>, RemoteError> {
        (**self).list_rows()
    }

    fn create_row(&self, row: &SheetRow) -> Result<RowPosition, RemoteError> {
        (**self).create_row(row)
    }

    fn update_row(&self, position: RowPosition, row: &SheetRow) -> Result<(), RemoteError> {
        (**self).update_row(position, row)
    }

    fn delete_row(&self, position: RowPosition) -> Result<(), RemoteError> {
        (**self).delete_row(position)
    }

    fn health_check(&self) -> Result<RemoteHealth, RemoteError> {
        (**self).health_check()
    }
}

/// Position of the first row carrying `id` in a fresh listing.
pub fn locate_row(rows: &[SheetRow], id: &TaskId) -> Option<RowPosition> {
    rows.iter()
        .position(|row| row.id == id.as_str())
        .and_then(RowPosition::from_index)
}
