#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// ISO-8601 / RFC 3339 timestamp as carried by tasks and remote rows.
///
/// The raw text is kept verbatim so a row read from the remote sheet is written
/// back byte-for-byte. Ordering goes through [`Timestamp::cmp_instant`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    pub fn now() -> Self {
        Self::from_datetime(OffsetDateTime::now_utc())
    }

    pub fn from_datetime(value: OffsetDateTime) -> Self {
        // Rfc3339 formatting only fails for offsets with seconds or years outside 0..=9999.
        let text = value
            .format(&Rfc3339)
            .unwrap_or_else(|_| value.unix_timestamp().to_string());
        Self(text)
    }

    /// Wraps already formatted text without validation.
    pub fn from_raw(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn parse_instant(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::parse(self.0.trim(), &Rfc3339).ok()
    }

    /// Compares two timestamps by the instant they denote.
    ///
    /// Falls back to comparing the raw text when either side is not RFC 3339,
    /// which matches how uniformly formatted UTC strings sort.
    pub fn cmp_instant(&self, other: &Self) -> Ordering {
        match (self.parse_instant(), other.parse_instant()) {
            (Some(left), Some(right)) => left.cmp(&right),
            _ => self.0.cmp(&other.0),
        }
    }

    /// `true` when `self` denotes the same or a later instant than `other`.
    pub fn is_at_least(&self, other: &Self) -> bool {
        self.cmp_instant(other) != Ordering::Less
    }

    /// Returns `self`, or `floor` when `self` would be earlier.
    pub fn not_before(self, floor: &Self) -> Self {
        if self.is_at_least(floor) {
            self
        } else {
            floor.clone()
        }
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Timestamp {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
