#![forbid(unsafe_code)]

use crate::remote::{RemoteError, RemoteHealth, RemoteSheet};
use dispatch_storage::{RemoteConfigRecord, SqliteStore, StoreError};
use std::time::Duration;

pub const DEFAULT_SHEET_NAME: &str = "Cron";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("base url must not be empty")]
    EmptyBaseUrl,
    #[error("base url must start with http:// or https://")]
    UnsupportedScheme,
    #[error("spreadsheet id must not be empty")]
    EmptySpreadsheetId,
    #[error("spreadsheet id must not contain '/' or whitespace")]
    InvalidSpreadsheetId,
    #[error("sheet name must not be empty")]
    EmptySheetName,
    #[error("timeout must be greater than zero")]
    ZeroTimeout,
    #[error("health check failed: {0}")]
    Unreachable(#[source] RemoteError),
    #[error("remote reported status '{0}'")]
    Unhealthy(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Where the remote sheet lives and how long one call may take.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteConfig {
    base_url: String,
    spreadsheet_id: String,
    sheet_name: String,
    timeout: Duration,
}

impl RemoteConfig {
    pub fn new(
        base_url: impl AsRef<str>,
        spreadsheet_id: impl AsRef<str>,
    ) -> Result<Self, ConfigError> {
        let base_url = base_url.as_ref().trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::UnsupportedScheme);
        }

        let spreadsheet_id = spreadsheet_id.as_ref().trim();
        if spreadsheet_id.is_empty() {
            return Err(ConfigError::EmptySpreadsheetId);
        }
        if spreadsheet_id
            .chars()
            .any(|c| c == '/' || c.is_whitespace())
        {
            return Err(ConfigError::InvalidSpreadsheetId);
        }

        Ok(Self {
            base_url: base_url.to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn from_record(record: &RemoteConfigRecord) -> Result<Self, ConfigError> {
        Self::new(&record.base_url, &record.spreadsheet_id)
    }

    pub fn with_sheet_name(mut self, sheet_name: impl AsRef<str>) -> Result<Self, ConfigError> {
        let sheet_name = sheet_name.as_ref().trim();
        if sheet_name.is_empty() {
            return Err(ConfigError::EmptySheetName);
        }
        self.sheet_name = sheet_name.to_string();
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ConfigError> {
        if timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        self.timeout = timeout;
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn to_record(&self) -> RemoteConfigRecord {
        RemoteConfigRecord {
            base_url: self.base_url.clone(),
            spreadsheet_id: self.spreadsheet_id.clone(),
        }
    }
}

/// The configuration gate. Without a remote, push and pull are no-ops.
///
/// Passed by value into the engine; nothing here reads process state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncConfig {
    remote: Option<RemoteConfig>,
}

impl SyncConfig {
    pub fn disabled() -> Self {
        Self { remote: None }
    }

    pub fn with_remote(remote: RemoteConfig) -> Self {
        Self {
            remote: Some(remote),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.remote.is_some()
    }

    pub fn remote(&self) -> Option<&RemoteConfig> {
        self.remote.as_ref()
    }

    /// Reads the persisted remote endpoint, if any.
    pub fn load(store: &SqliteStore) -> Result<Self, ConfigError> {
        match store.remote_config_get()? {
            Some(record) => Ok(Self::with_remote(RemoteConfig::from_record(&record)?)),
            None => Ok(Self::disabled()),
        }
    }

    pub fn save(store: &mut SqliteStore, remote: &RemoteConfig) -> Result<(), ConfigError> {
        store.remote_config_set(&remote.to_record())?;
        Ok(())
    }

    pub fn clear(store: &mut SqliteStore) -> Result<bool, ConfigError> {
        Ok(store.remote_config_clear()?)
    }
}

/// Persists `remote`, then probes it. A failed probe restores whatever was
/// stored before, so a typo never replaces a working configuration.
pub fn connect_remote<R, F>(
    store: &mut SqliteStore,
    remote: &RemoteConfig,
    open: F,
) -> Result<RemoteHealth, ConfigError>
where
    R: RemoteSheet,
    F: FnOnce(&RemoteConfig) -> R,
{
    let previous = store.remote_config_get()?;
    SyncConfig::save(store, remote)?;

    let probe = open(remote).health_check();
    let failure = match probe {
        Ok(health) if health.is_ok() => {
            tracing::info!(
                base_url = remote.base_url(),
                spreadsheet_id = remote.spreadsheet_id(),
                "remote connected"
            );
            return Ok(health);
        }
        Ok(health) => ConfigError::Unhealthy(health.status),
        Err(err) => ConfigError::Unreachable(err),
    };

    match previous {
        Some(record) => store.remote_config_set(&record)?,
        None => {
            store.remote_config_clear()?;
        }
    }
    tracing::warn!(error = %failure, "remote connection rejected; previous configuration kept");
    Err(failure)
}
