#![forbid(unsafe_code)]

//! Effective remote configuration for one run: flags and environment first,
//! then whatever `remote set` persisted.

use crate::cli::GlobalArgs;
use dispatch_storage::SqliteStore;
use dispatch_sync::{ConfigError, RemoteConfig, SyncConfig};
use std::time::Duration;

pub(crate) fn resolve_sync_config(
    store: &SqliteStore,
    global: &GlobalArgs,
) -> Result<SyncConfig, ConfigError> {
    let stored = store.remote_config_get()?;
    let base_url = global
        .base_url
        .clone()
        .or_else(|| stored.as_ref().map(|record| record.base_url.clone()));
    let spreadsheet_id = global
        .spreadsheet_id
        .clone()
        .or_else(|| stored.as_ref().map(|record| record.spreadsheet_id.clone()));

    match (base_url, spreadsheet_id) {
        (Some(base_url), Some(spreadsheet_id)) => {
            let remote = apply_overrides(RemoteConfig::new(base_url, spreadsheet_id)?, global)?;
            Ok(SyncConfig::with_remote(remote))
        }
        (None, None) => Ok(SyncConfig::disabled()),
        (Some(_), None) | (None, Some(_)) => {
            tracing::warn!("remote needs both a base url and a spreadsheet id; sync disabled");
            Ok(SyncConfig::disabled())
        }
    }
}

pub(crate) fn apply_overrides(
    remote: RemoteConfig,
    global: &GlobalArgs,
) -> Result<RemoteConfig, ConfigError> {
    let remote = remote.with_timeout(Duration::from_millis(global.timeout_ms))?;
    match global.sheet_name.as_deref() {
        Some(sheet_name) => remote.with_sheet_name(sheet_name),
        None => Ok(remote),
    }
}
