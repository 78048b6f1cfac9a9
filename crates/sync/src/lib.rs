#![forbid(unsafe_code)]

pub mod config;
pub mod engine;
pub mod gate;
pub mod http;
pub mod remote;
pub mod tasks;

pub use config::{
    ConfigError, DEFAULT_SHEET_NAME, DEFAULT_TIMEOUT, RemoteConfig, SyncConfig, connect_remote,
};
pub use engine::{
    CycleOutcome, CycleReport, IntentFailure, PullPhase, PullReport, PushReport, ReplayEffect,
    SyncEngine, SyncError,
};
pub use gate::{CycleGate, CycleGuard};
pub use http::SheetsDbClient;
pub use remote::{RemoteError, RemoteHealth, RemoteSheet, RowPosition, locate_row};
pub use tasks::{TaskError, create_task, delete_task, update_task};
