#![forbid(unsafe_code)]

//! Push-then-pull synchronization between the local store and the remote sheet.
//!
//! Push drains the pending-sync queue strictly in sequence order; a failing
//! intent stays queued and the drain moves on. Pull fetches the full remote
//! snapshot and reconciles it last-write-wins on `updatedAt` (remote wins ties),
//! then removes local tasks that vanished remotely and have nothing queued.

mod pull;
mod push;

use crate::config::SyncConfig;
use crate::gate::CycleGate;
use crate::http::SheetsDbClient;
use crate::remote::{RemoteError, RemoteSheet, RowPosition};
use dispatch_core::{IntentSeq, SyncOperation, Task, TaskId};
use dispatch_storage::{LocalStore, StoreError};

/// Failures that abort a phase. Remote trouble during push never shows up
/// here; it is counted per intent instead.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("local store: {0}")]
    Store(#[from] StoreError),
    #[error("remote: {0}")]
    Remote(#[from] RemoteError),
}

/// What replaying one intent did to the remote sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplayEffect {
    Created(RowPosition),
    /// A create whose row already existed from an earlier, unacknowledged replay.
    Refreshed(RowPosition),
    Updated(RowPosition),
    Deleted(RowPosition),
    /// Update or delete of a row that is not there; nothing to do.
    AlreadySatisfied,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntentFailure {
    pub seq: IntentSeq,
    pub task_id: TaskId,
    pub operation: SyncOperation,
    pub error: RemoteError,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PushReport {
    pub synced: usize,
    pub errors: usize,
    pub already_satisfied: usize,
    pub failures: Vec<IntentFailure>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PullReport {
    /// The full local task set after reconciliation.
    pub tasks: Vec<Task>,
    pub inserted: usize,
    pub overwritten: usize,
    pub unchanged: usize,
    pub kept_local: usize,
    pub removed: usize,
    pub repaired: usize,
    pub skipped_rows: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PullPhase {
    Reconciled(PullReport),
    /// The snapshot could not be fetched; local state was left untouched.
    Unreachable(RemoteError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CycleReport {
    pub configured: bool,
    pub push: PushReport,
    pub pull: PullPhase,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    Completed(CycleReport),
    /// Another cycle held the gate; this request was dropped.
    Skipped,
}

pub struct SyncEngine<R> {
    remote: Option<R>,
    gate: CycleGate,
}

impl SyncEngine<SheetsDbClient> {
    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.remote().map(SheetsDbClient::new))
    }
}

impl<R: RemoteSheet> SyncEngine<R> {
    pub fn new(remote: Option<R>) -> Self {
        Self {
            remote,
            gate: CycleGate::new(),
        }
    }

    pub fn unconfigured() -> Self {
        Self::new(None)
    }

    /// Shares `gate` with other engines or triggers in this process.
    pub fn with_gate(mut self, gate: CycleGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn gate(&self) -> &CycleGate {
        &self.gate
    }

    pub fn is_configured(&self) -> bool {
        self.remote.is_some()
    }

    pub fn remote(&self) -> Option<&R> {
        self.remote.as_ref()
    }

    pub fn push<S: LocalStore>(&self, store: &mut S) -> Result<PushReport, SyncError> {
        match &self.remote {
            Some(remote) => push::drain_queue(remote, store),
            None => Ok(PushReport::default()),
        }
    }

    pub fn pull<S: LocalStore>(&self, store: &mut S) -> Result<PullReport, SyncError> {
        match &self.remote {
            Some(remote) => pull::reconcile(remote, store),
            None => Ok(PullReport {
                tasks: store.list_tasks()?,
                ..PullReport::default()
            }),
        }
    }

    /// Push, then pull. Always in that order: pulling first could overwrite a
    /// local edit whose intent has not been replayed yet.
    ///
    /// Only local-store failures are returned as errors.
    pub fn run_cycle<S: LocalStore>(&self, store: &mut S) -> Result<CycleOutcome, SyncError> {
        let Some(_guard) = self.gate.try_enter() else {
            tracing::debug!("sync cycle already running; request dropped");
            return Ok(CycleOutcome::Skipped);
        };

        let push = self.push(store)?;
        let pull = match self.pull(store) {
            Ok(report) => PullPhase::Reconciled(report),
            Err(SyncError::Remote(err)) => {
                tracing::warn!(error = %err, "remote snapshot unavailable; local state kept");
                PullPhase::Unreachable(err)
            }
            Err(err) => return Err(err),
        };

        let report = CycleReport {
            configured: self.is_configured(),
            push,
            pull,
        };
        if report.configured {
            log_cycle(&report);
        }
        Ok(CycleOutcome::Completed(report))
    }
}

fn log_cycle(report: &CycleReport) {
    match &report.pull {
        PullPhase::Reconciled(pull) => tracing::info!(
            synced = report.push.synced,
            errors = report.push.errors,
            inserted = pull.inserted,
            overwritten = pull.overwritten,
            kept_local = pull.kept_local,
            removed = pull.removed,
            tasks = pull.tasks.len(),
            "sync cycle completed"
        ),
        PullPhase::Unreachable(_) => tracing::info!(
            synced = report.push.synced,
            errors = report.push.errors,
            "sync cycle completed without pull"
        ),
    }
}
