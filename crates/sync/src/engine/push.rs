#![forbid(unsafe_code)]

use super::{IntentFailure, PushReport, ReplayEffect, SyncError};
use crate::remote::{RemoteError, RemoteSheet, locate_row};
use dispatch_core::{IntentOp, PendingIntent, task_to_row};
use dispatch_storage::LocalStore;

pub(super) fn drain_queue<R: RemoteSheet, S: LocalStore>(
    remote: &R,
    store: &mut S,
) -> Result<PushReport, SyncError> {
    let pending = store.queue_list()?;
    let mut report = PushReport::default();

    for intent in pending {
        match replay(remote, &intent) {
            Ok(effect) => {
                // Removal failing here leaves the intent queued; the next
                // replay finds its row and refreshes instead of duplicating.
                store.queue_remove(intent.seq)?;
                report.synced += 1;
                if effect == ReplayEffect::AlreadySatisfied {
                    report.already_satisfied += 1;
                }
                tracing::debug!(
                    seq = %intent.seq,
                    task_id = %intent.task_id,
                    op = %intent.operation(),
                    effect = ?effect,
                    "intent replayed"
                );
            }
            Err(error) => {
                tracing::warn!(
                    seq = %intent.seq,
                    task_id = %intent.task_id,
                    op = %intent.operation(),
                    error = %error,
                    "intent replay failed; left queued"
                );
                report.errors += 1;
                report.failures.push(IntentFailure {
                    seq: intent.seq,
                    task_id: intent.task_id.clone(),
                    operation: intent.operation(),
                    error,
                });
            }
        }
    }

    Ok(report)
}

fn replay<R: RemoteSheet>(remote: &R, intent: &PendingIntent) -> Result<ReplayEffect, RemoteError> {
    match &intent.op {
        IntentOp::Create(task) => {
            let row = task_to_row(task);
            let rows = remote.list_rows()?;
            match locate_row(&rows, &intent.task_id) {
                Some(position) => {
                    remote.update_row(position, &row)?;
                    Ok(ReplayEffect::Refreshed(position))
                }
                None => Ok(ReplayEffect::Created(remote.create_row(&row)?)),
            }
        }
        IntentOp::Update(task) => {
            let rows = remote.list_rows()?;
            let Some(position) = locate_row(&rows, &intent.task_id) else {
                return Ok(ReplayEffect::AlreadySatisfied);
            };
            remote.update_row(position, &task_to_row(task))?;
            Ok(ReplayEffect::Updated(position))
        }
        IntentOp::Delete => {
            let rows = remote.list_rows()?;
            let Some(position) = locate_row(&rows, &intent.task_id) else {
                return Ok(ReplayEffect::AlreadySatisfied);
            };
            remote.delete_row(position)?;
            Ok(ReplayEffect::Deleted(position))
        }
    }
}
