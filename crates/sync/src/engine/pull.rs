#![forbid(unsafe_code)]

use super::{PullReport, SyncError};
use crate::remote::RemoteSheet;
use dispatch_core::{TaskId, row_to_task};
use dispatch_storage::LocalStore;
use std::collections::BTreeSet;

pub(super) fn reconcile<R: RemoteSheet, S: LocalStore>(
    remote: &R,
    store: &mut S,
) -> Result<PullReport, SyncError> {
    let rows = remote.list_rows()?;
    let mut report = PullReport::default();
    let mut remote_ids = BTreeSet::<TaskId>::new();

    for row in &rows {
        let conversion = match row_to_task(row) {
            Ok(conversion) => conversion,
            Err(err) => {
                tracing::warn!(error = %err, "remote row skipped");
                report.skipped_rows += 1;
                continue;
            }
        };
        if !conversion.is_clean() {
            report.repaired += 1;
            for repair in &conversion.repairs {
                tracing::debug!(
                    task_id = %conversion.task.id,
                    field = repair.field,
                    raw = %repair.raw,
                    reason = repair.reason.as_str(),
                    "remote row repaired"
                );
            }
        }

        let incoming = conversion.task;
        remote_ids.insert(incoming.id.clone());

        match store.get_task(&incoming.id)? {
            None => {
                store.put_task(&incoming)?;
                report.inserted += 1;
            }
            // Remote wins ties.
            Some(local) if incoming.updated_at.is_at_least(&local.updated_at) => {
                if local == incoming {
                    report.unchanged += 1;
                } else {
                    store.put_task(&incoming)?;
                    report.overwritten += 1;
                }
            }
            Some(_) => report.kept_local += 1,
        }
    }

    let pending = store.pending_task_ids()?;
    for local in store.list_tasks()? {
        if remote_ids.contains(&local.id) || pending.contains(&local.id) {
            continue;
        }
        store.delete_task(&local.id)?;
        report.removed += 1;
        tracing::debug!(task_id = %local.id, "task removed remotely; deleted locally");
    }

    report.tasks = store.list_tasks()?;
    Ok(report)
}
