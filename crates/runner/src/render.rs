#![forbid(unsafe_code)]

use dispatch_core::PendingIntent;
use dispatch_sync::{CycleOutcome, PullPhase, PushReport, RemoteConfig};
use serde_json::{Value, json};

pub(crate) fn intent_json(intent: &PendingIntent) -> Value {
    json!({
        "seq": intent.seq.get(),
        "taskId": intent.task_id.as_str(),
        "operation": intent.operation().as_str(),
        "enqueuedAt": intent.enqueued_at.as_str(),
    })
}

pub(crate) fn remote_json(remote: Option<&RemoteConfig>) -> Value {
    match remote {
        None => json!({ "configured": false }),
        Some(remote) => json!({
            "configured": true,
            "baseUrl": remote.base_url(),
            "spreadsheetId": remote.spreadsheet_id(),
            "sheetName": remote.sheet_name(),
            "timeoutMs": u64::try_from(remote.timeout().as_millis()).unwrap_or(u64::MAX),
        }),
    }
}

fn push_json(push: &PushReport) -> Value {
    let failures = push
        .failures
        .iter()
        .map(|failure| {
            json!({
                "seq": failure.seq.get(),
                "taskId": failure.task_id.as_str(),
                "operation": failure.operation.as_str(),
                "error": failure.error.to_string(),
            })
        })
        .collect::<Vec<_>>();
    json!({
        "synced": push.synced,
        "errors": push.errors,
        "alreadySatisfied": push.already_satisfied,
        "failures": failures,
    })
}

fn pull_json(pull: &PullPhase) -> Value {
    match pull {
        PullPhase::Reconciled(report) => json!({
            "status": "reconciled",
            "tasks": report.tasks.len(),
            "inserted": report.inserted,
            "overwritten": report.overwritten,
            "unchanged": report.unchanged,
            "keptLocal": report.kept_local,
            "removed": report.removed,
            "repaired": report.repaired,
            "skippedRows": report.skipped_rows,
        }),
        PullPhase::Unreachable(err) => json!({
            "status": "unreachable",
            "error": err.to_string(),
        }),
    }
}

pub(crate) fn cycle_json(outcome: &CycleOutcome) -> Value {
    match outcome {
        CycleOutcome::Skipped => json!({ "skipped": true }),
        CycleOutcome::Completed(report) => json!({
            "skipped": false,
            "configured": report.configured,
            "push": push_json(&report.push),
            "pull": pull_json(&report.pull),
        }),
    }
}
