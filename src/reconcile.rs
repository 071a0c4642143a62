//! Converge a remote monitor set towards a declared one.

use crate::data::Monitor;
use crate::error::{Result, SyncError};
use crate::integrations::{MonitorService, UpdateOutcome};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::time::Duration;

/// What a reconciliation pass did, by monitor name.
#[derive(Debug)]
pub struct ReconcileReport {
    pub started_at: DateTime<Utc>,
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub unchanged: Vec<String>,
    pub removed: Vec<String>,
    pub failed: Vec<(String, SyncError)>,
}

impl ReconcileReport {
    fn new() -> Self {
        Self {
            started_at: Utc::now(),
            added: Vec::new(),
            updated: Vec::new(),
            unchanged: Vec::new(),
            removed: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn changes(&self) -> usize {
        self.added.len() + self.updated.len() + self.removed.len()
    }
}

enum Change {
    Added,
    Updated,
    Unchanged,
}

/// Add missing monitors, update drifted ones and, with `prune`, remove
/// remote monitors nobody declared.
///
/// Only a failure to list the remote set aborts the pass; individual
/// add/update/remove failures are recorded in the report.
pub async fn reconcile<S>(service: &S, desired: &[Monitor], prune: bool) -> Result<ReconcileReport>
where
    S: MonitorService + ?Sized,
{
    let mut report = ReconcileReport::new();

    let current = service.get_all().await?;
    // Same lookup as `get_by_name`: the first remote record with a name wins.
    let mut by_name: HashMap<&str, &Monitor> = HashMap::new();
    for monitor in &current {
        by_name.entry(monitor.name.as_str()).or_insert(monitor);
    }

    let mut declared: HashSet<&str> = HashSet::new();
    for wanted in desired {
        if !declared.insert(wanted.name.as_str()) {
            tracing::warn!("Monitor {} is declared more than once, ignoring duplicate", wanted.name);
            continue;
        }

        let outcome = match by_name.get(wanted.name.as_str()) {
            None => service.add(wanted).await.map(|()| Change::Added),
            Some(existing) if service.equal(existing, wanted) => Ok(Change::Unchanged),
            Some(_) => service.update(wanted).await.map(|outcome| match outcome {
                UpdateOutcome::Patched => Change::Updated,
                UpdateOutcome::Unchanged => Change::Unchanged,
            }),
        };

        let name = wanted.name.clone();
        match outcome {
            Ok(Change::Added) => report.added.push(name),
            Ok(Change::Updated) => report.updated.push(name),
            Ok(Change::Unchanged) => report.unchanged.push(name),
            Err(e) => {
                tracing::warn!("Failed to reconcile monitor {}: {}", name, e);
                report.failed.push((name, e));
            }
        }
    }

    if prune {
        for stale in current.iter().filter(|m| !declared.contains(m.name.as_str())) {
            match service.remove(stale).await {
                Ok(()) => report.removed.push(stale.name.clone()),
                Err(e) => {
                    tracing::warn!("Failed to remove monitor {}: {}", stale.name, e);
                    report.failed.push((stale.name.clone(), e));
                }
            }
        }
    }

    tracing::info!(
        "Reconciled {} declared monitor(s) in {}ms (started {}): {} added, {} updated, {} removed, {} failed",
        declared.len(),
        (Utc::now() - report.started_at).num_milliseconds(),
        report.started_at.to_rfc3339(),
        report.added.len(),
        report.updated.len(),
        report.removed.len(),
        report.failed.len()
    );

    Ok(report)
}

/// Run `reconcile` every `every` until `shutdown` resolves.
///
/// The shutdown future is polled against the running pass as well as the
/// wait between passes, so an in-flight pass is dropped as soon as it fires.
/// A failed pass is logged and retried on the next tick.
pub async fn watch<S, F>(service: &S, desired: &[Monitor], prune: bool, every: Duration, shutdown: F)
where
    S: MonitorService + ?Sized,
    F: Future,
{
    let mut interval = tokio::time::interval(every.max(Duration::from_millis(1)));
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Shutdown requested, stopping watch");
                return;
            }
            result = async {
                interval.tick().await;
                reconcile(service, desired, prune).await
            } => {
                if let Err(e) = result {
                    tracing::warn!("Reconciliation pass failed: {}", e);
                }
            }
        }
    }
}
