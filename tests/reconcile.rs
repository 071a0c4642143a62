//! Tests for the reconciliation pass
//!
//! Drives `reconcile` with an in-memory `MonitorService` and checks which
//! calls it issues.

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use chrono::Utc;
use reqwest::StatusCode;
use std::time::Duration;
use tokio::sync::Mutex;
use uptime_sync::data::Monitor;
use uptime_sync::error::Result;
use uptime_sync::integrations::{MonitorService, UpdateOutcome};
use uptime_sync::reconcile::{reconcile, watch};
use uptime_sync::SyncError;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Add(String),
    Update(String),
    Remove(String),
}

#[derive(Default)]
struct FakeService {
    monitors: Mutex<Vec<Monitor>>,
    calls: Mutex<Vec<Call>>,
    reject_adds: bool,
    fail_listing: bool,
    hang_listing: bool,
}

impl FakeService {
    fn with_monitors(monitors: Vec<Monitor>) -> Self {
        let monitors = monitors
            .into_iter()
            .enumerate()
            .map(|(i, m)| Monitor {
                id: (i + 1).to_string(),
                ..m
            })
            .collect();
        Self {
            monitors: Mutex::new(monitors),
            ..Default::default()
        }
    }

    async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }

    async fn names(&self) -> Vec<String> {
        self.monitors
            .lock()
            .await
            .iter()
            .map(|m| m.name.clone())
            .collect()
    }
}

fn rejected(route: &str) -> SyncError {
    SyncError::Rejected {
        route: route.to_string(),
        status: StatusCode::UNPROCESSABLE_ENTITY,
        detail: "invalid".to_string(),
    }
}

#[async_trait]
impl MonitorService for FakeService {
    async fn get_all(&self) -> Result<Vec<Monitor>> {
        if self.fail_listing {
            return Err(rejected("/monitors/"));
        }
        if self.hang_listing {
            std::future::pending::<()>().await;
        }
        Ok(self.monitors.lock().await.clone())
    }

    async fn add(&self, monitor: &Monitor) -> Result<()> {
        self.calls.lock().await.push(Call::Add(monitor.name.clone()));
        if self.reject_adds {
            return Err(rejected("/monitors/"));
        }
        let mut monitors = self.monitors.lock().await;
        let id = (monitors.len() + 100).to_string();
        monitors.push(Monitor {
            id,
            ..monitor.clone()
        });
        Ok(())
    }

    async fn update(&self, monitor: &Monitor) -> Result<UpdateOutcome> {
        self.calls.lock().await.push(Call::Update(monitor.name.clone()));
        let mut monitors = self.monitors.lock().await;
        let existing = monitors
            .iter_mut()
            .find(|m| m.name == monitor.name)
            .ok_or_else(|| SyncError::NotFound(monitor.name.clone()))?;
        if existing.url == monitor.url {
            return Ok(UpdateOutcome::Unchanged);
        }
        existing.url = monitor.url.clone();
        Ok(UpdateOutcome::Patched)
    }

    async fn remove(&self, monitor: &Monitor) -> Result<()> {
        self.calls.lock().await.push(Call::Remove(monitor.name.clone()));
        self.monitors.lock().await.retain(|m| m.id != monitor.id);
        Ok(())
    }
}

#[tokio::test]
async fn test_missing_monitors_are_added() {
    let service = FakeService::default();
    let desired = vec![
        Monitor::new("google", "https://www.google.com"),
        Monitor::new("github", "https://github.com"),
    ];

    let before = Utc::now();
    let report = reconcile(&service, &desired, false).await.unwrap();

    assert!(report.started_at >= before);
    assert!(report.started_at <= Utc::now());
    assert_eq!(report.added, vec!["google", "github"]);
    assert_eq!(report.changes(), 2);
    assert!(report.is_clean());
    assert_eq!(
        service.calls().await,
        vec![Call::Add("google".into()), Call::Add("github".into())]
    );
}

#[tokio::test]
async fn test_in_sync_monitors_are_left_alone() {
    let service = FakeService::with_monitors(vec![Monitor::new("google", "https://www.google.com")]);
    let desired = vec![Monitor::new("google", "https://www.google.com")];

    let report = reconcile(&service, &desired, true).await.unwrap();

    assert_eq!(report.unchanged, vec!["google"]);
    assert_eq!(report.changes(), 0);
    assert!(service.calls().await.is_empty());
}

#[tokio::test]
async fn test_url_drift_is_updated() {
    let service = FakeService::with_monitors(vec![Monitor::new("google", "https://www.google.com")]);
    let desired = vec![Monitor::new("google", "https://google.fr")];

    let report = reconcile(&service, &desired, false).await.unwrap();

    assert_eq!(report.updated, vec!["google"]);
    assert_eq!(service.calls().await, vec![Call::Update("google".into())]);
}

#[tokio::test]
async fn test_undeclared_monitors_survive_without_prune() {
    let service = FakeService::with_monitors(vec![
        Monitor::new("google", "https://www.google.com"),
        Monitor::new("legacy", "https://legacy.example"),
    ]);
    let desired = vec![Monitor::new("google", "https://www.google.com")];

    let report = reconcile(&service, &desired, false).await.unwrap();

    assert!(report.removed.is_empty());
    assert_eq!(service.names().await, vec!["google", "legacy"]);
}

#[tokio::test]
async fn test_prune_removes_undeclared_monitors() {
    let service = FakeService::with_monitors(vec![
        Monitor::new("google", "https://www.google.com"),
        Monitor::new("legacy", "https://legacy.example"),
    ]);
    let desired = vec![Monitor::new("google", "https://www.google.com")];

    let report = reconcile(&service, &desired, true).await.unwrap();

    assert_eq!(report.removed, vec!["legacy"]);
    assert_eq!(service.calls().await, vec![Call::Remove("legacy".into())]);
    assert_eq!(service.names().await, vec!["google"]);
}

#[tokio::test]
async fn test_duplicate_declarations_are_ignored() {
    let service = FakeService::default();
    let desired = vec![
        Monitor::new("google", "https://www.google.com"),
        Monitor::new("google", "https://google.fr"),
    ];

    let report = reconcile(&service, &desired, false).await.unwrap();

    assert_eq!(report.added, vec!["google"]);
    assert_eq!(service.calls().await, vec![Call::Add("google".into())]);
}

#[tokio::test]
async fn test_per_monitor_failures_are_collected() {
    let service = FakeService {
        reject_adds: true,
        ..FakeService::with_monitors(vec![Monitor::new("github", "https://github.com")])
    };
    let desired = vec![
        Monitor::new("google", "https://www.google.com"),
        Monitor::new("github", "https://github.com/about"),
    ];

    let report = reconcile(&service, &desired, false).await.unwrap();

    assert!(!report.is_clean());
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "google");
    assert_eq!(report.updated, vec!["github"]);
}

#[tokio::test]
async fn test_listing_failure_aborts_pass() {
    let service = FakeService {
        fail_listing: true,
        ..Default::default()
    };

    let err = reconcile(&service, &[Monitor::new("google", "https://www.google.com")], true)
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Rejected { .. }));
    assert!(service.calls().await.is_empty());
}

#[tokio::test]
async fn test_reconcile_through_trait_object() {
    let service = FakeService::default();
    let dyn_service: &dyn MonitorService = &service;

    let report = reconcile(dyn_service, &[Monitor::new("google", "https://www.google.com")], false)
        .await
        .unwrap();

    assert_eq!(report.added, vec!["google"]);
}

#[tokio::test]
async fn test_duplicate_remote_names_compare_against_first() {
    let service = FakeService::with_monitors(vec![
        Monitor::new("google", "https://www.google.com"),
        Monitor::new("google", "https://google.fr"),
    ]);
    let desired = vec![Monitor::new("google", "https://www.google.com")];

    let report = reconcile(&service, &desired, false).await.unwrap();

    assert_eq!(report.unchanged, vec!["google"]);
    assert!(service.calls().await.is_empty());
}

#[tokio::test]
async fn test_watch_runs_a_pass_then_stops() {
    let service = FakeService::default();
    let desired = vec![Monitor::new("google", "https://www.google.com")];

    let shutdown = tokio::time::sleep(Duration::from_millis(100));
    tokio::time::timeout(
        Duration::from_secs(5),
        watch(&service, &desired, false, Duration::from_secs(3600), shutdown),
    )
    .await
    .unwrap();

    assert_eq!(service.calls().await, vec![Call::Add("google".into())]);
}

#[tokio::test]
async fn test_watch_shutdown_interrupts_running_pass() {
    let service = FakeService {
        hang_listing: true,
        ..Default::default()
    };
    let desired = vec![Monitor::new("google", "https://www.google.com")];

    let shutdown = tokio::time::sleep(Duration::from_millis(20));
    let stopped = tokio::time::timeout(
        Duration::from_secs(5),
        watch(&service, &desired, false, Duration::from_secs(3600), shutdown),
    )
    .await;

    assert!(stopped.is_ok(), "watch kept running after shutdown");
    assert!(service.calls().await.is_empty());
}
