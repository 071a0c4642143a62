pub mod uptime_kuma;

use crate::config::HttpConfig;
use crate::data::Monitor;
use crate::error::{Result, SyncError};
use anyhow::Context;
use async_trait::async_trait;
use std::time::Duration;

/// Build the HTTP client shared by every request of one service instance.
pub fn build_http_client(config: &HttpConfig) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .pool_max_idle_per_host(5)
        .user_agent(concat!("uptime-sync/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create HTTP client")
}

/// What `update` ended up doing on the remote side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Nothing drifted, no request was sent
    Unchanged,
    Patched,
}

/// CRUD surface a reconciliation loop drives.
#[async_trait]
pub trait MonitorService: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Monitor>>;

    /// First monitor whose name matches exactly.
    async fn get_by_name(&self, name: &str) -> Result<Monitor> {
        self.get_all()
            .await?
            .into_iter()
            .find(|m| m.name == name)
            .ok_or_else(|| SyncError::NotFound(name.to_string()))
    }

    async fn add(&self, monitor: &Monitor) -> Result<()>;

    async fn update(&self, monitor: &Monitor) -> Result<UpdateOutcome>;

    async fn remove(&self, monitor: &Monitor) -> Result<()>;

    /// Whether two monitors are in sync. Ignores `id` (remote-assigned)
    /// and `config`.
    fn equal(&self, a: &Monitor, b: &Monitor) -> bool {
        monitors_equal(a, b)
    }
}

pub fn monitors_equal(a: &Monitor, b: &Monitor) -> bool {
    a.name == b.name && a.url == b.url
}
