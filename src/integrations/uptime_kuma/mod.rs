//! Uptime Kuma integration
//!
//! Talks to the Uptime Kuma REST API wrapper (`/login/access-token/`,
//! `/monitors/`, `/info/`). Every operation is a single request, preceded by
//! the session's token probe.
//!
//! `update` only detects URL drift. Tunables of an existing monitor are never
//! compared or patched; change them by removing and re-adding the monitor.

pub mod mapper;
pub mod schema;
pub mod session;

use crate::config::{Config, HttpConfig, Provider, RetryConfig};
use crate::data::Monitor;
use crate::error::{Result, SyncError};
use crate::integrations::{build_http_client, MonitorService, UpdateOutcome};
use async_trait::async_trait;
use reqwest::Method;
use schema::{MonitorList, MonitorPatch, RemoteMonitor};
use session::{send, send_expecting_ok, Session};
use tracing::Span;

pub const MONITORS_ROUTE: &str = "/monitors/";

fn monitor_route(id: &str) -> String {
    format!("/monitors/{}", id)
}

/// Options for building a service, besides the provider credentials.
#[derive(Debug, Clone, Default)]
pub struct ServiceOptions {
    pub http: HttpConfig,
    pub auth_retry: RetryConfig,
}

impl From<&Config> for ServiceOptions {
    fn from(config: &Config) -> Self {
        Self {
            http: config.http.clone(),
            auth_retry: config.auth_retry.clone(),
        }
    }
}

#[derive(Debug)]
pub struct UptimeKumaService {
    session: Session,
    span: Span,
}

impl UptimeKumaService {
    /// Store the provider credentials and authenticate.
    pub async fn setup(provider: &Provider, options: ServiceOptions) -> anyhow::Result<Self> {
        let client = build_http_client(&options.http)?;
        let service = Self::with_client(client, provider, options.auth_retry);
        service.session.authenticate().await?;
        tracing::info!(
            "Connected to {} ({}) as {}",
            provider.name,
            service.session.base_url(),
            service.session.username()
        );
        Ok(service)
    }

    /// Unauthenticated service on an existing client. The first operation
    /// logs in.
    pub fn with_client(client: reqwest::Client, provider: &Provider, retry: RetryConfig) -> Self {
        let span = tracing::info_span!("uptime_kuma", provider = %provider.name);
        Self {
            session: Session::new(client, provider, retry),
            span,
        }
    }

    /// Record this service's operations under `span` instead of the default one.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    async fn fetch_remote(&self) -> Result<Vec<RemoteMonitor>> {
        let builder = self.session.request(Method::GET, MONITORS_ROUTE).await?;
        let list: MonitorList = send_expecting_ok(MONITORS_ROUTE, builder).await?;
        Ok(list.monitors)
    }

    #[tracing::instrument(parent = &self.span, skip_all)]
    pub async fn get_all(&self) -> Result<Vec<Monitor>> {
        match self.fetch_remote().await {
            Ok(remotes) => {
                tracing::debug!("Fetched {} monitor(s)", remotes.len());
                Ok(mapper::to_domain_batch(remotes))
            }
            Err(e) => {
                tracing::error!("Unable to retrieve monitors list: {}", e);
                Err(e)
            }
        }
    }

    #[tracing::instrument(parent = &self.span, skip_all, fields(monitor = %monitor.name))]
    pub async fn add(&self, monitor: &Monitor) -> Result<()> {
        let body = mapper::to_remote(monitor);
        let builder = self
            .session
            .request(Method::POST, MONITORS_ROUTE)
            .await?
            .json(&body);

        if let Err(e) = send(MONITORS_ROUTE, builder).await {
            tracing::error!("Unable to create monitor {}: {}", monitor.name, e);
            return Err(e);
        }

        tracing::info!("Created monitor {} ({})", monitor.name, monitor.url);
        Ok(())
    }

    #[tracing::instrument(parent = &self.span, skip_all, fields(monitor = %monitor.name))]
    pub async fn update(&self, monitor: &Monitor) -> Result<UpdateOutcome> {
        let existing = match self.fetch_remote().await {
            Ok(remotes) => remotes.into_iter().find(|m| m.name == monitor.name),
            Err(e) => {
                tracing::error!("Unable to retrieve monitors list: {}", e);
                return Err(e);
            }
        };
        let Some(existing) = existing else {
            tracing::error!("Unable to find monitor {} to update", monitor.name);
            return Err(SyncError::NotFound(monitor.name.clone()));
        };
        let Some(id) = existing.id else {
            return Err(SyncError::MissingId(existing.name));
        };

        let mut patch = MonitorPatch {
            name: existing.name,
            monitor_type: existing.monitor_type,
            method: existing.method,
            url: existing.url,
        };
        let mut dirty = false;

        if patch.url != monitor.url {
            patch.url = monitor.url.clone();
            dirty = true;
        }

        if !dirty {
            tracing::debug!("Monitor {} is up to date", monitor.name);
            return Ok(UpdateOutcome::Unchanged);
        }

        let route = monitor_route(&id.to_string());
        let builder = self
            .session
            .request(Method::PATCH, &route)
            .await?
            .json(&patch);

        if let Err(e) = send(&route, builder).await {
            tracing::error!("Unable to update monitor {}: {}", monitor.name, e);
            return Err(e);
        }

        tracing::info!("Updated monitor {} to {}", monitor.name, monitor.url);
        Ok(UpdateOutcome::Patched)
    }

    #[tracing::instrument(parent = &self.span, skip_all, fields(monitor = %monitor.name, id = %monitor.id))]
    pub async fn remove(&self, monitor: &Monitor) -> Result<()> {
        if monitor.id.is_empty() {
            tracing::error!("Unable to remove monitor {}: no remote id", monitor.name);
            return Err(SyncError::MissingId(monitor.name.clone()));
        }

        let route = monitor_route(&monitor.id);
        let builder = self.session.request(Method::DELETE, &route).await?;

        if let Err(e) = send(&route, builder).await {
            tracing::error!("Unable to remove monitor {} {}: {}", monitor.name, monitor.id, e);
            return Err(e);
        }

        tracing::info!("Removed monitor {} {}", monitor.name, monitor.id);
        Ok(())
    }
}

#[async_trait]
impl MonitorService for UptimeKumaService {
    async fn get_all(&self) -> Result<Vec<Monitor>> {
        UptimeKumaService::get_all(self).await
    }

    async fn add(&self, monitor: &Monitor) -> Result<()> {
        UptimeKumaService::add(self, monitor).await
    }

    async fn update(&self, monitor: &Monitor) -> Result<UpdateOutcome> {
        UptimeKumaService::update(self, monitor).await
    }

    async fn remove(&self, monitor: &Monitor) -> Result<()> {
        UptimeKumaService::remove(self, monitor).await
    }
}
