//! Conversions between `RemoteMonitor` and the domain `Monitor`.

use super::schema::RemoteMonitor;
use crate::data::{Monitor, MonitorConfig, UptimeKumaConfig};

pub const DEFAULT_TYPE: &str = "http";
pub const DEFAULT_METHOD: &str = "GET";
pub const DEFAULT_INTERVAL: u32 = 60;
pub const DEFAULT_RETRY_INTERVAL: u32 = 60;
pub const DEFAULT_RESEND_INTERVAL: u32 = 0;
pub const DEFAULT_MAX_RETRIES: u32 = 0;
pub const DEFAULT_MAX_REDIRECTS: u32 = 10;
pub const DEFAULT_ACCEPTED_STATUS_CODES: &[&str] = &["200-299"];

pub fn to_domain(remote: RemoteMonitor) -> Monitor {
    let config = UptimeKumaConfig {
        interval: Some(remote.interval),
        retry_interval: Some(remote.retry_interval),
        resend_interval: Some(remote.resend_interval),
        max_retries: Some(remote.max_retries),
        method: Some(remote.method),
        ignore_tls: Some(remote.ignore_tls),
        upside_down: Some(remote.upside_down),
        max_redirects: Some(remote.max_redirects),
        accepted_status_codes: Some(remote.accepted_status_codes),
        ssl_expire: Some(remote.ssl_expire),
    };

    Monitor {
        id: remote.id.map(|id| id.to_string()).unwrap_or_default(),
        name: remote.name,
        url: remote.url,
        config: Some(MonitorConfig::UptimeKuma(config)),
    }
}

pub fn to_domain_batch(remotes: Vec<RemoteMonitor>) -> Vec<Monitor> {
    remotes.into_iter().map(to_domain).collect()
}

/// Baseline record every new monitor starts from.
pub fn default_remote() -> RemoteMonitor {
    RemoteMonitor {
        id: None,
        monitor_type: DEFAULT_TYPE.to_string(),
        name: String::new(),
        interval: DEFAULT_INTERVAL,
        retry_interval: DEFAULT_RETRY_INTERVAL,
        resend_interval: DEFAULT_RESEND_INTERVAL,
        max_retries: DEFAULT_MAX_RETRIES,
        url: String::new(),
        method: DEFAULT_METHOD.to_string(),
        ignore_tls: false,
        upside_down: false,
        max_redirects: DEFAULT_MAX_REDIRECTS,
        accepted_status_codes: DEFAULT_ACCEPTED_STATUS_CODES
            .iter()
            .map(|code| code.to_string())
            .collect(),
        ssl_expire: true,
    }
}

/// Create body for `monitor`: defaults, then every supplied tunable, then
/// the monitor's name and URL.
///
/// An empty method or an empty status-code list is treated as not supplied.
pub fn to_remote(monitor: &Monitor) -> RemoteMonitor {
    let mut remote = default_remote();

    if let Some(config) = monitor.uptime_kuma_config() {
        apply_overrides(&mut remote, config);
    }

    remote.name = monitor.name.clone();
    remote.url = monitor.url.clone();
    remote
}

fn apply_overrides(remote: &mut RemoteMonitor, config: &UptimeKumaConfig) {
    if let Some(interval) = config.interval {
        remote.interval = interval;
    }
    if let Some(retry_interval) = config.retry_interval {
        remote.retry_interval = retry_interval;
    }
    if let Some(resend_interval) = config.resend_interval {
        remote.resend_interval = resend_interval;
    }
    if let Some(max_retries) = config.max_retries {
        remote.max_retries = max_retries;
    }
    if let Some(method) = config.method.as_deref().filter(|m| !m.is_empty()) {
        remote.method = method.to_string();
    }
    if let Some(ignore_tls) = config.ignore_tls {
        remote.ignore_tls = ignore_tls;
    }
    if let Some(upside_down) = config.upside_down {
        remote.upside_down = upside_down;
    }
    if let Some(max_redirects) = config.max_redirects {
        remote.max_redirects = max_redirects;
    }
    if let Some(codes) = config
        .accepted_status_codes
        .as_ref()
        .filter(|codes| !codes.is_empty())
    {
        remote.accepted_status_codes = codes.clone();
    }
    if let Some(ssl_expire) = config.ssl_expire {
        remote.ssl_expire = ssl_expire;
    }
}
