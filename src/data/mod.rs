use serde::{Deserialize, Serialize};

/// A monitor as the rest of the system sees it, independent of any provider.
///
/// `name` is the identity used for reconciliation. `id` is assigned by the
/// remote service and stays empty until the monitor has been created there.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Monitor {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<MonitorConfig>,
}

impl Monitor {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            url: url.into(),
            config: None,
        }
    }

    pub fn with_config(mut self, config: MonitorConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Uptime Kuma tunables, if this monitor carries them.
    pub fn uptime_kuma_config(&self) -> Option<&UptimeKumaConfig> {
        self.config.as_ref().and_then(MonitorConfig::as_uptime_kuma)
    }
}

/// Provider-specific monitor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum MonitorConfig {
    UptimeKuma(UptimeKumaConfig),
}

impl MonitorConfig {
    pub fn as_uptime_kuma(&self) -> Option<&UptimeKumaConfig> {
        match self {
            Self::UptimeKuma(config) => Some(config),
        }
    }
}

impl From<UptimeKumaConfig> for MonitorConfig {
    fn from(config: UptimeKumaConfig) -> Self {
        Self::UptimeKuma(config)
    }
}

/// Uptime Kuma tunables. `None` means "use the default", so an explicit
/// `Some(false)` or `Some(0)` is still applied when the monitor is created.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UptimeKumaConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resend_interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_tls: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upside_down: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_redirects: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_status_codes: Option<Vec<String>>,
    /// Notify when the certificate is about to expire
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_expire: Option<bool>,
}
