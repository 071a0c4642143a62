//! Wire format of the Uptime Kuma REST API.
//!
//! Field names are fixed by the remote service, hence the renames.

use crate::util::null_as_default;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Monitor record as sent on create and received on list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RemoteMonitor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub monitor_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub interval: u32,
    #[serde(rename = "retryInterval", default, deserialize_with = "null_as_default")]
    pub retry_interval: u32,
    #[serde(rename = "resendInterval", default, deserialize_with = "null_as_default")]
    pub resend_interval: u32,
    #[serde(rename = "maxretries", default, deserialize_with = "null_as_default")]
    pub max_retries: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub method: String,
    #[serde(rename = "ignoreTls", default, deserialize_with = "null_as_default")]
    pub ignore_tls: bool,
    #[serde(rename = "upsideDown", default, deserialize_with = "null_as_default")]
    pub upside_down: bool,
    #[serde(rename = "maxredirects", default, deserialize_with = "null_as_default")]
    pub max_redirects: u32,
    #[serde(rename = "accepted_statuscodes", default, deserialize_with = "null_as_default")]
    pub accepted_status_codes: Vec<String>,
    #[serde(rename = "expiryNotification", default, deserialize_with = "null_as_default")]
    pub ssl_expire: bool,
}

/// Response of `GET /monitors/`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonitorList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub monitors: Vec<RemoteMonitor>,
}

/// Body of `PATCH /monitors/{id}`. Only identity fields are sent so the
/// remote keeps every tunable it already has.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorPatch {
    pub name: String,
    #[serde(rename = "type")]
    pub monitor_type: String,
    pub method: String,
    pub url: String,
}

/// Response of `POST /login/access-token/`
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
}

/// Body the remote returns alongside a non-200 status.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub detail: ErrorDetail,
}

/// `detail` has changed shape across API versions: a single message, a list
/// of validation messages, or a bare string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(ErrorMessage),
    Messages(Vec<ErrorMessage>),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorMessage {
    pub msg: String,
    #[serde(default)]
    pub loc: Vec<serde_json::Value>,
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.loc.is_empty() {
            return write!(f, "{}", self.msg);
        }
        let loc = self
            .loc
            .iter()
            .map(|part| match part {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{} ({})", self.msg, loc)
    }
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(message) => write!(f, "{}", message),
            Self::Messages(messages) => {
                let joined = messages
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                write!(f, "{}", joined)
            }
            Self::Text(text) => write!(f, "{}", text),
        }
    }
}

/// Best-effort rendering of an error body: the envelope's detail when it
/// decodes, the raw body otherwise.
pub fn describe_error_body(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.detail.to_string(),
        Err(e) => {
            tracing::debug!("Unable to decode error envelope: {}", e);
            body.trim().to_string()
        }
    }
}
