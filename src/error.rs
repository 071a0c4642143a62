//! Error type shared by the monitor service, the session manager and the reconciler.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Request to {route} failed: {source}")]
    Transport {
        route: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Unable to decode response from {route}: {source}")]
    Decode {
        route: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Remote rejected {route} ({status}): {detail}")]
    Rejected {
        route: String,
        status: StatusCode,
        detail: String,
    },
    #[error("Monitor not found: {0}")]
    NotFound(String),
    #[error("Monitor has no remote id: {0}")]
    MissingId(String),
    #[error("Authentication failed after {attempts} attempt(s): {last}")]
    AuthFailed {
        attempts: u32,
        #[source]
        last: Box<SyncError>,
    },
}

impl SyncError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::AuthFailed { .. })
    }

    /// HTTP status the remote answered with, when there was an answer at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Transport { source, .. } => source.status(),
            Self::AuthFailed { last, .. } => last.status(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
