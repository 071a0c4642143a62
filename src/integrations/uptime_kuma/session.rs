//! Bearer-token session against the Uptime Kuma API.
//!
//! The token has no known lifetime. Before every business request the
//! session probes `/info/` with it and logs in again when the probe is
//! refused. The token lock is held for the whole probe/login sequence, so
//! concurrent callers wait for one re-authentication instead of racing.

use super::schema::{describe_error_body, AccessToken};
use crate::config::{Provider, RetryConfig};
use crate::error::{Result, SyncError};
use reqwest::header::ACCEPT;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

pub const LOGIN_ROUTE: &str = "/login/access-token/";
pub const PROBE_ROUTE: &str = "/info/";

pub struct Session {
    client: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    retry: RetryConfig,
    token: Mutex<Option<String>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Unauthenticated session; call [`Session::authenticate`] before use.
    pub fn new(client: reqwest::Client, provider: &Provider, retry: RetryConfig) -> Self {
        Self {
            client,
            base_url: provider.api_url.trim_end_matches('/').to_string(),
            username: provider.username.clone(),
            password: provider.password.clone(),
            retry,
            token: Mutex::new(None),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.lock().await.is_some()
    }

    /// Log in, retrying with exponential backoff up to the configured
    /// number of attempts.
    pub async fn authenticate(&self) -> Result<()> {
        let mut token = self.token.lock().await;
        match self.login_with_retry().await {
            Ok(fresh) => {
                *token = Some(fresh);
                Ok(())
            }
            Err(e) => {
                *token = None;
                Err(e)
            }
        }
    }

    /// Current token if the remote still accepts it, a fresh one otherwise.
    pub async fn ensure_valid_session(&self) -> Result<String> {
        let mut token = self.token.lock().await;

        if let Some(current) = token.as_deref() {
            if self.probe(current).await? {
                return Ok(current.to_string());
            }
            tracing::info!("Access token rejected by {}, re-authenticating", self.base_url);
        } else {
            tracing::debug!("No access token yet, authenticating");
        }

        match self.login_with_retry().await {
            Ok(fresh) => {
                *token = Some(fresh.clone());
                Ok(fresh)
            }
            Err(e) => {
                *token = None;
                Err(e)
            }
        }
    }

    /// Request builder for `route` carrying a valid bearer token.
    pub async fn request(&self, method: Method, route: &str) -> Result<RequestBuilder> {
        let token = self.ensure_valid_session().await?;
        Ok(self
            .client
            .request(method, self.url(route))
            .bearer_auth(token)
            .header(ACCEPT, "application/json"))
    }

    async fn probe(&self, token: &str) -> Result<bool> {
        let response = self
            .client
            .get(self.url(PROBE_ROUTE))
            .bearer_auth(token)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| SyncError::Transport {
                route: PROBE_ROUTE.to_string(),
                source,
            })?;

        Ok(response.status() == StatusCode::OK)
    }

    async fn login_with_retry(&self) -> Result<String> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.login().await {
                Ok(token) => {
                    tracing::debug!("Authenticated as {} on attempt {}", self.username, attempt);
                    return Ok(token);
                }
                Err(e) if attempt >= max_attempts => {
                    tracing::error!(
                        "Unable to authenticate against {} after {} attempt(s): {}",
                        self.base_url,
                        attempt,
                        e
                    );
                    return Err(SyncError::AuthFailed {
                        attempts: attempt,
                        last: Box::new(e),
                    });
                }
                Err(e) => {
                    let backoff = self.retry.backoff_for(attempt);
                    tracing::warn!(
                        "Authentication attempt {}/{} failed ({}), retrying in {:?}",
                        attempt,
                        max_attempts,
                        e,
                        backoff
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn login(&self) -> Result<String> {
        let form = [
            ("grant_type", ""),
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
            ("scope", ""),
            ("client_id", ""),
            ("client_secret", ""),
        ];

        let builder = self
            .client
            .post(self.url(LOGIN_ROUTE))
            .header(ACCEPT, "application/json")
            .form(&form);

        let token: AccessToken = send_expecting_ok(LOGIN_ROUTE, builder).await?;
        Ok(token.access_token)
    }
}

/// Send a request and read the body, turning a non-200 answer into
/// `SyncError::Rejected`.
pub(crate) async fn send(route: &str, builder: RequestBuilder) -> Result<String> {
    let response = builder.send().await.map_err(|source| SyncError::Transport {
        route: route.to_string(),
        source,
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|source| SyncError::Transport {
        route: route.to_string(),
        source,
    })?;

    if status != StatusCode::OK {
        return Err(SyncError::Rejected {
            route: route.to_string(),
            status,
            detail: describe_error_body(&body),
        });
    }

    Ok(body)
}

pub(crate) async fn send_expecting_ok<T: DeserializeOwned>(
    route: &str,
    builder: RequestBuilder,
) -> Result<T> {
    let body = send(route, builder).await?;
    serde_json::from_str(&body).map_err(|source| SyncError::Decode {
        route: route.to_string(),
        source,
    })
}
