//! Test utilities and fixtures for uptime-sync tests

#![allow(dead_code)]

use mockito::{Mock, Server, ServerGuard};
use serde_json::{json, Value};
use uptime_sync::config::{HttpConfig, Provider, RetryConfig};
use uptime_sync::integrations::uptime_kuma::{ServiceOptions, UptimeKumaService};

pub const TOKEN: &str = "test-token";

pub fn provider(api_url: String) -> Provider {
    Provider {
        name: "UptimeKumaApi".to_string(),
        api_url,
        username: "admin".to_string(),
        password: "admin-password".to_string(),
    }
}

/// Options with millisecond backoff so failing logins don't slow tests down
pub fn fast_options() -> ServiceOptions {
    ServiceOptions {
        http: HttpConfig {
            timeout_secs: 5,
            connect_timeout_secs: 5,
        },
        auth_retry: RetryConfig {
            max_attempts: 2,
            initial_backoff_ms: 1,
            max_backoff_ms: 2,
        },
    }
}

pub async fn mock_login(server: &mut Server, token: &str) -> Mock {
    server
        .mock("POST", "/login/access-token/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "access_token": token, "token_type": "bearer" }).to_string())
        .create_async()
        .await
}

pub async fn mock_info_ok(server: &mut Server) -> Mock {
    server
        .mock("GET", "/info/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"version": "1.23.11", "latestVersion": "1.23.11"}"#)
        .create_async()
        .await
}

/// Server with a working login and `/info/` check, plus a service set up against it
pub async fn authenticated_service() -> (ServerGuard, UptimeKumaService) {
    let mut server = Server::new_async().await;
    mock_login(&mut server, TOKEN).await;
    mock_info_ok(&mut server).await;

    let service = UptimeKumaService::setup(&provider(server.url()), fast_options())
        .await
        .expect("setup against mock server");
    (server, service)
}

/// A monitor record as the remote returns it
pub fn remote_monitor_json(id: i64, name: &str, url: &str) -> Value {
    json!({
        "id": id,
        "type": "http",
        "name": name,
        "url": url,
        "method": "GET",
        "interval": 60,
        "retryInterval": 60,
        "resendInterval": 0,
        "maxretries": 0,
        "ignoreTls": false,
        "upsideDown": false,
        "maxredirects": 10,
        "accepted_statuscodes": ["200-299"],
        "expiryNotification": true,
        "active": true
    })
}

pub fn monitor_list_json(monitors: Vec<Value>) -> String {
    json!({ "monitors": monitors }).to_string()
}

pub async fn mock_list(server: &mut Server, monitors: Vec<Value>) -> Mock {
    server
        .mock("GET", "/monitors/")
        .match_header("authorization", "Bearer test-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(monitor_list_json(monitors))
        .create_async()
        .await
}
