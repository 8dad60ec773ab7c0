#![allow(dead_code)]

use std::time::Duration;

use terminalik::auth::{FlowEvent, GitHubDeviceAuth};
use terminalik::config::AuthConfig;
use tokio::sync::mpsc::UnboundedReceiver;
use wiremock::MockServer;

pub const DEVICE_CODE_PATH: &str = "/login/device/code";
pub const ACCESS_TOKEN_PATH: &str = "/login/oauth/access_token";
pub const USER_PATH: &str = "/user";

pub fn auth_config(server: &MockServer) -> AuthConfig {
    AuthConfig::new("test-client")
        .with_device_code_url(format!("{}{DEVICE_CODE_PATH}", server.uri()))
        .with_access_token_url(format!("{}{ACCESS_TOKEN_PATH}", server.uri()))
        .with_user_url(format!("{}{USER_PATH}", server.uri()))
        .with_request_timeout(Duration::from_secs(2))
}

pub fn github_auth(server: &MockServer) -> GitHubDeviceAuth {
    GitHubDeviceAuth::new(auth_config(server)).expect("http client")
}

/// Collect everything the flow sent; the channel is closed once the
/// presenter has been dropped.
pub fn drain(events: &mut UnboundedReceiver<FlowEvent>) -> Vec<FlowEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

pub fn statuses(events: &[FlowEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            FlowEvent::Status(text) => Some(text.clone()),
            _ => None,
        })
        .collect()
}
