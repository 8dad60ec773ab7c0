use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use strum::EnumString;
use tracing::debug;

use crate::auth::device_code::{DeviceAuthorization, Identity, TokenPollResult};
use crate::auth::error::AuthError;
use crate::auth::provider::DeviceAuthProvider;
use crate::config::AuthConfig;

const DEVICE_CODE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";
const USER_AGENT: &str = concat!("terminalik/", env!("CARGO_PKG_VERSION"));

/// GitHub device-code login client.
///
/// # Example
/// ```no_run
/// use terminalik::auth::GitHubDeviceAuth;
/// use terminalik::config::AuthConfig;
///
/// let auth = GitHubDeviceAuth::new(AuthConfig::new("Iv1.example"))?;
/// # Ok::<(), terminalik::auth::AuthError>(())
/// ```
pub struct GitHubDeviceAuth {
    client: reqwest::Client,
    config: AuthConfig,
}

impl GitHubDeviceAuth {
    pub fn new(config: AuthConfig) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AuthError::Configuration(format!("HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub async fn request_device_code(&self) -> Result<DeviceAuthorization, AuthError> {
        self.config.validate()?;
        debug!(url = %self.config.device_code_url, "requesting device code");
        let resp = self
            .client
            .post(&self.config.device_code_url)
            .header(ACCEPT, "application/json")
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("scope", self.config.scope.as_str()),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AuthError::Transport(format!(
                "Device code request failed with status {}",
                resp.status()
            )));
        }
        let body = resp.text().await?;
        let authorization = parse_device_code_response(&body)?;
        debug!(
            interval_secs = authorization.interval_secs(),
            expires_in_secs = authorization.expires_in_secs(),
            "device code issued"
        );
        Ok(authorization)
    }

    pub async fn poll_for_token(&self, device_code: &str) -> Result<TokenPollResult, AuthError> {
        let resp = self
            .client
            .post(&self.config.access_token_url)
            .header(ACCEPT, "application/json")
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("device_code", device_code),
                ("grant_type", DEVICE_CODE_GRANT_TYPE),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AuthError::Transport(format!(
                "Device token request failed with status {}",
                resp.status()
            )));
        }
        let body = resp.text().await?;
        parse_token_response(&body)
    }

    pub async fn fetch_identity(&self, access_token: &str) -> Result<Identity, AuthError> {
        let resp = self
            .client
            .get(&self.config.user_url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, format!("Bearer {access_token}"))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AuthError::Transport(format!(
                "Profile request failed with status {}",
                resp.status()
            )));
        }
        let body = resp.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| AuthError::Protocol(format!("Profile response malformed: {e}")))
    }
}

#[async_trait]
impl DeviceAuthProvider for GitHubDeviceAuth {
    fn provider_name(&self) -> &str {
        "github"
    }

    async fn request_device_code(&self) -> Result<DeviceAuthorization, AuthError> {
        GitHubDeviceAuth::request_device_code(self).await
    }

    async fn poll_for_token(&self, device_code: &str) -> Result<TokenPollResult, AuthError> {
        GitHubDeviceAuth::poll_for_token(self, device_code).await
    }

    async fn fetch_identity(&self, access_token: &str) -> Result<Identity, AuthError> {
        GitHubDeviceAuth::fetch_identity(self, access_token).await
    }
}

#[derive(Debug, Deserialize)]
struct GitHubDeviceCodeResponse {
    device_code: Option<String>,
    user_code: Option<String>,
    verification_uri: Option<String>,
    interval: Option<u64>,
    expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct GitHubDeviceTokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Poll errors that mean "keep going" rather than "stop".
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "snake_case")]
enum TransientPollError {
    AuthorizationPending,
    SlowDown,
}

fn parse_device_code_response(body: &str) -> Result<DeviceAuthorization, AuthError> {
    let payload: GitHubDeviceCodeResponse = serde_json::from_str(body)
        .map_err(|e| AuthError::Protocol(format!("Device code response malformed: {e}")))?;
    let device_code = required_field(payload.device_code, "device_code")?;
    let user_code = required_field(payload.user_code, "user_code")?;
    let verification_uri = required_field(payload.verification_uri, "verification_uri")?;
    Ok(DeviceAuthorization::new(
        device_code,
        user_code,
        verification_uri,
        payload.interval,
        payload.expires_in,
    ))
}

fn required_field(value: Option<String>, name: &str) -> Result<String, AuthError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AuthError::Protocol(format!(
            "Device code response missing {name}"
        ))),
    }
}

fn parse_token_response(body: &str) -> Result<TokenPollResult, AuthError> {
    let payload: GitHubDeviceTokenResponse = serde_json::from_str(body)
        .map_err(|e| AuthError::Protocol(format!("Device token response malformed: {e}")))?;
    if let Some(access_token) = payload.access_token {
        return Ok(TokenPollResult::Granted { access_token });
    }
    let Some(error) = payload.error else {
        return Err(AuthError::Protocol(
            "Device token response missing token and error".to_string(),
        ));
    };
    match error.parse::<TransientPollError>() {
        Ok(TransientPollError::AuthorizationPending) => Ok(TokenPollResult::Pending),
        Ok(TransientPollError::SlowDown) => Ok(TokenPollResult::SlowDown),
        Err(_) => {
            debug!(
                error = %error,
                description = payload.error_description.as_deref().unwrap_or(""),
                "device token request rejected"
            );
            Ok(TokenPollResult::Denied { reason: error })
        }
    }
}
