//! Resolved settings for the GitHub device login.

use std::time::Duration;

use crate::auth::AuthError;

/// Public OAuth app used when no client id is configured.
pub const DEFAULT_CLIENT_ID: &str = "Ov23livfQfAoGENnwFcK";
pub const DEFAULT_SCOPE: &str = "read:user";
pub const DEFAULT_DEVICE_CODE_URL: &str = "https://github.com/login/device/code";
pub const DEFAULT_ACCESS_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
pub const DEFAULT_USER_URL: &str = "https://api.github.com/user";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Explicit configuration handed to [`GitHubDeviceAuth`](crate::auth::GitHubDeviceAuth).
///
/// # Example
/// ```
/// use std::time::Duration;
/// use terminalik::config::AuthConfig;
///
/// let config = AuthConfig::new("Iv1.example")
///     .with_scope("read:user repo")
///     .with_request_timeout(Duration::from_secs(5));
/// assert_eq!(config.client_id, "Iv1.example");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub client_id: String,
    pub scope: String,
    pub device_code_url: String,
    pub access_token_url: String,
    pub user_url: String,
    pub request_timeout: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CLIENT_ID)
    }
}

impl AuthConfig {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            scope: DEFAULT_SCOPE.to_string(),
            device_code_url: DEFAULT_DEVICE_CODE_URL.to_string(),
            access_token_url: DEFAULT_ACCESS_TOKEN_URL.to_string(),
            user_url: DEFAULT_USER_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn with_device_code_url(mut self, url: impl Into<String>) -> Self {
        self.device_code_url = url.into();
        self
    }

    pub fn with_access_token_url(mut self, url: impl Into<String>) -> Self {
        self.access_token_url = url.into();
        self
    }

    pub fn with_user_url(mut self, url: impl Into<String>) -> Self {
        self.user_url = url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Check the values the device-code request depends on.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.client_id.trim().is_empty() {
            return Err(AuthError::Configuration(
                "client id must not be empty".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(AuthError::Configuration(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
