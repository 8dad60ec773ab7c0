//! Configuration system (layered: code > env > config file > defaults).

pub mod auth;

pub use auth::{
    AuthConfig, DEFAULT_ACCESS_TOKEN_URL, DEFAULT_CLIENT_ID, DEFAULT_DEVICE_CODE_URL,
    DEFAULT_REQUEST_TIMEOUT, DEFAULT_SCOPE, DEFAULT_USER_URL,
};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TerminalikError};

/// Primary client id variable.
pub const CLIENT_ID_ENV: &str = "TERMINALIK_CLIENT_ID";
/// Older name still honoured when the primary one is unset.
pub const LEGACY_CLIENT_ID_ENV: &str = "CLIENT_ID";
pub const SCOPE_ENV: &str = "TERMINALIK_SCOPE";

/// On-disk settings, read from `config.toml`.
///
/// Every field is optional; unset values fall through to the defaults in
/// [`AuthConfig`].
///
/// ```toml
/// [auth]
/// client_id = "Iv1.example"
/// scope = "read:user"
/// request_timeout_secs = 10
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TerminalikConfig {
    pub auth: AuthSettings,
}

/// The `[auth]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthSettings {
    pub client_id: Option<String>,
    pub scope: Option<String>,
    pub device_code_url: Option<String>,
    pub access_token_url: Option<String>,
    pub user_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl TerminalikConfig {
    /// Default config file path (`<config dir>/terminalik/config.toml`).
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "terminalik")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load from a specific path.
    ///
    /// Returns the defaults if the file does not exist.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(TerminalikError::Io(err)),
        };
        toml::from_str(&raw).map_err(|e| {
            TerminalikError::Configuration(format!("Invalid config file {}: {e}", path.display()))
        })
    }

    /// Load the file (explicit path or the default location), then apply
    /// the process environment, including a `.env` file if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load_from_path(path)?,
            None => match Self::default_path() {
                Some(path) => Self::load_from_path(path)?,
                None => Self::default(),
            },
        };
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                tracing::warn!(error = %err, "ignoring unreadable .env file");
            }
        }
        Ok(config.with_env(|key| std::env::var(key).ok()))
    }

    /// Overlay environment values using `lookup` (injectable for tests).
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(client_id) = non_empty(CLIENT_ID_ENV).or_else(|| non_empty(LEGACY_CLIENT_ID_ENV)) {
            self.auth.client_id = Some(client_id);
        }
        if let Some(scope) = lookup(SCOPE_ENV) {
            self.auth.scope = Some(scope);
        }
        self
    }

    /// Resolve into the explicit settings the login client is built from.
    pub fn auth_config(&self) -> AuthConfig {
        let settings = &self.auth;
        let mut config = match &settings.client_id {
            Some(client_id) => AuthConfig::new(client_id.clone()),
            None => AuthConfig::default(),
        };
        if let Some(scope) = &settings.scope {
            config = config.with_scope(scope.clone());
        }
        if let Some(url) = &settings.device_code_url {
            config = config.with_device_code_url(url.clone());
        }
        if let Some(url) = &settings.access_token_url {
            config = config.with_access_token_url(url.clone());
        }
        if let Some(url) = &settings.user_url {
            config = config.with_user_url(url.clone());
        }
        if let Some(secs) = settings.request_timeout_secs {
            config = config.with_request_timeout(Duration::from_secs(secs));
        }
        config
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
