use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Polling interval used when the provider omits one.
pub const DEFAULT_INTERVAL_SECS: u64 = 5;

/// Device-code lifetime used when the provider omits `expires_in`.
pub const DEFAULT_EXPIRES_IN_SECS: u64 = 900;

/// Device-code grant issued by the provider for one authorization attempt.
///
/// # Example
/// ```
/// use terminalik::auth::DeviceAuthorization;
///
/// let authorization = DeviceAuthorization::new(
///     "device-code",
///     "ABCD-1234",
///     "https://github.com/login/device",
///     Some(0),
///     None,
/// );
/// assert_eq!(authorization.interval_secs(), 1);
/// assert_eq!(authorization.expires_in_secs(), 900);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceAuthorization {
    device_code: String,
    user_code: String,
    verification_uri: String,
    interval_secs: u64,
    expires_in_secs: u64,
}

impl DeviceAuthorization {
    /// Build an authorization, applying the protocol defaults.
    ///
    /// The interval is never below one second.
    pub fn new(
        device_code: impl Into<String>,
        user_code: impl Into<String>,
        verification_uri: impl Into<String>,
        interval_secs: Option<u64>,
        expires_in_secs: Option<u64>,
    ) -> Self {
        Self {
            device_code: device_code.into(),
            user_code: user_code.into(),
            verification_uri: verification_uri.into(),
            interval_secs: interval_secs.unwrap_or(DEFAULT_INTERVAL_SECS).max(1),
            expires_in_secs: expires_in_secs.unwrap_or(DEFAULT_EXPIRES_IN_SECS),
        }
    }

    pub fn device_code(&self) -> &str {
        &self.device_code
    }

    pub fn user_code(&self) -> &str {
        &self.user_code
    }

    pub fn verification_uri(&self) -> &str {
        &self.verification_uri
    }

    pub fn interval_secs(&self) -> u64 {
        self.interval_secs
    }

    pub fn expires_in_secs(&self) -> u64 {
        self.expires_in_secs
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn expires_in(&self) -> Duration {
        Duration::from_secs(self.expires_in_secs)
    }
}

/// Outcome of a single token-poll request.
#[derive(Clone, PartialEq, Eq)]
pub enum TokenPollResult {
    Pending,
    SlowDown,
    Granted { access_token: String },
    Denied { reason: String },
}

// Keeps access tokens out of logs and panic messages.
impl std::fmt::Debug for TokenPollResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => f.write_str("Pending"),
            Self::SlowDown => f.write_str("SlowDown"),
            Self::Granted { .. } => f
                .debug_struct("Granted")
                .field("access_token", &"<redacted>")
                .finish(),
            Self::Denied { reason } => f.debug_struct("Denied").field("reason", reason).finish(),
        }
    }
}

/// The signed-in account, fetched once a token has been granted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub login: String,
    pub id: u64,
}
