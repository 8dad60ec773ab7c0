use thiserror::Error;

/// Failures that end a device-login attempt.
///
/// Every variant is terminal for the current flow invocation. The
/// `authorization_pending` and `slow_down` provider signals are not errors;
/// they surface as [`TokenPollResult`](super::TokenPollResult) states.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Protocol error: {0}")]
    Protocol(String),
    #[error("Authorization denied: {0}")]
    Denied(String),
    #[error("Device code expired after {expires_in}s")]
    Expired { expires_in: u64 },
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Protocol(error.to_string())
        } else {
            Self::Transport(error.to_string())
        }
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::Protocol(error.to_string())
    }
}
