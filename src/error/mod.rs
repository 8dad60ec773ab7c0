//! Error types for Terminalik.

use thiserror::Error;

use crate::auth::AuthError;

/// Primary error type for Terminalik operations.
#[derive(Error, Debug)]
pub enum TerminalikError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Login cancelled")]
    Cancelled,

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl From<toml::de::Error> for TerminalikError {
    fn from(error: toml::de::Error) -> Self {
        Self::Configuration(error.to_string())
    }
}

impl From<toml::ser::Error> for TerminalikError {
    fn from(error: toml::ser::Error) -> Self {
        Self::Configuration(error.to_string())
    }
}

impl TerminalikError {
    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Cancelled => 130,
            Self::Configuration(_) => 2,
            _ => 1,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, TerminalikError>;
