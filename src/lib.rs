//! Terminalik: GitHub device login for terminal tooling
//!
//! Runs the OAuth 2.0 Device Authorization Grant against GitHub and returns
//! the signed-in account. The flow reports progress through a
//! [`Presenter`](auth::Presenter), so it can run on a background task while
//! another task owns the terminal.
//!
//! # Quick Start
//!
//! ```no_run
//! use terminalik::auth::{ChannelPresenter, DeviceFlow, FlowEvent, GitHubDeviceAuth};
//! use terminalik::config::TerminalikConfig;
//!
//! # async fn example() -> terminalik::error::Result<()> {
//! let config = TerminalikConfig::load(None)?;
//! let flow = DeviceFlow::new(GitHubDeviceAuth::new(config.auth_config())?);
//! let (presenter, mut events) = ChannelPresenter::new();
//! let login = tokio::spawn(async move { flow.run(&presenter).await });
//! while let Some(event) = events.recv().await {
//!     if let FlowEvent::Status(text) = event {
//!         println!("{text}");
//!     }
//! }
//! let identity = login.await.expect("login task")?;
//! println!("{}", identity.login);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;

#[cfg(feature = "cli")]
pub mod cli;
