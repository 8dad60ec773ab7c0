//! CLI auth command handlers.

use std::io::Write;

use tracing::warn;

use crate::auth::{
    AuthError, ChannelPresenter, DeviceFlow, FlowEvent, GitHubDeviceAuth, Identity,
};
use crate::cli::LoginArgs;
use crate::config::{AuthConfig, TerminalikConfig};
use crate::error::{Result, TerminalikError};

/// Handle `terminalik auth login`.
///
/// The flow runs on its own task; this task owns the terminal and renders
/// the events it forwards. Ctrl-C aborts the flow between polls.
pub async fn handle_login(args: &LoginArgs, config: &TerminalikConfig) -> Result<Identity> {
    let auth = login_client(args, config)?;
    let flow = DeviceFlow::new(auth);
    let (presenter, mut events) = ChannelPresenter::new();
    let worker = tokio::spawn(async move { flow.run(&presenter).await });

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut watch_ctrl_c = true;
    let mut stdout = std::io::stdout();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => {
                    render_event(&event, &mut stdout)?;
                    if args.open {
                        open_verification_page(&event);
                    }
                }
                None => break,
            },
            signal = &mut ctrl_c, if watch_ctrl_c => match signal {
                Ok(()) => {
                    worker.abort();
                    return Err(TerminalikError::Cancelled);
                }
                Err(err) => {
                    warn!(error = %err, "cannot listen for Ctrl-C");
                    watch_ctrl_c = false;
                }
            },
        }
    }

    let identity = worker
        .await
        .map_err(|e| TerminalikError::InvalidState(format!("login task failed: {e}")))??;
    Ok(identity)
}

/// Build the login client, reporting bad settings before any flow output.
fn login_client(args: &LoginArgs, config: &TerminalikConfig) -> Result<GitHubDeviceAuth> {
    let auth = login_config(args, config);
    auth.validate()
        .and_then(|()| GitHubDeviceAuth::new(auth))
        .map_err(|err| match err {
            AuthError::Configuration(msg) => TerminalikError::Configuration(msg),
            other => other.into(),
        })
}

/// Apply command-line overrides on top of the file/env configuration.
fn login_config(args: &LoginArgs, config: &TerminalikConfig) -> AuthConfig {
    let mut auth = config.auth_config();
    if let Some(client_id) = &args.client_id {
        auth.client_id = client_id.clone();
    }
    if let Some(scope) = &args.scope {
        auth.scope = scope.clone();
    }
    auth
}

fn render_event(event: &FlowEvent, out: &mut impl Write) -> std::io::Result<()> {
    match event {
        FlowEvent::Verification {
            verification_uri,
            user_code,
        } => {
            writeln!(out, "🔗 Visit: {verification_uri}")?;
            writeln!(out)?;
            writeln!(out, "    {}", spaced_code(user_code))?;
            writeln!(out)?;
        }
        FlowEvent::Status(text) => writeln!(out, "{text}")?,
    }
    out.flush()
}

/// `ABCD-1234` -> `A B C D - 1 2 3 4`, easier to read off a terminal.
fn spaced_code(code: &str) -> String {
    code.chars()
        .map(String::from)
        .collect::<Vec<_>>()
        .join(" ")
}

fn open_verification_page(event: &FlowEvent) {
    if let FlowEvent::Verification {
        verification_uri, ..
    } = event
    {
        if let Err(err) = open::that(verification_uri) {
            warn!(error = %err, "failed to open browser");
            eprintln!("⚠️  Could not open a browser: {err}");
        }
    }
}
