//! Presenter seam for the device flow.
//!
//! The flow runs off the UI task. [`ChannelPresenter`] turns presenter calls
//! into [`FlowEvent`]s so that whichever task owns the display applies them.

use tokio::sync::mpsc;
use tracing::debug;

/// Receives user-facing updates from a running device flow.
pub trait Presenter: Send + Sync {
    /// Show where to go and which code to enter.
    fn show_verification(&self, verification_uri: &str, user_code: &str);
    /// Replace the current status line.
    fn set_status(&self, text: &str);
}

/// A presenter update, as delivered to the UI-owning task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEvent {
    Verification {
        verification_uri: String,
        user_code: String,
    },
    Status(String),
}

/// Presenter that forwards every update over an unbounded channel.
///
/// The receiver sees the channel close once the presenter is dropped, which
/// happens when the flow task finishes.
///
/// # Example
/// ```
/// use terminalik::auth::{ChannelPresenter, FlowEvent, Presenter};
///
/// let (presenter, mut events) = ChannelPresenter::new();
/// presenter.set_status("Waiting for authorization...");
/// assert_eq!(
///     events.try_recv().ok(),
///     Some(FlowEvent::Status("Waiting for authorization...".to_string()))
/// );
/// ```
#[derive(Debug, Clone)]
pub struct ChannelPresenter {
    tx: mpsc::UnboundedSender<FlowEvent>,
}

impl ChannelPresenter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<FlowEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: FlowEvent) {
        if self.tx.send(event).is_err() {
            debug!("presenter receiver dropped; update discarded");
        }
    }
}

impl Presenter for ChannelPresenter {
    fn show_verification(&self, verification_uri: &str, user_code: &str) {
        self.send(FlowEvent::Verification {
            verification_uri: verification_uri.to_string(),
            user_code: user_code.to_string(),
        });
    }

    fn set_status(&self, text: &str) {
        self.send(FlowEvent::Status(text.to_string()));
    }
}
