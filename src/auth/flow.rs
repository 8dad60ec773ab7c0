//! Device authorization grant orchestration.
//!
//! [`DeviceFlow::run`] drives one login attempt from device-code request to
//! identity lookup. It reports progress through a [`Presenter`] and never
//! touches UI state itself.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::device_code::{DeviceAuthorization, Identity, TokenPollResult};
use super::error::AuthError;
use super::presenter::Presenter;
use super::provider::DeviceAuthProvider;

/// Amount added to the polling interval on every `slow_down` signal.
pub const SLOW_DOWN_INCREMENT: Duration = Duration::from_secs(5);

/// Runs the device authorization grant against a [`DeviceAuthProvider`].
///
/// Each call to [`run`](Self::run) requests its own device code, so one
/// `DeviceFlow` may serve several concurrent logins. Dropping the future
/// abandons the attempt; the protocol has no server-side cancel.
///
/// # Example
/// ```no_run
/// use terminalik::auth::{ChannelPresenter, DeviceFlow, GitHubDeviceAuth};
/// use terminalik::config::AuthConfig;
///
/// # async fn example() -> Result<(), terminalik::auth::AuthError> {
/// let flow = DeviceFlow::new(GitHubDeviceAuth::new(AuthConfig::default())?);
/// let (presenter, _events) = ChannelPresenter::new();
/// let identity = flow.run(&presenter).await?;
/// println!("{} ({})", identity.login, identity.id);
/// # Ok(())
/// # }
/// ```
pub struct DeviceFlow<P> {
    provider: P,
    slow_down_increment: Duration,
}

impl<P: DeviceAuthProvider> DeviceFlow<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            slow_down_increment: SLOW_DOWN_INCREMENT,
        }
    }

    /// Override the `slow_down` backoff step (never below one second).
    pub fn with_slow_down_increment(mut self, increment: Duration) -> Self {
        self.slow_down_increment = increment.max(Duration::from_secs(1));
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Run one complete login attempt.
    ///
    /// The presenter gets the verification pair exactly once, before the
    /// first poll, and a single final status line on success or failure.
    pub async fn run(&self, presenter: &dyn Presenter) -> Result<Identity, AuthError> {
        let span = info_span!(
            "device_flow",
            flow_id = %Uuid::new_v4(),
            provider = self.provider.provider_name()
        );
        let result = self.authorize(presenter).instrument(span).await;
        match &result {
            Ok(identity) => presenter.set_status(&format!(
                "Logged in as {} (ID: {})",
                identity.login, identity.id
            )),
            Err(e) => presenter.set_status(&format!("Auth failed: {e}")),
        }
        result
    }

    async fn authorize(&self, presenter: &dyn Presenter) -> Result<Identity, AuthError> {
        presenter.set_status("Requesting device code...");
        let authorization = self.provider.request_device_code().await?;
        let issued_at = Instant::now();

        presenter.show_verification(authorization.verification_uri(), authorization.user_code());
        presenter.set_status(&verification_prompt(&authorization));
        info!(
            expires_in_secs = authorization.expires_in_secs(),
            "waiting for user authorization"
        );

        let access_token = self.await_token(&authorization, issued_at, presenter).await?;

        presenter.set_status("Authorized. Fetching profile...");
        let identity = self.provider.fetch_identity(&access_token).await?;
        info!(login = %identity.login, "device login complete");
        Ok(identity)
    }

    async fn await_token(
        &self,
        authorization: &DeviceAuthorization,
        issued_at: Instant,
        presenter: &dyn Presenter,
    ) -> Result<String, AuthError> {
        let lifetime = authorization.expires_in();
        let mut interval = authorization.interval();
        let mut polls: u32 = 0;

        loop {
            if issued_at.elapsed() >= lifetime {
                warn!(polls, "device code expired before authorization");
                return Err(AuthError::Expired {
                    expires_in: authorization.expires_in_secs(),
                });
            }

            polls += 1;
            match self
                .provider
                .poll_for_token(authorization.device_code())
                .await?
            {
                TokenPollResult::Granted { access_token } => {
                    debug!(polls, "access token granted");
                    return Ok(access_token);
                }
                TokenPollResult::Pending => {
                    debug!(polls, interval_secs = interval.as_secs(), "authorization pending");
                }
                TokenPollResult::SlowDown => {
                    interval = interval.saturating_add(self.slow_down_increment);
                    warn!(polls, interval_secs = interval.as_secs(), "provider asked to slow down");
                    presenter.set_status(&format!(
                        "Polling too fast; checking every {}s",
                        interval.as_secs()
                    ));
                }
                TokenPollResult::Denied { reason } => {
                    warn!(polls, reason = %reason, "authorization denied");
                    return Err(AuthError::Denied(reason));
                }
            }

            // Wake no later than expiry so it is reported on time.
            let remaining = lifetime.saturating_sub(issued_at.elapsed());
            tokio::time::sleep(interval.min(remaining)).await;
        }
    }
}

fn verification_prompt(authorization: &DeviceAuthorization) -> String {
    let deadline = i64::try_from(authorization.expires_in_secs())
        .ok()
        .and_then(chrono::TimeDelta::try_seconds)
        .and_then(|lifetime| chrono::Local::now().checked_add_signed(lifetime));
    match deadline {
        Some(deadline) => format!(
            "Open the link and enter this code (expires at {}):",
            deadline.format("%H:%M:%S")
        ),
        None => "Open the link and enter this code:".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Entry {
        Verification(String, String),
        Status(String),
        Poll(u64),
        Profile(String),
    }

    type Log = Arc<Mutex<Vec<Entry>>>;

    struct RecordingPresenter {
        log: Log,
    }

    impl Presenter for RecordingPresenter {
        fn show_verification(&self, verification_uri: &str, user_code: &str) {
            self.log.lock().unwrap().push(Entry::Verification(
                verification_uri.to_string(),
                user_code.to_string(),
            ));
        }

        fn set_status(&self, text: &str) {
            self.log.lock().unwrap().push(Entry::Status(text.to_string()));
        }
    }

    struct ScriptedProvider {
        authorization: Mutex<Option<Result<DeviceAuthorization, AuthError>>>,
        polls: Mutex<VecDeque<Result<TokenPollResult, AuthError>>>,
        identity: Mutex<Option<Result<Identity, AuthError>>>,
        started: Instant,
        log: Log,
    }

    impl ScriptedProvider {
        fn new(
            authorization: Result<DeviceAuthorization, AuthError>,
            polls: Vec<Result<TokenPollResult, AuthError>>,
            log: Log,
        ) -> Self {
            Self {
                authorization: Mutex::new(Some(authorization)),
                polls: Mutex::new(polls.into()),
                identity: Mutex::new(Some(Ok(alice()))),
                started: Instant::now(),
                log,
            }
        }

        fn with_identity(self, identity: Result<Identity, AuthError>) -> Self {
            *self.identity.lock().unwrap() = Some(identity);
            self
        }
    }

    #[async_trait]
    impl DeviceAuthProvider for ScriptedProvider {
        fn provider_name(&self) -> &str {
            "scripted"
        }

        async fn request_device_code(&self) -> Result<DeviceAuthorization, AuthError> {
            self.authorization
                .lock()
                .unwrap()
                .take()
                .expect("device code requested twice")
        }

        async fn poll_for_token(&self, device_code: &str) -> Result<TokenPollResult, AuthError> {
            assert_eq!(device_code, "d1");
            self.log
                .lock()
                .unwrap()
                .push(Entry::Poll(self.started.elapsed().as_secs()));
            self.polls
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(TokenPollResult::Pending))
        }

        async fn fetch_identity(&self, access_token: &str) -> Result<Identity, AuthError> {
            self.log
                .lock()
                .unwrap()
                .push(Entry::Profile(access_token.to_string()));
            self.identity
                .lock()
                .unwrap()
                .take()
                .expect("identity fetched twice")
        }
    }

    fn alice() -> Identity {
        Identity {
            login: "alice".to_string(),
            id: 42,
        }
    }

    fn authorization(interval: u64, expires_in: u64) -> DeviceAuthorization {
        DeviceAuthorization::new(
            "d1",
            "ABCD-1234",
            "https://example.com/device",
            Some(interval),
            Some(expires_in),
        )
    }

    fn granted(token: &str) -> Result<TokenPollResult, AuthError> {
        Ok(TokenPollResult::Granted {
            access_token: token.to_string(),
        })
    }

    fn setup(
        auth: Result<DeviceAuthorization, AuthError>,
        polls: Vec<Result<TokenPollResult, AuthError>>,
    ) -> (DeviceFlow<ScriptedProvider>, RecordingPresenter, Log) {
        let log: Log = Arc::default();
        let provider = ScriptedProvider::new(auth, polls, log.clone());
        let presenter = RecordingPresenter { log: log.clone() };
        (DeviceFlow::new(provider), presenter, log)
    }

    fn polls(log: &Log) -> Vec<u64> {
        log.lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                Entry::Poll(at) => Some(*at),
                _ => None,
            })
            .collect()
    }

    fn last_status(log: &Log) -> String {
        log.lock()
            .unwrap()
            .iter()
            .rev()
            .find_map(|e| match e {
                Entry::Status(s) => Some(s.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }

    #[tokio::test(start_paused = true)]
    async fn verification_is_shown_once_before_first_poll() {
        let (flow, presenter, log) = setup(Ok(authorization(5, 900)), vec![granted("tok123")]);

        flow.run(&presenter).await.unwrap();

        let entries = log.lock().unwrap().clone();
        let verifications: Vec<usize> = entries
            .iter()
            .enumerate()
            .filter(|(_, e)| matches!(e, Entry::Verification(..)))
            .map(|(i, _)| i)
            .collect();
        let first_poll = entries
            .iter()
            .position(|e| matches!(e, Entry::Poll(_)))
            .unwrap();
        assert_eq!(verifications.len(), 1);
        assert!(verifications[0] < first_poll);
        assert_eq!(
            entries[verifications[0]],
            Entry::Verification(
                "https://example.com/device".to_string(),
                "ABCD-1234".to_string()
            )
        );
    }

    #[tokio::test(start_paused = true)]
    async fn pending_then_granted_returns_identity_after_two_polls() {
        let (flow, presenter, log) = setup(
            Ok(authorization(5, 900)),
            vec![Ok(TokenPollResult::Pending), granted("tok123")],
        );

        let identity = flow.run(&presenter).await.unwrap();

        assert_eq!(identity, alice());
        assert_eq!(polls(&log), vec![0, 5]);
        assert!(log
            .lock()
            .unwrap()
            .contains(&Entry::Profile("tok123".to_string())));
        assert_eq!(last_status(&log), "Logged in as alice (ID: 42)");
    }

    #[tokio::test(start_paused = true)]
    async fn pending_keeps_interval_unchanged() {
        let (flow, presenter, log) = setup(
            Ok(authorization(3, 900)),
            vec![
                Ok(TokenPollResult::Pending),
                Ok(TokenPollResult::Pending),
                Ok(TokenPollResult::Pending),
                granted("tok"),
            ],
        );

        flow.run(&presenter).await.unwrap();

        assert_eq!(polls(&log), vec![0, 3, 6, 9]);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_down_grows_interval_monotonically() {
        let (flow, presenter, log) = setup(
            Ok(authorization(5, 900)),
            vec![
                Ok(TokenPollResult::SlowDown),
                Ok(TokenPollResult::SlowDown),
                Ok(TokenPollResult::Pending),
                granted("tok"),
            ],
        );

        flow.run(&presenter).await.unwrap();

        // Gaps: 10s, 15s, then 15s again after a plain pending.
        assert_eq!(polls(&log), vec![0, 10, 25, 40]);
    }

    #[tokio::test(start_paused = true)]
    async fn custom_slow_down_increment_is_applied() {
        let (flow, presenter, log) = setup(
            Ok(authorization(1, 900)),
            vec![Ok(TokenPollResult::SlowDown), granted("tok")],
        );
        let flow = flow.with_slow_down_increment(Duration::from_secs(2));

        flow.run(&presenter).await.unwrap();

        assert_eq!(polls(&log), vec![0, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn denial_aborts_with_exact_reason() {
        let (flow, presenter, log) = setup(
            Ok(authorization(5, 900)),
            vec![
                Ok(TokenPollResult::Pending),
                Ok(TokenPollResult::Denied {
                    reason: "access_denied".to_string(),
                }),
                granted("never"),
            ],
        );

        let err = flow.run(&presenter).await.unwrap_err();

        assert!(matches!(&err, AuthError::Denied(reason) if reason == "access_denied"));
        assert_eq!(polls(&log).len(), 2);
        assert!(!log
            .lock()
            .unwrap()
            .iter()
            .any(|e| matches!(e, Entry::Profile(_))));
        assert_eq!(
            last_status(&log),
            "Auth failed: Authorization denied: access_denied"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn polling_stops_once_device_code_expires() {
        let (flow, presenter, log) = setup(Ok(authorization(5, 12)), vec![]);

        let err = flow.run(&presenter).await.unwrap_err();

        assert!(matches!(err, AuthError::Expired { expires_in: 12 }));
        assert_eq!(polls(&log), vec![0, 5, 10]);
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_is_reported_on_time_when_interval_exceeds_lifetime() {
        let (flow, presenter, log) = setup(Ok(authorization(600, 900)), vec![]);
        let started = Instant::now();

        let err = flow.run(&presenter).await.unwrap_err();

        assert!(matches!(err, AuthError::Expired { expires_in: 900 }));
        assert_eq!(polls(&log), vec![0, 600]);
        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(900) && waited < Duration::from_secs(901));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_down_on_huge_interval_saturates_instead_of_panicking() {
        let (flow, presenter, log) = setup(
            Ok(authorization(u64::MAX, 900)),
            vec![Ok(TokenPollResult::SlowDown), granted("tok")],
        );
        let started = Instant::now();

        let err = flow.run(&presenter).await.unwrap_err();

        assert!(matches!(err, AuthError::Expired { expires_in: 900 }));
        assert_eq!(polls(&log), vec![0]);
        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(900) && waited < Duration::from_secs(901));
    }

    #[tokio::test(start_paused = true)]
    async fn transport_error_while_polling_is_terminal() {
        let (flow, presenter, log) = setup(
            Ok(authorization(5, 900)),
            vec![
                Ok(TokenPollResult::Pending),
                Err(AuthError::Transport("connection reset".to_string())),
                granted("never"),
            ],
        );

        let err = flow.run(&presenter).await.unwrap_err();

        assert!(matches!(err, AuthError::Transport(_)));
        assert_eq!(polls(&log).len(), 2);
        assert_eq!(
            last_status(&log),
            "Auth failed: Transport error: connection reset"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn device_code_failure_skips_verification_and_polling() {
        let (flow, presenter, log) = setup(
            Err(AuthError::Protocol(
                "Device code response missing user_code".to_string(),
            )),
            vec![],
        );

        let err = flow.run(&presenter).await.unwrap_err();

        assert!(matches!(err, AuthError::Protocol(_)));
        let entries = log.lock().unwrap().clone();
        assert!(!entries
            .iter()
            .any(|e| matches!(e, Entry::Verification(..) | Entry::Poll(_))));
        let failures = entries
            .iter()
            .filter(|e| matches!(e, Entry::Status(s) if s.starts_with("Auth failed")))
            .count();
        assert_eq!(failures, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_profile_fails_the_flow() {
        let log: Log = Arc::default();
        let provider = ScriptedProvider::new(
            Ok(authorization(5, 900)),
            vec![granted("tok123")],
            log.clone(),
        )
        .with_identity(Err(AuthError::Protocol(
            "Profile response malformed: missing field `id`".to_string(),
        )));
        let presenter = RecordingPresenter { log: log.clone() };

        let err = DeviceFlow::new(provider).run(&presenter).await.unwrap_err();

        assert!(matches!(err, AuthError::Protocol(msg) if msg.contains("`id`")));
        assert!(last_status(&log).starts_with("Auth failed: Protocol error"));
    }

    #[tokio::test(start_paused = true)]
    async fn access_token_never_reaches_presenter() {
        let (flow, presenter, log) = setup(Ok(authorization(5, 900)), vec![granted("gho_secret")]);

        flow.run(&presenter).await.unwrap();

        let leaked = log.lock().unwrap().iter().any(|e| match e {
            Entry::Status(s) => s.contains("gho_secret"),
            Entry::Verification(uri, code) => uri.contains("gho_secret") || code.contains("gho_secret"),
            _ => false,
        });
        assert!(!leaked);
    }
}
