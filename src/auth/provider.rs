//! The HTTP seam between the device flow and an identity provider.

use async_trait::async_trait;

use super::device_code::{DeviceAuthorization, Identity, TokenPollResult};
use super::error::AuthError;

/// An identity provider that speaks the device authorization grant.
///
/// Client id and scope are bound when the provider is constructed.
#[async_trait]
pub trait DeviceAuthProvider: Send + Sync {
    /// Provider name used in logs (e.g., "github").
    fn provider_name(&self) -> &str;

    /// Request a fresh device code and user code.
    async fn request_device_code(&self) -> Result<DeviceAuthorization, AuthError>;

    /// Send one token-poll request for `device_code`.
    async fn poll_for_token(&self, device_code: &str) -> Result<TokenPollResult, AuthError>;

    /// Look up the account that owns `access_token`.
    async fn fetch_identity(&self, access_token: &str) -> Result<Identity, AuthError>;
}
