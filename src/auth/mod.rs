//! OAuth device-code login.

pub mod device_code;
pub mod error;
pub mod flow;
pub mod presenter;
pub mod provider;
pub mod providers;

pub use device_code::{DeviceAuthorization, Identity, TokenPollResult};
pub use error::AuthError;
pub use flow::{DeviceFlow, SLOW_DOWN_INCREMENT};
pub use presenter::{ChannelPresenter, FlowEvent, Presenter};
pub use provider::DeviceAuthProvider;
pub use providers::GitHubDeviceAuth;
