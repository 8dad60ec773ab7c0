//! Identity providers that implement the device authorization grant.

pub mod github;

pub use github::GitHubDeviceAuth;
