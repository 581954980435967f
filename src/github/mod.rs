pub mod client;
pub mod oauth;
pub mod retry;

pub use client::GitHubClient;
pub use retry::{with_retry, IsRetryable};
