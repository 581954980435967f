pub mod config;
pub mod error;
pub mod export;
pub mod github;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod storage;
pub mod web;

pub use config::{Config, OAuthConfig, RetryConfig};
pub use error::{Error, Result};
pub use github::GitHubClient;
pub use pipeline::{SyncPipeline, SyncReport};
pub use storage::Storage;
