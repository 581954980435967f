use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::error::Result;
use crate::github::GitHubClient;
use crate::normalize::normalize;
use crate::storage::Storage;

/// Fetch, normalize and store the repositories visible to one access token.
/// Stages run strictly in sequence; the store handle is injected so callers
/// control isolation.
pub struct SyncPipeline {
    storage: Arc<Mutex<Storage>>,
    config: Arc<Config>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub fetched: usize,
    pub unique_repos: usize,
    pub owners: usize,
}

impl SyncPipeline {
    pub fn new(storage: Arc<Mutex<Storage>>, config: Arc<Config>) -> Self {
        Self { storage, config }
    }

    pub async fn run(&self, token: &str) -> Result<SyncReport> {
        let github = GitHubClient::new(token, &self.config)?;

        tracing::info!("fetching repositories");
        let raw = github.fetch_all_repos().await?;
        tracing::info!(count = raw.len(), "fetched raw repository records");

        let pairs = normalize(&raw);
        let owners: HashSet<i64> = pairs.iter().map(|p| p.owner.id).collect();
        tracing::info!(unique = pairs.len(), owners = owners.len(), "normalized");

        self.storage.lock().await.save_pairs(&pairs)?;
        tracing::info!("sync stored");

        Ok(SyncReport {
            fetched: raw.len(),
            unique_repos: pairs.len(),
            owners: owners.len(),
        })
    }
}
