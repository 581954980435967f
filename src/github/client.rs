use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{Config, RetryConfig};
use crate::error::{Error, Result};
use crate::github::retry::with_retry;
use crate::models::Organization;

pub struct GitHubClient {
    client: Client,
    base_url: String,
    per_page: u32,
    retry: RetryConfig,
}

impl GitHubClient {
    pub fn new(token: &str, config: &Config) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", token))?,
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            header::HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("repoexport/0.1"),
        );

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            per_page: config.per_page,
            retry: config.retry.clone(),
        })
    }

    /// Every repository visible to the token: personal repos first, then each
    /// organization's repos in organization-list order, page order within an
    /// organization.
    ///
    /// Individual calls that keep failing degrade to an empty result so one
    /// broken organization cannot block the rest; an empty return is valid.
    /// Only a rejected credential on the load-bearing first calls aborts.
    pub async fn fetch_all_repos(&self) -> Result<Vec<Value>> {
        let mut all = self.user_repos().await?;
        tracing::info!(count = all.len(), "fetched user repositories");

        let orgs = self.user_orgs().await?;
        tracing::info!(count = orgs.len(), "fetched organizations");

        for org in &orgs {
            let before = all.len();
            let mut page = 1;
            loop {
                let batch = match self.org_repos_page(&org.login, page).await {
                    Ok(items) => items,
                    Err(e) => {
                        tracing::warn!(
                            org = %org.login,
                            page,
                            error = %e,
                            "failed to fetch organization repositories, skipping rest of org"
                        );
                        Vec::new()
                    }
                };
                if batch.is_empty() {
                    break;
                }
                all.extend(batch);
                page += 1;
            }
            tracing::debug!(org = %org.login, count = all.len() - before, "fetched org repositories");
        }

        Ok(all)
    }

    // TODO: page through /user/repos too; a single page caps personal repos
    // at the API's per-page default.
    async fn user_repos(&self) -> Result<Vec<Value>> {
        let url = format!("{}/user/repos", self.base_url);
        match self.get_with_retry(&url).await {
            Ok(items) => Ok(items),
            Err(Error::Status { status, body }) if status == StatusCode::UNAUTHORIZED => {
                Err(Error::TokenRejected(body))
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch user repositories, continuing without them");
                Ok(Vec::new())
            }
        }
    }

    async fn user_orgs(&self) -> Result<Vec<Organization>> {
        let url = format!("{}/user/orgs", self.base_url);
        match self.get_with_retry(&url).await {
            Ok(orgs) => Ok(orgs),
            Err(Error::Status { status, body }) if status == StatusCode::UNAUTHORIZED => {
                Err(Error::TokenRejected(body))
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch organizations, continuing without them");
                Ok(Vec::new())
            }
        }
    }

    async fn org_repos_page(&self, org: &str, page: u32) -> Result<Vec<Value>> {
        let url = format!(
            "{}/orgs/{}/repos?per_page={}&page={}",
            self.base_url, org, self.per_page, page
        );
        self.get_with_retry(&url).await
    }

    async fn get_with_retry<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        with_retry(&self.retry, || self.get_json(url)).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status { status, body });
        }
        Ok(response.json().await?)
    }
}
