use reqwest::{header, Client, Url};
use serde::Deserialize;

use crate::config::OAuthConfig;
use crate::error::{Error, Result};

/// Repository read plus org membership; org repos are invisible without
/// `read:org`.
pub const OAUTH_SCOPE: &str = "repo read:org user:email";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// The GitHub authorize URL the browser is redirected to.
pub fn authorize_url(oauth: &OAuthConfig, redirect_uri: &str, state: &str) -> Result<String> {
    let url = Url::parse_with_params(
        &oauth.authorize_url,
        &[
            ("client_id", oauth.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("scope", OAUTH_SCOPE),
            ("state", state),
        ],
    )
    .map_err(|e| Error::OAuth(format!("invalid authorize URL: {e}")))?;
    Ok(url.to_string())
}

/// Exchange the callback `code` for an access token.
pub async fn exchange_code(oauth: &OAuthConfig, code: &str) -> Result<String> {
    let client = Client::new();
    let response = client
        .post(&oauth.token_url)
        .header(header::ACCEPT, "application/json")
        .form(&[
            ("client_id", oauth.client_id.as_str()),
            ("client_secret", oauth.client_secret.as_str()),
            ("code", code),
        ])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::OAuth(format!(
            "token endpoint returned {status}: {body}"
        )));
    }

    let body: TokenResponse = response.json().await?;
    match body.access_token {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(Error::OAuth(
            body.error_description
                .or(body.error)
                .unwrap_or_else(|| "no access_token in response".to_string()),
        )),
    }
}
