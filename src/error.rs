use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("GitHub API returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    #[error("access token rejected: {0}")]
    TokenRejected(String),

    #[error("OAuth exchange failed: {0}")]
    OAuth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("CSV export error: {0}")]
    Export(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Transient failures worth another attempt: server-side 5xx responses
    /// and connection-level errors. Everything else, 4xx included, fails the
    /// call immediately.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Status { status, .. } => {
                matches!(status.as_u16(), 500 | 502 | 503 | 504)
            }
            Error::Network(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_retryable() {
        for code in [500, 502, 503, 504] {
            let err = Error::Status {
                status: StatusCode::from_u16(code).unwrap(),
                body: String::new(),
            };
            assert!(err.is_retryable(), "{code} should be retryable");
        }
    }

    #[test]
    fn client_errors_are_not_retryable() {
        for code in [400, 401, 403, 404, 422] {
            let err = Error::Status {
                status: StatusCode::from_u16(code).unwrap(),
                body: String::new(),
            };
            assert!(!err.is_retryable(), "{code} should not be retryable");
        }
    }

    #[test]
    fn token_rejection_is_not_retryable() {
        assert!(!Error::TokenRejected("bad credentials".into()).is_retryable());
    }
}
