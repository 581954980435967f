use serde::Deserialize;

/// The slice of a GitHub repository object this pipeline reads. Everything
/// else in the upstream payload is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRepository {
    pub id: i64,
    pub name: String,
    pub private: bool,
    pub stargazers_count: u32,
    pub owner: RawOwner,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawOwner {
    pub id: i64,
    pub login: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// An organization the authenticated user belongs to; only the login is
/// needed to address the org-repos endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Organization {
    pub login: String,
}
