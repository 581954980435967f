use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepoStatus {
    Public,
    Private,
}

impl fmt::Display for RepoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepoStatus::Public => write!(f, "Public"),
            RepoStatus::Private => write!(f, "Private"),
        }
    }
}

impl std::str::FromStr for RepoStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Public" => Ok(RepoStatus::Public),
            "Private" => Ok(RepoStatus::Private),
            other => Err(format!("unknown repo status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: i64,
    /// The GitHub login.
    pub name: String,
    /// Empty string when the upstream record carries no email.
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repo {
    pub id: i64,
    pub name: String,
    pub status: RepoStatus,
    pub stars_count: u32,
    pub owner_id: i64,
}

/// One deduplicated (owner, repo) pair. Invariant: `repo.owner_id == owner.id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedPair {
    pub owner: Owner,
    pub repo: Repo,
}

/// One row of the CSV export, in column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRow {
    pub owner_id: i64,
    pub owner_name: String,
    pub owner_email: String,
    pub repo_id: i64,
    pub repo_name: String,
    pub status: RepoStatus,
    pub stars_count: u32,
}
