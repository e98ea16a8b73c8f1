use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub full_name: String,
    pub owner_login: String,
    pub name: String,
    pub archived: bool,
    pub html_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseMeta {
    pub id: u64,
    pub tag_name: String,
    pub html_url: String,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: u64,
    pub name: String,
    pub browser_download_url: String,
    #[serde(default)]
    pub download_count: u64,
    pub created_at: DateTime<Utc>,
}

/// Filters for the authenticated user's repository listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryQuery {
    pub visibility: String,
    pub affiliation: String,
    pub per_page: u8,
}

impl RepositoryQuery {
    /// Public repositories the user owns or collaborates on, plus those of
    /// their organizations when any are configured.
    pub fn for_owners(include_orgs: bool, per_page: u8) -> Self {
        let mut affiliation = "owner,collaborator".to_string();
        if include_orgs {
            affiliation.push_str(",organization_member");
        }
        Self {
            visibility: "public".to_string(),
            affiliation,
            per_page,
        }
    }
}

/// One page of a repository listing together with the pagination signals.
#[derive(Debug, Clone, Default)]
pub struct RepositoryPage {
    pub repositories: Vec<Repository>,
    pub next_page: Option<u32>,
    pub last_page: Option<u32>,
}
