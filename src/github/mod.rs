pub mod client;
pub mod types;

use async_trait::async_trait;

use crate::error::Result;
use types::{ReleaseMeta, RepositoryPage, RepositoryQuery};

pub use client::GitHubClient;

/// The slice of the GitHub API the release board consumes.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Login of the identity that owns the token.
    async fn current_login(&self) -> Result<String>;

    async fn list_repositories(&self, query: &RepositoryQuery, page: u32) -> Result<RepositoryPage>;

    async fn latest_release(&self, owner: &str, repo: &str) -> Result<ReleaseMeta>;

    /// Releases in reverse-chronological order, drafts included.
    async fn list_releases(&self, owner: &str, repo: &str) -> Result<Vec<ReleaseMeta>>;

    async fn update_release_body(
        &self,
        owner: &str,
        repo: &str,
        release: &ReleaseMeta,
        body: &str,
    ) -> Result<()>;
}
