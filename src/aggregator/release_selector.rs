use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::github::types::{ReleaseMeta, Repository};
use crate::github::GitHubApi;

/// How a repository's releases are looked up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseMode {
    /// Ask for the latest release only.
    Latest,
    /// List the release history; every entry is classified, the first
    /// non-draft one is reported.
    #[default]
    History,
}

impl std::str::FromStr for ReleaseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "latest" => Ok(ReleaseMode::Latest),
            "history" | "all" => Ok(ReleaseMode::History),
            _ => Err(format!("Unknown release mode: {}", s)),
        }
    }
}

/// Releases to classify for a repository, newest first.
///
/// A missing or forbidden release endpoint, or any other lookup failure,
/// just means there is nothing to report. Rate limiting is the exception
/// and always propagates.
pub async fn fetch_candidates(api: &dyn GitHubApi, repo: &Repository, mode: ReleaseMode) -> Result<Vec<ReleaseMeta>> {
    let result = match mode {
        ReleaseMode::Latest => api
            .latest_release(&repo.owner_login, &repo.name)
            .await
            .map(|release| vec![release]),
        ReleaseMode::History => api.list_releases(&repo.owner_login, &repo.name).await,
    };

    match result {
        Ok(releases) => Ok(releases),
        Err(e) if e.is_rate_limited() => Err(e),
        Err(e) if e.is_missing() => {
            debug!("Skipping {}: no release ({})", repo.full_name, e);
            Ok(Vec::new())
        }
        Err(e) => {
            warn!("Skipping {}: listing releases failed: {}", repo.full_name, e);
            Ok(Vec::new())
        }
    }
}

/// Index of the release to report: the first one that is not a draft.
pub fn select_latest(releases: &[ReleaseMeta]) -> Option<usize> {
    releases.iter().position(|release| !release.draft)
}
