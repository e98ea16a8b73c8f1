//! In-memory stand-ins for the GitHub API and asset downloads.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use release_board::aggregator::{
    AggregatorConfig, ChecksumResolver, ContentFetcher, OwnerFilter, ReleaseAggregator, ReleaseMode,
};
use release_board::error::{Error, RateInfo, Result};
use release_board::github::types::{Asset, ReleaseMeta, Repository, RepositoryPage, RepositoryQuery};
use release_board::github::GitHubApi;

/// What the fake answers for a repository's releases.
#[derive(Clone)]
pub enum Canned {
    Releases(Vec<ReleaseMeta>),
    NotFound,
    Forbidden,
    RateLimited,
    Broken,
}

#[derive(Default)]
pub struct FakeGitHub {
    pub login: String,
    pub pages: Vec<Vec<Repository>>,
    pub releases: HashMap<String, Canned>,
    pub fail_page: Option<(u32, Canned)>,
    pub forbid_updates: bool,
    pub calls: Mutex<Vec<String>>,
    pub updates: Mutex<Vec<(String, String, String)>>,
}

impl FakeGitHub {
    pub fn with_repositories(repositories: Vec<Repository>) -> Self {
        Self {
            pages: vec![repositories],
            ..Default::default()
        }
    }

    pub fn with_release(mut self, repo: &Repository, canned: Canned) -> Self {
        self.releases.insert(repo.full_name.clone(), canned);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<(String, String, String)> {
        self.updates.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn canned(&self, owner: &str, repo: &str) -> Canned {
        self.releases
            .get(&format!("{}/{}", owner, repo))
            .cloned()
            .unwrap_or(Canned::Releases(Vec::new()))
    }
}

pub fn canned_error(canned: &Canned, what: &str) -> Error {
    match canned {
        Canned::NotFound => Error::NotFound(format!("Not Found: {}", what)),
        Canned::Forbidden => Error::Forbidden(format!("Resource not accessible: {}", what)),
        Canned::RateLimited => Error::RateLimited {
            message: "API rate limit exceeded".to_string(),
            rate: Some(RateInfo {
                limit: 5000,
                remaining: 0,
                reset: Utc::now() + Duration::minutes(20),
            }),
        },
        Canned::Broken | Canned::Releases(_) => Error::Status {
            url: what.to_string(),
            status: 502,
        },
    }
}

#[async_trait]
impl GitHubApi for FakeGitHub {
    async fn current_login(&self) -> Result<String> {
        self.record("user".to_string());
        Ok(self.login.clone())
    }

    async fn list_repositories(&self, _query: &RepositoryQuery, page: u32) -> Result<RepositoryPage> {
        self.record(format!("list:{}", page));
        if let Some((failing, canned)) = &self.fail_page {
            if *failing == page {
                return Err(canned_error(canned, "/user/repos"));
            }
        }

        let total = self.pages.len() as u32;
        let repositories = self.pages.get(page as usize - 1).cloned().unwrap_or_default();
        Ok(RepositoryPage {
            repositories,
            next_page: (page < total).then_some(page + 1),
            last_page: Some(total.max(1)),
        })
    }

    async fn latest_release(&self, owner: &str, repo: &str) -> Result<ReleaseMeta> {
        self.record(format!("latest:{}/{}", owner, repo));
        match self.canned(owner, repo) {
            Canned::Releases(releases) => releases
                .into_iter()
                .find(|release| !release.draft)
                .ok_or_else(|| Error::NotFound("Not Found".to_string())),
            other => Err(canned_error(&other, repo)),
        }
    }

    async fn list_releases(&self, owner: &str, repo: &str) -> Result<Vec<ReleaseMeta>> {
        self.record(format!("releases:{}/{}", owner, repo));
        match self.canned(owner, repo) {
            Canned::Releases(releases) => Ok(releases),
            other => Err(canned_error(&other, repo)),
        }
    }

    async fn update_release_body(&self, owner: &str, repo: &str, release: &ReleaseMeta, body: &str) -> Result<()> {
        self.record(format!("update:{}/{}:{}", owner, repo, release.tag_name));
        self.updates.lock().unwrap().push((
            format!("{}/{}", owner, repo),
            release.tag_name.clone(),
            body.to_string(),
        ));
        if self.forbid_updates {
            return Err(Error::Forbidden("Resource not accessible by integration".to_string()));
        }
        Ok(())
    }
}

/// Serves checksum file contents from a map; unknown URLs are 404s.
#[derive(Default)]
pub struct FakeFetcher {
    pub contents: HashMap<String, String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn with(mut self, url: &str, content: &str) -> Self {
        self.contents.insert(url.to_string(), content.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentFetcher for FakeFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.calls.lock().unwrap().push(url.to_string());
        self.contents.get(url).cloned().ok_or_else(|| Error::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

pub fn repo(owner: &str, name: &str) -> Repository {
    Repository {
        full_name: format!("{}/{}", owner, name),
        owner_login: owner.to_string(),
        name: name.to_string(),
        archived: false,
        html_url: format!("https://github.com/{}/{}", owner, name),
    }
}

pub fn download_url(repo: &Repository, tag: &str, asset: &str) -> String {
    format!("https://github.com/{}/releases/download/{}/{}", repo.full_name, tag, asset)
}

pub fn asset(repo: &Repository, tag: &str, name: &str, download_count: u64) -> Asset {
    Asset {
        id: download_count + 1000,
        name: name.to_string(),
        browser_download_url: download_url(repo, tag, name),
        download_count,
        created_at: Utc::now() - Duration::days(3),
    }
}

pub fn release(repo: &Repository, id: u64, tag: &str, draft: bool, assets: &[(&str, u64)]) -> ReleaseMeta {
    ReleaseMeta {
        id,
        tag_name: tag.to_string(),
        html_url: format!("https://github.com/{}/releases/tag/{}", repo.full_name, tag),
        draft,
        assets: assets
            .iter()
            .map(|(name, count)| asset(repo, tag, name, *count))
            .collect(),
    }
}

pub fn config(owners: &[&str], mode: ReleaseMode) -> AggregatorConfig {
    AggregatorConfig {
        owners: OwnerFilter::new(owners.iter().map(|o| o.to_string()).collect(), None),
        query: RepositoryQuery::for_owners(true, 100),
        mode,
        tracked_arch: "linux-amd64".to_string(),
        update_release_body: false,
        concurrency: 4,
    }
}

pub fn aggregator(api: Arc<FakeGitHub>, fetcher: Arc<FakeFetcher>, config: AggregatorConfig) -> ReleaseAggregator {
    ReleaseAggregator::new(api, ChecksumResolver::new(fetcher), config)
}
