use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::asset_classifier::{cell_mut, AssetClassifier, AssetKind, PlatformAsset, PlatformMatrix};
use super::checksum::ChecksumResolver;
use super::install_doc::InstallDocPublisher;
use super::owner_filter::OwnerFilter;
use super::release_selector::{fetch_candidates, select_latest, ReleaseMode};
use super::repository_pager::list_all_repositories;
use crate::error::Result;
use crate::github::types::{ReleaseMeta, Repository, RepositoryQuery};
use crate::github::GitHubApi;
use crate::humanize::human_duration;

pub const DEFAULT_TRACKED_ARCH: &str = "linux-amd64";

/// Immutable settings for one aggregator, built once at startup.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub owners: OwnerFilter,
    pub query: RepositoryQuery,
    pub mode: ReleaseMode,
    pub tracked_arch: String,
    pub update_release_body: bool,
    /// Repositories processed at once. Output order is unaffected.
    pub concurrency: usize,
}

/// The reported release of one repository.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Release {
    pub repository: Repository,
    pub release: ReleaseMeta,
    pub binary_name: String,
    pub binary_url: String,
    pub binary_sha256: String,
    pub binary_md5: String,
    /// Sum over every asset of the classified release(s), not just the
    /// tracked binary.
    pub binary_download_count: u64,
    pub binary_since: String,
}

/// Tracked-architecture fields picked out of the reported release.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackedAssets {
    pub asset: PlatformAsset,
    /// Upload time of the tracked binary.
    pub created_at: Option<DateTime<Utc>>,
}

/// Everything learned from one release's assets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedRelease {
    pub platforms: PlatformMatrix,
    pub tracked: TrackedAssets,
    pub download_count: u64,
}

pub struct ReleaseAggregator {
    api: Arc<dyn GitHubApi>,
    resolver: ChecksumResolver,
    publisher: Option<InstallDocPublisher>,
    config: AggregatorConfig,
}

impl ReleaseAggregator {
    pub fn new(api: Arc<dyn GitHubApi>, resolver: ChecksumResolver, config: AggregatorConfig) -> Self {
        Self {
            api,
            resolver,
            publisher: None,
            config,
        }
    }

    /// Install docs are only pushed when `update_release_body` is set.
    pub fn with_publisher(mut self, publisher: InstallDocPublisher) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// One full pass: every qualifying repository's reported release, in
    /// discovery order. Any propagated error discards the whole pass.
    pub async fn aggregate(&self) -> Result<Vec<Release>> {
        info!("Getting repositories...");
        let repositories = list_all_repositories(self.api.as_ref(), &self.config.query).await?;
        info!("Found {} repositories", repositories.len());

        let releases: Vec<Option<Release>> = stream::iter(repositories)
            .map(|repo| async move { self.process_repository(&repo).await })
            .buffered(self.config.concurrency.max(1))
            .try_collect()
            .await?;

        let releases: Vec<Release> = releases.into_iter().flatten().collect();
        info!("Collected {} releases", releases.len());
        Ok(releases)
    }

    /// `Ok(None)` means the repository is skipped, which is not an error.
    pub async fn process_repository(&self, repo: &Repository) -> Result<Option<Release>> {
        if repo.archived {
            debug!("Skipping archived repo {}", repo.full_name);
            return Ok(None);
        }
        if !self.config.owners.allowed(&repo.owner_login) {
            return Ok(None);
        }

        debug!("Handling repo {}...", repo.full_name);
        let candidates = fetch_candidates(self.api.as_ref(), repo, self.config.mode).await?;
        let Some(latest) = select_latest(&candidates) else {
            debug!("Skipping {}: no published release", repo.full_name);
            return Ok(None);
        };

        let mut tracked = TrackedAssets::default();
        let mut download_count = 0;
        for (index, release) in candidates.iter().enumerate() {
            let is_latest = index == latest;
            let classified = self.classify_release(repo, release, is_latest).await?;

            download_count += classified.download_count;
            if is_latest {
                tracked = classified.tracked;
            }

            if self.config.update_release_body {
                if let Some(publisher) = &self.publisher {
                    publisher.spawn(repo, release, classified.platforms);
                }
            }
        }

        let binary_since = tracked
            .created_at
            .map(|created_at| human_duration(Utc::now() - created_at))
            .unwrap_or_default();

        Ok(Some(Release {
            repository: repo.clone(),
            release: candidates[latest].clone(),
            binary_name: tracked.asset.binary_name,
            binary_url: tracked.asset.binary_url,
            binary_sha256: tracked.asset.sha256,
            binary_md5: tracked.asset.md5,
            binary_download_count: download_count,
            binary_since,
        }))
    }

    /// Buckets a release's assets and resolves every checksum among them.
    ///
    /// Tracked fields are only filled in for the reported release. A
    /// checksum that cannot be resolved fails the release.
    pub async fn classify_release(&self, repo: &Repository, release: &ReleaseMeta, is_latest: bool) -> Result<ClassifiedRelease> {
        let mut classified = ClassifiedRelease::default();
        let mut resolved: HashMap<&str, String> = HashMap::new();

        for asset in &release.assets {
            classified.download_count += asset.download_count;

            let classification = AssetClassifier::classify(&repo.name, &asset.name, &self.config.tracked_arch);
            let tracked = if is_latest { classification.tracked } else { None };
            if classification.cell.is_none() && tracked.is_none() {
                continue;
            }

            let checksum = match classification.checksum_kind() {
                Some(_) => {
                    let url = asset.browser_download_url.as_str();
                    if !resolved.contains_key(url) {
                        let value = self.resolver.resolve(url).await?;
                        resolved.insert(url, value);
                    }
                    resolved.get(url).cloned()
                }
                None => None,
            };

            if let Some((key, kind)) = &classification.cell {
                let cell = cell_mut(&mut classified.platforms, key);
                match kind {
                    AssetKind::Binary => {
                        cell.binary_name = asset.name.clone();
                        cell.binary_url = asset.browser_download_url.clone();
                    }
                    AssetKind::Checksum(kind) => {
                        cell.set_checksum(*kind, checksum.clone().unwrap_or_default());
                    }
                }
            }

            match tracked {
                Some(AssetKind::Binary) => {
                    classified.tracked.asset.binary_name = asset.name.clone();
                    classified.tracked.asset.binary_url = asset.browser_download_url.clone();
                    classified.tracked.created_at = Some(asset.created_at);
                }
                Some(AssetKind::Checksum(kind)) => {
                    classified.tracked.asset.set_checksum(kind, checksum.unwrap_or_default());
                }
                None => {}
            }
        }

        Ok(classified)
    }
}
