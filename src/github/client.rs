use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::{Octocrab, Page};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::types::{ReleaseMeta, Repository, RepositoryPage, RepositoryQuery};
use super::GitHubApi;
use crate::error::{Error, RateInfo, Result};

/// Releases looked at per repository; matches the single page the API hands out.
const RELEASES_PER_PAGE: u8 = 100;

pub struct GitHubClient {
    client: Octocrab,
}

#[derive(Debug, Deserialize)]
struct RepositoryPayload {
    full_name: String,
    name: String,
    owner: OwnerPayload,
    #[serde(default)]
    archived: bool,
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct OwnerPayload {
    login: String,
}

impl From<RepositoryPayload> for Repository {
    fn from(payload: RepositoryPayload) -> Self {
        Repository {
            full_name: payload.full_name,
            owner_login: payload.owner.login,
            name: payload.name,
            archived: payload.archived,
            html_url: payload.html_url,
        }
    }
}

#[derive(Debug, Serialize)]
struct ListRepositoriesParams<'a> {
    visibility: &'a str,
    affiliation: &'a str,
    per_page: u8,
    page: u32,
}

#[derive(Debug, Serialize)]
struct ListReleasesParams {
    per_page: u8,
    page: u32,
}

#[derive(Debug, Deserialize)]
struct RateLimitPayload {
    rate: RatePayload,
}

#[derive(Debug, Deserialize)]
struct RatePayload {
    limit: u64,
    remaining: u64,
    reset: i64,
}

impl GitHubClient {
    /// `base_uri` overrides api.github.com, e.g. for GitHub Enterprise.
    pub fn new(token: String, base_uri: Option<&str>) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token);
        if let Some(base_uri) = base_uri {
            builder = builder.base_uri(base_uri.to_string())?;
        }
        let client = builder.build()?;
        Ok(Self { client })
    }

    /// API root of a GitHub Enterprise installation.
    pub fn enterprise_base_uri(url: &str) -> String {
        format!("{}/api/v3/", url.trim_end_matches('/'))
    }

    async fn rate_info(&self) -> Result<RateInfo> {
        let payload: RateLimitPayload = self.client.get("/rate_limit", None::<&()>).await?;
        let reset = DateTime::<Utc>::from_timestamp(payload.rate.reset, 0).unwrap_or_else(Utc::now);
        Ok(RateInfo {
            limit: payload.rate.limit,
            remaining: payload.rate.remaining,
            reset,
        })
    }

    /// Sorts an octocrab failure into the error classes callers branch on.
    async fn map_error(&self, err: octocrab::Error) -> Error {
        let message = match &err {
            octocrab::Error::GitHub { source, .. } => Some(source.message.clone()),
            _ => None,
        };
        let Some(message) = message else {
            return Error::Api(err);
        };

        if message.to_lowercase().contains("rate limit") {
            let rate = match self.rate_info().await {
                Ok(rate) => Some(rate),
                Err(e) => {
                    debug!("Fetching rate limit status failed: {}", e);
                    None
                }
            };
            return Error::RateLimited { message, rate };
        }
        if message.contains("Not Found") {
            return Error::NotFound(message);
        }
        if is_forbidden(&message) {
            return Error::Forbidden(message);
        }
        Error::Api(err)
    }

    async fn check<T>(&self, result: octocrab::Result<T>) -> Result<T> {
        match result {
            Ok(value) => Ok(value),
            Err(e) => Err(self.map_error(e).await),
        }
    }
}

fn is_forbidden(message: &str) -> bool {
    message.contains("Forbidden")
        || message.contains("Resource not accessible")
        || message.contains("Must have admin rights")
}

/// Extracts the `page` query parameter from a pagination link.
fn page_param(link: &str) -> Option<u32> {
    let parsed = url::Url::parse(link).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse().ok())
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn current_login(&self) -> Result<String> {
        let user = self.client.current().user().await;
        Ok(self.check(user).await?.login)
    }

    async fn list_repositories(&self, query: &RepositoryQuery, page: u32) -> Result<RepositoryPage> {
        let params = ListRepositoriesParams {
            visibility: &query.visibility,
            affiliation: &query.affiliation,
            per_page: query.per_page,
            page,
        };
        let result: octocrab::Result<Page<RepositoryPayload>> =
            self.client.get("/user/repos", Some(&params)).await;
        let listing = self.check(result).await?;

        let last_page = listing.number_of_pages();
        let next_page = listing.next.as_ref().and_then(|uri| page_param(&uri.to_string()));

        Ok(RepositoryPage {
            repositories: listing.items.into_iter().map(Repository::from).collect(),
            next_page,
            last_page,
        })
    }

    async fn latest_release(&self, owner: &str, repo: &str) -> Result<ReleaseMeta> {
        let route = format!("/repos/{}/{}/releases/latest", owner, repo);
        let result: octocrab::Result<ReleaseMeta> = self.client.get(route, None::<&()>).await;
        self.check(result).await
    }

    async fn list_releases(&self, owner: &str, repo: &str) -> Result<Vec<ReleaseMeta>> {
        let route = format!("/repos/{}/{}/releases", owner, repo);
        let params = ListReleasesParams {
            per_page: RELEASES_PER_PAGE,
            page: 1,
        };
        let result: octocrab::Result<Vec<ReleaseMeta>> = self.client.get(route, Some(&params)).await;
        self.check(result).await
    }

    async fn update_release_body(
        &self,
        owner: &str,
        repo: &str,
        release: &ReleaseMeta,
        body: &str,
    ) -> Result<()> {
        let route = format!("/repos/{}/{}/releases/{}", owner, repo, release.id);
        let patch = json!({
            "name": release.tag_name,
            "body": body,
        });
        let result: octocrab::Result<serde_json::Value> = self.client.patch(route, Some(&patch)).await;
        self.check(result).await?;
        Ok(())
    }
}
