use serde::{Deserialize, Serialize};

use crate::aggregator::{ReleaseMode, DEFAULT_TRACKED_ARCH};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub github: GithubConfig,
    pub server: ServerConfig,
    pub releases: ReleasesConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// GitHub Enterprise URL; api.github.com when unset.
    pub url: Option<String>,
    pub orgs: Vec<String>,
    /// Leave the token's own user out of the allowed owners.
    pub nouser: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub interval_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleasesConfig {
    pub mode: ReleaseMode,
    pub tracked_arch: String,
    pub update_release_body: bool,
    pub per_page: u8,
    pub concurrency: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: 8080,
            interval_secs: 3600,
        }
    }
}

impl Default for ReleasesConfig {
    fn default() -> Self {
        ReleasesConfig {
            mode: ReleaseMode::default(),
            tracked_arch: DEFAULT_TRACKED_ARCH.to_string(),
            update_release_body: false,
            per_page: 100,
            concurrency: 4,
        }
    }
}
