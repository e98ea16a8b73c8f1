pub mod types;

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::time::Duration;

pub use types::{Config, GithubConfig, ReleasesConfig, ServerConfig};

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.token().is_empty() {
            bail!("GitHub token cannot be empty");
        }
        if self.github.nouser && self.github.orgs.is_empty() {
            bail!("no organizations provided");
        }
        if self.server.interval_secs == 0 {
            bail!("refresh interval must be at least one second");
        }
        if !(1..=100).contains(&self.releases.per_page) {
            bail!("per_page must be between 1 and 100, got {}", self.releases.per_page);
        }
        Ok(())
    }

    pub fn token(&self) -> &str {
        self.github.token.as_deref().unwrap_or_default().trim()
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.server.interval_secs)
    }
}
