use handlebars::{handlebars_helper, Handlebars};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

use super::asset_classifier::PlatformMatrix;
use crate::error::{Error, Result};
use crate::github::types::{ReleaseMeta, Repository};
use crate::github::GitHubApi;

const TEMPLATE_NAME: &str = "release_body";

handlebars_helper!(upper: |s: str| s.to_uppercase());

/// Renders per-platform install instructions as a markdown release body.
pub struct InstallDocRenderer {
    template_engine: Handlebars<'static>,
}

impl InstallDocRenderer {
    pub fn new() -> Result<Self> {
        let mut template_engine = Handlebars::new();
        // Markdown, not HTML: URLs and quotes must come through untouched.
        template_engine.register_escape_fn(handlebars::no_escape);
        template_engine.register_helper("upper", Box::new(upper));
        template_engine.register_template_string(
            TEMPLATE_NAME,
            include_str!("../../templates/release_body.md.hbs"),
        )?;
        Ok(Self { template_engine })
    }

    pub fn render(&self, repo_name: &str, platforms: &PlatformMatrix) -> Result<String> {
        let sections: Vec<_> = platforms
            .iter()
            .map(|(os, arches)| {
                let arches: Vec<_> = arches
                    .iter()
                    .map(|(arch, cell)| {
                        json!({
                            "arch": arch,
                            "name": repo_name,
                            "binary_name": cell.binary_name,
                            "binary_url": cell.binary_url,
                            "sha256": cell.sha256,
                            "md5": cell.md5,
                        })
                    })
                    .collect();
                json!({ "os": os, "arches": arches })
            })
            .collect();

        let data = json!({
            "name": repo_name,
            "platforms": sections,
        });
        Ok(self.template_engine.render(TEMPLATE_NAME, &data)?)
    }
}

/// Pushes rendered install docs back to GitHub as release bodies.
///
/// Publishing happens on detached tasks: nobody waits for them and their
/// failures only reach the log.
#[derive(Clone)]
pub struct InstallDocPublisher {
    api: Arc<dyn GitHubApi>,
    renderer: Arc<InstallDocRenderer>,
}

impl InstallDocPublisher {
    pub fn new(api: Arc<dyn GitHubApi>, renderer: Arc<InstallDocRenderer>) -> Self {
        Self { api, renderer }
    }

    pub fn spawn(&self, repo: &Repository, release: &ReleaseMeta, platforms: PlatformMatrix) {
        let publisher = self.clone();
        let repo = repo.clone();
        let release = release.clone();
        tokio::spawn(async move {
            if let Err(e) = publisher.publish(&repo, &release, &platforms).await {
                warn!(
                    "Updating release body for {} {} failed: {}",
                    repo.full_name, release.tag_name, e
                );
            }
        });
    }

    /// Lack of permission to edit a release is expected and not an error.
    pub async fn publish(&self, repo: &Repository, release: &ReleaseMeta, platforms: &PlatformMatrix) -> Result<()> {
        let body = self.renderer.render(&repo.name, platforms)?;

        debug!("Updating release for {} -> {}...", repo.full_name, release.tag_name);
        match self
            .api
            .update_release_body(&repo.owner_login, &repo.name, release, &body)
            .await
        {
            Err(Error::Forbidden(message)) => {
                debug!("Not allowed to edit {} {}: {}", repo.full_name, release.tag_name, message);
                Ok(())
            }
            other => other,
        }
    }
}
