use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use release_board::aggregator::{
    AggregatorConfig, ChecksumResolver, HttpFetcher, InstallDocPublisher, InstallDocRenderer, OwnerFilter,
    ReleaseAggregator, ReleaseMode,
};
use release_board::config::Config;
use release_board::github::types::RepositoryQuery;
use release_board::github::{GitHubApi, GitHubClient};
use release_board::page::PageRenderer;
use release_board::refresh::Refresher;
use release_board::server::{self, Snapshot};

#[derive(Parser)]
#[command(name = "release-board")]
#[command(about = "Server to show latest GitHub Releases for a set of repositories")]
struct Cli {
    /// GitHub API token (can also be set via GITHUB_TOKEN env var)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// GitHub Enterprise URL
    #[arg(long, env = "GITHUB_URL")]
    url: Option<String>,

    /// Organizations to include (comma-separated or repeated)
    #[arg(long, env = "GITHUB_ORGS", value_delimiter = ',')]
    orgs: Vec<String>,

    /// Do not include your user
    #[arg(long)]
    nouser: bool,

    /// Port for the server to listen on
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Interval in seconds on which to refetch release data
    #[arg(long)]
    interval: Option<u64>,

    /// Release lookup: `latest` or `history`
    #[arg(long)]
    mode: Option<ReleaseMode>,

    /// Architecture suffix of the binary shown on the page
    #[arg(long)]
    arch: Option<String>,

    /// Update the body message for the release as well
    #[arg(long)]
    update_release_body: bool,

    /// Repositories processed concurrently
    #[arg(long)]
    concurrency: Option<usize>,

    /// TOML config file; flags take precedence over it
    #[arg(long, env = "RELEASE_BOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

impl Cli {
    fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(token) = self.token {
            config.github.token = Some(token);
        }
        if let Some(url) = self.url {
            config.github.url = Some(url);
        }
        if !self.orgs.is_empty() {
            config.github.orgs = self.orgs;
        }
        config.github.nouser |= self.nouser;

        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(interval) = self.interval {
            config.server.interval_secs = interval;
        }

        if let Some(mode) = self.mode {
            config.releases.mode = mode;
        }
        if let Some(arch) = self.arch {
            config.releases.tracked_arch = arch;
        }
        config.releases.update_release_body |= self.update_release_body;
        if let Some(concurrency) = self.concurrency {
            config.releases.concurrency = concurrency;
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let config = cli.into_config()?;
    config.validate()?;

    // Create GitHub client
    let base_uri = config.github.url.as_deref().map(GitHubClient::enterprise_base_uri);
    let github_client = GitHubClient::new(config.token().to_string(), base_uri.as_deref())?;
    let api: Arc<dyn GitHubApi> = Arc::new(github_client);

    let user = if config.github.nouser {
        None
    } else {
        Some(api.current_login().await?)
    };
    let owners = OwnerFilter::new(config.github.orgs.clone(), user);
    info!("Reporting releases owned by {}", owners.owners().join(", "));

    let aggregator_config = AggregatorConfig {
        owners,
        query: RepositoryQuery::for_owners(!config.github.orgs.is_empty(), config.releases.per_page),
        mode: config.releases.mode,
        tracked_arch: config.releases.tracked_arch.clone(),
        update_release_body: config.releases.update_release_body,
        concurrency: config.releases.concurrency,
    };
    let resolver = ChecksumResolver::new(Arc::new(HttpFetcher::new()?));
    let mut aggregator = ReleaseAggregator::new(api.clone(), resolver, aggregator_config);
    if config.releases.update_release_body {
        let doc_renderer = Arc::new(InstallDocRenderer::new()?);
        aggregator = aggregator.with_publisher(InstallDocPublisher::new(api.clone(), doc_renderer));
    }

    let page_renderer = Arc::new(PageRenderer::new(config.releases.tracked_arch.as_str())?);
    let snapshot = Snapshot::new(page_renderer.render(&[])?);
    let refresher = Refresher::new(Arc::new(aggregator), page_renderer, snapshot.clone());
    tokio::spawn(refresher.run(config.interval()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Starting server on port {}...", config.server.port);
    axum::serve(listener, server::router(snapshot))
        .with_graceful_shutdown(server::shutdown_signal())
        .await?;

    Ok(())
}
