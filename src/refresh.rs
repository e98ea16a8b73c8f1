use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::aggregator::ReleaseAggregator;
use crate::error::Result;
use crate::page::PageRenderer;
use crate::server::Snapshot;

/// Rebuilds the published page from a fresh aggregation pass.
pub struct Refresher {
    aggregator: Arc<ReleaseAggregator>,
    renderer: Arc<PageRenderer>,
    snapshot: Snapshot,
}

impl Refresher {
    pub fn new(aggregator: Arc<ReleaseAggregator>, renderer: Arc<PageRenderer>, snapshot: Snapshot) -> Self {
        Self {
            aggregator,
            renderer,
            snapshot,
        }
    }

    /// Publishes a new page only if the pass and the rendering both succeed;
    /// otherwise the previous page stays in place.
    pub async fn refresh_once(&self) -> Result<()> {
        let releases = self.aggregator.aggregate().await?;

        info!("Executing template...");
        let page = self.renderer.render(&releases)?;
        self.snapshot.replace(page).await;
        Ok(())
    }

    /// Refreshes now and then on every tick of `interval`, forever.
    pub async fn run(self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(e) = self.refresh_once().await {
                if e.is_rate_limited() {
                    warn!("Refresh aborted, rate limited: {}", e);
                } else {
                    warn!("Refresh failed, keeping the previous page: {}", e);
                }
            }
        }
    }
}
