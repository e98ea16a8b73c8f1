use axum::{extract::State, response::Html, routing::get, Router};
use std::sync::Arc;
use tokio::sync::RwLock;

/// The currently published page. Readers always see one complete version;
/// a refresh swaps the whole thing or nothing.
#[derive(Clone, Default)]
pub struct Snapshot {
    page: Arc<RwLock<Arc<String>>>,
}

impl Snapshot {
    pub fn new(page: String) -> Self {
        Self {
            page: Arc::new(RwLock::new(Arc::new(page))),
        }
    }

    pub async fn current(&self) -> Arc<String> {
        self.page.read().await.clone()
    }

    pub async fn replace(&self, page: String) {
        *self.page.write().await = Arc::new(page);
    }
}

/// Serves the published page on `/` and on every other path.
pub fn router(snapshot: Snapshot) -> Router {
    Router::new()
        .route("/", get(index))
        .fallback(index)
        .with_state(snapshot)
}

async fn index(State(snapshot): State<Snapshot>) -> Html<String> {
    Html(snapshot.current().await.as_ref().clone())
}

pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Received interrupt, exiting.");
}
