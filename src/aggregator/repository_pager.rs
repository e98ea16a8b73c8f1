use tracing::debug;

use crate::error::Result;
use crate::github::types::{Repository, RepositoryPage, RepositoryQuery};
use crate::github::GitHubApi;

/// Walks the repository listing from page 1 until the API reports no
/// further page, keeping discovery order. The loop is bounded only by the
/// API's own pagination signals; any page failure aborts the whole walk.
pub async fn list_all_repositories(api: &dyn GitHubApi, query: &RepositoryQuery) -> Result<Vec<Repository>> {
    let mut repositories = Vec::new();
    let mut page = 1;

    loop {
        let listing = api.list_repositories(query, page).await?;
        debug!(
            page,
            count = listing.repositories.len(),
            next = ?listing.next_page,
            last = ?listing.last_page,
            "Fetched repository page"
        );

        let next = next_page(page, &listing);
        repositories.extend(listing.repositories);

        match next {
            Some(next) => page = next,
            None => break,
        }
    }

    Ok(repositories)
}

fn next_page(current: u32, listing: &RepositoryPage) -> Option<u32> {
    if listing.last_page == Some(current) {
        return None;
    }
    // A next page that does not move forward would loop forever.
    listing.next_page.filter(|&next| next > current)
}
