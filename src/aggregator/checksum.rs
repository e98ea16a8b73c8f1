use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};

/// Plain download of a release asset's content.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// Unauthenticated HTTP GET; public release assets need no token.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("release-board/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(Error::HttpClient)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let fetch_err = |source| Error::Fetch {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(fetch_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().await.map_err(fetch_err)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Turns a checksum asset URL into the hash it advertises.
#[derive(Clone)]
pub struct ChecksumResolver {
    fetcher: Arc<dyn ContentFetcher>,
}

impl ChecksumResolver {
    pub fn new(fetcher: Arc<dyn ContentFetcher>) -> Self {
        Self { fetcher }
    }

    pub async fn resolve(&self, url: &str) -> Result<String> {
        let content = self.fetcher.fetch_text(url).await?;
        extract_checksum(&content).ok_or_else(|| Error::EmptyChecksum(url.to_string()))
    }
}

/// First whitespace-delimited token. Handles both a bare hash and the
/// `<hash>  <filename>` output of `sha256sum`/`md5sum`. The token is not
/// checked for being hex.
pub fn extract_checksum(content: &str) -> Option<String> {
    content.split_whitespace().next().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_column_format() {
        assert_eq!(
            extract_checksum("abcd1234  myapp-linux-amd64\n").as_deref(),
            Some("abcd1234")
        );
    }

    #[test]
    fn bare_hash_with_trailing_newline() {
        assert_eq!(extract_checksum("d41d8cd98f00b204\n").as_deref(), Some("d41d8cd98f00b204"));
    }

    #[test]
    fn leading_whitespace_and_tabs() {
        assert_eq!(extract_checksum("\n\tdeadbeef\tfile").as_deref(), Some("deadbeef"));
    }

    #[test]
    fn shape_is_not_validated() {
        assert_eq!(extract_checksum("not-a-hash at all").as_deref(), Some("not-a-hash"));
    }

    #[test]
    fn empty_content_has_no_checksum() {
        assert_eq!(extract_checksum(""), None);
        assert_eq!(extract_checksum("  \n\t "), None);
    }
}
