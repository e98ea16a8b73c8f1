use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// The API quota is exhausted. Always fatal to the current run.
    #[error("{message}{}", .rate.as_ref().map(|r| format!(" {}", r)).unwrap_or_default())]
    RateLimited {
        message: String,
        rate: Option<RateInfo>,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("GitHub API request failed: {0}")]
    Api(#[from] octocrab::Error),

    #[error("building HTTP client failed: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("getting {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("getting {url} failed: HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("body for asset {0} was empty")]
    EmptyChecksum(String),

    #[error("invalid template: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("rendering template failed: {0}")]
    Render(#[from] handlebars::RenderError),
}

impl Error {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimited { .. })
    }

    /// NotFound and Forbidden both mean "nothing we are allowed to see here".
    pub fn is_missing(&self) -> bool {
        matches!(self, Error::NotFound(_) | Error::Forbidden(_))
    }
}

/// Quota snapshot reported alongside a rate-limit error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateInfo {
    pub limit: u64,
    pub remaining: u64,
    pub reset: DateTime<Utc>,
}

impl fmt::Display for RateInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let wait = (self.reset - Utc::now()).max(chrono::Duration::zero());
        write!(
            f,
            "Limit: {}; Remaining: {}; Retry After: {}",
            self.limit,
            self.remaining,
            crate::humanize::human_duration(wait)
        )
    }
}
