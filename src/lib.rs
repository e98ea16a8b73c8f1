//! Latest GitHub releases for a set of owners, with per-platform binaries,
//! checksums and download counts, published as a single HTML page.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod github;
pub mod humanize;
pub mod page;
pub mod refresh;
pub mod server;

pub use error::{Error, Result};
