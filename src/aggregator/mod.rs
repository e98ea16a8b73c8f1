pub mod asset_classifier;
pub mod checksum;
pub mod install_doc;
pub mod owner_filter;
pub mod release_fetcher;
pub mod release_selector;
pub mod repository_pager;

pub use asset_classifier::{AssetClassifier, ClassificationKey, PlatformAsset, PlatformMatrix};
pub use checksum::{ChecksumResolver, ContentFetcher, HttpFetcher};
pub use install_doc::{InstallDocPublisher, InstallDocRenderer};
pub use owner_filter::OwnerFilter;
pub use release_fetcher::{AggregatorConfig, Release, ReleaseAggregator, DEFAULT_TRACKED_ARCH};
pub use release_selector::ReleaseMode;
