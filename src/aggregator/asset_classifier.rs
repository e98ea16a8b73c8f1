//! Reverse-engineers `{os, arch}` from release asset names.
//!
//! Assets are expected to be named `<repo>-<os>-<arch>[.<ext>]`. Binaries
//! carry no extension; checksum files end in `.sha256` or `.md5`. Anything
//! else is left unclassified. Separately, any asset whose name ends with
//! the tracked architecture token (e.g. `linux-amd64`) is picked out for
//! the single-binary report, whether or not it carries the repo prefix.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChecksumKind {
    Sha256,
    Md5,
}

impl ChecksumKind {
    pub const ALL: [ChecksumKind; 2] = [ChecksumKind::Sha256, ChecksumKind::Md5];

    pub fn extension(self) -> &'static str {
        match self {
            ChecksumKind::Sha256 => ".sha256",
            ChecksumKind::Md5 => ".md5",
        }
    }
}

impl fmt::Display for ChecksumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChecksumKind::Sha256 => write!(f, "sha256"),
            ChecksumKind::Md5 => write!(f, "md5"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AssetKind {
    Binary,
    Checksum(ChecksumKind),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ClassificationKey {
    pub os: String,
    pub arch: String,
}

/// What a single asset name tells us.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Slot in the platform matrix, for names following the repo convention.
    pub cell: Option<(ClassificationKey, AssetKind)>,
    /// Role in the single-binary report, for names ending in the tracked arch.
    pub tracked: Option<AssetKind>,
}

impl Classification {
    pub fn checksum_kind(&self) -> Option<ChecksumKind> {
        let from_cell = self.cell.as_ref().and_then(|(_, kind)| checksum_of(*kind));
        from_cell.or_else(|| self.tracked.and_then(checksum_of))
    }

    pub fn is_unmatched(&self) -> bool {
        self.cell.is_none() && self.tracked.is_none()
    }
}

fn checksum_of(kind: AssetKind) -> Option<ChecksumKind> {
    match kind {
        AssetKind::Checksum(kind) => Some(kind),
        AssetKind::Binary => None,
    }
}

/// One classification cell: the binary and checksums for an os/arch pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlatformAsset {
    pub binary_name: String,
    pub binary_url: String,
    pub sha256: String,
    pub md5: String,
}

impl PlatformAsset {
    pub fn set_checksum(&mut self, kind: ChecksumKind, value: String) {
        match kind {
            ChecksumKind::Sha256 => self.sha256 = value,
            ChecksumKind::Md5 => self.md5 = value,
        }
    }
}

/// `os -> arch -> cell`, with sorted keys so rendering is stable.
pub type PlatformMatrix = BTreeMap<String, BTreeMap<String, PlatformAsset>>;

pub fn cell_mut<'a>(matrix: &'a mut PlatformMatrix, key: &ClassificationKey) -> &'a mut PlatformAsset {
    matrix
        .entry(key.os.clone())
        .or_default()
        .entry(key.arch.clone())
        .or_default()
}

pub struct AssetClassifier;

impl AssetClassifier {
    pub fn classify(repo_name: &str, asset_name: &str, tracked_arch: &str) -> Classification {
        Classification {
            cell: Self::classify_cell(repo_name, asset_name),
            tracked: Self::classify_tracked(asset_name, tracked_arch),
        }
    }

    fn classify_cell(repo_name: &str, asset_name: &str) -> Option<(ClassificationKey, AssetKind)> {
        let rest = asset_name.strip_prefix(repo_name)?.strip_prefix('-')?;

        if !rest.contains('.') {
            return Self::split_platform(rest).map(|key| (key, AssetKind::Binary));
        }

        ChecksumKind::ALL.iter().find_map(|&kind| {
            let stem = rest.strip_suffix(kind.extension())?;
            Self::split_platform(stem).map(|key| (key, AssetKind::Checksum(kind)))
        })
    }

    fn classify_tracked(asset_name: &str, tracked_arch: &str) -> Option<AssetKind> {
        if tracked_arch.is_empty() {
            return None;
        }
        if asset_name.ends_with(tracked_arch) {
            return Some(AssetKind::Binary);
        }
        ChecksumKind::ALL.iter().find_map(|&kind| {
            asset_name
                .strip_suffix(kind.extension())
                .filter(|stem| stem.ends_with(tracked_arch))
                .map(|_| AssetKind::Checksum(kind))
        })
    }

    /// `linux-amd64` -> `{linux, amd64}`; splits on the first dash only.
    fn split_platform(s: &str) -> Option<ClassificationKey> {
        let (os, arch) = s.split_once('-')?;
        if os.is_empty() || arch.is_empty() {
            return None;
        }
        Some(ClassificationKey {
            os: os.to_string(),
            arch: arch.to_string(),
        })
    }
}
