//! Source archive retrieval
//!
//! Archives are expected to be placed in the downloads directory by the
//! operator. [`ArchiveFetcher`] is the hook for fetching missing ones; the
//! only implementation shipped, [`OfflineFetcher`], never retrieves anything.

use std::path::{Path, PathBuf};

/// Retrieves a missing source archive into the downloads directory
pub trait ArchiveFetcher {
    /// Try to obtain `name-version` in `dest_dir`, returning the archive path
    fn fetch(&self, name: &str, version: &str, dest_dir: &Path) -> Option<PathBuf>;
}

/// Fetcher that performs no network access
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineFetcher;

impl ArchiveFetcher for OfflineFetcher {
    fn fetch(&self, name: &str, version: &str, dest_dir: &Path) -> Option<PathBuf> {
        tracing::warn!(
            "Automatic download is not supported; place {name}-{version} in {}",
            dest_dir.display()
        );
        None
    }
}
