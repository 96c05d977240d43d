//! Catalog listing.

use super::MediaDownloader;
use crate::catalog::CatalogStore;
use crate::types::{Catalog, MediaKind};

impl MediaDownloader {
    /// Current catalog contents
    ///
    /// Never fails: a damaged catalog is recovered from its backup, or read
    /// as empty when no usable backup exists.
    pub async fn list_catalog(&self) -> Catalog {
        self.catalog().read().await
    }

    /// Records of one kind, in insertion order
    pub async fn list_records(&self, kind: MediaKind) -> Vec<crate::types::DownloadRecord> {
        let catalog = self.list_catalog().await;
        catalog.records(kind).to_vec()
    }

    /// The underlying catalog store
    pub fn catalog(&self) -> &CatalogStore {
        self.pipeline.catalog()
    }
}
