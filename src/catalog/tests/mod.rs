mod concurrency;

use crate::types::{Catalog, DownloadRecord, MediaKind};

pub(super) fn record(title: &str, kind: MediaKind) -> DownloadRecord {
    DownloadRecord::new(title, format!("{} description", title), kind)
}

pub(super) fn sample_catalog() -> Catalog {
    let mut catalog = Catalog::default();
    catalog.push(record("First Video", MediaKind::Video), MediaKind::Video);
    catalog.push(record("Second Video", MediaKind::Video), MediaKind::Video);
    catalog.push(record("A Song", MediaKind::Audio), MediaKind::Audio);
    catalog
}
