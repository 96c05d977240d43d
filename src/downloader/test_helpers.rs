//! Shared test helpers for creating MediaDownloader instances in tests.

use crate::config::Config;
use crate::downloader::MediaDownloader;
use crate::error::Error;
use crate::fetcher::{Fetcher, ProgressCallback, media_path, thumbnail_path};
use crate::types::{FetchProgress, MediaInfo, MediaKind};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::tempdir;

/// In-process fetcher writing a fixed-size artifact and replaying progress
pub(crate) struct FakeFetcher {
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) artifact_size: usize,
    pub(crate) write_thumbnail: bool,
    pub(crate) progress: Vec<f32>,
    pub(crate) fail_with: Option<String>,
    /// Suffix the title with the URL's last path segment
    pub(crate) title_per_url: bool,
    pub(crate) fetch_calls: AtomicUsize,
}

impl FakeFetcher {
    pub(crate) fn new(title: &str, artifact_size: usize) -> Self {
        Self {
            title: title.to_string(),
            description: Some("fake description".to_string()),
            artifact_size,
            write_thumbnail: true,
            progress: vec![10.0, 55.5, 100.0],
            fail_with: None,
            title_per_url: false,
            fetch_calls: AtomicUsize::new(0),
        }
    }

    async fn produce(
        &self,
        kind: MediaKind,
        output_dir: &Path,
        title: &str,
        on_progress: ProgressCallback<'_>,
    ) -> crate::Result<PathBuf> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        for percent in &self.progress {
            on_progress(FetchProgress {
                percent: *percent,
                size: "1.00MiB".to_string(),
                speed: "1.00MiB/s".to_string(),
                eta: "00:01".to_string(),
            });
        }
        if let Some(message) = &self.fail_with {
            return Err(Error::FetchFailed {
                exit_code: Some(1),
                message: message.clone(),
            });
        }

        let path = media_path(output_dir, title, kind);
        tokio::fs::write(&path, vec![0u8; self.artifact_size]).await?;
        if self.write_thumbnail {
            tokio::fs::write(thumbnail_path(output_dir, title), b"jpg").await?;
        }
        Ok(path)
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch_metadata(&self, url: &str) -> crate::Result<MediaInfo> {
        let title = match url.rsplit('/').next() {
            Some(segment) if self.title_per_url => format!("{} {}", self.title, segment),
            _ => self.title.clone(),
        };
        Ok(MediaInfo {
            title,
            description: self.description.clone(),
            thumbnail_url: None,
            duration: Some(1.0),
            source_id: format!("id-{}", url.len()),
            channel: None,
            view_count: None,
        })
    }

    async fn fetch_video(
        &self,
        _url: &str,
        output_dir: &Path,
        title: &str,
        on_progress: ProgressCallback<'_>,
    ) -> crate::Result<PathBuf> {
        self.produce(MediaKind::Video, output_dir, title, on_progress)
            .await
    }

    async fn fetch_audio(
        &self,
        _url: &str,
        output_dir: &Path,
        title: &str,
        on_progress: ProgressCallback<'_>,
    ) -> crate::Result<PathBuf> {
        self.produce(MediaKind::Audio, output_dir, title, on_progress)
            .await
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Helper to create a test MediaDownloader rooted in a fresh temp dir.
/// Returns the downloader and the tempdir (which must be kept alive).
pub(crate) async fn create_test_downloader(
    fetcher: FakeFetcher,
) -> (MediaDownloader, Arc<FakeFetcher>, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();
    let config = Config::with_base_dir(temp_dir.path().join("media"));

    let fetcher = Arc::new(fetcher);
    let downloader = MediaDownloader::with_fetcher(config, fetcher.clone())
        .await
        .unwrap();

    (downloader, fetcher, temp_dir)
}
