//! Core downloader implementation split into focused submodules.
//!
//! The `MediaDownloader` struct and its methods are organized by domain:
//! - [`media`] - Metadata lookup and video/audio downloads
//! - [`catalog_ops`] - Catalog listing

mod catalog_ops;
mod media;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use crate::catalog::CatalogStore;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetcher::{Fetcher, YtDlpFetcher};
use crate::pipeline::DownloadPipeline;
use crate::relay::BroadcastRelay;
use crate::types::{MediaKind, ProgressEvent};
use std::path::Path;
use std::sync::Arc;

/// Main downloader instance (cloneable - all fields are Arc-wrapped)
///
/// Clones share the fetcher, the catalog writer lock and the event channel,
/// so one instance can serve concurrent requests from many tasks.
#[derive(Clone)]
pub struct MediaDownloader {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Fetch, validate and record pipeline
    pub(crate) pipeline: DownloadPipeline,
    /// Event broadcast channel (multiple subscribers supported)
    pub(crate) events: BroadcastRelay,
}

impl std::fmt::Debug for MediaDownloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaDownloader")
            .field("base_dir", self.config.base_dir())
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

impl MediaDownloader {
    /// Create a new MediaDownloader backed by yt-dlp
    ///
    /// This initializes all core components:
    /// - Creates the base, `videos`, `musics` and `database` directories
    /// - Creates an empty catalog if none exists (restoring from backup if possible)
    /// - Resolves the yt-dlp executable from the fetcher configuration
    /// - Sets up the event broadcast channel
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use media_dl::{MediaDownloader, config::Config};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let downloader = MediaDownloader::new(Config::with_base_dir("/srv/media")).await?;
    /// let done = downloader.download_audio("https://www.youtube.com/watch?v=xyz").await?;
    /// println!("saved {}", done.record.src);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new(config: Config) -> Result<Self> {
        let fetcher = YtDlpFetcher::from_config(&config.fetcher);
        tracing::info!(binary = %fetcher.binary_path().display(), "using yt-dlp fetcher");
        Self::with_fetcher(config, Arc::new(fetcher)).await
    }

    /// Create a MediaDownloader with a custom fetcher implementation
    pub async fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        let base_dir = config.base_dir().clone();
        create_layout(&base_dir).await?;

        let catalog = CatalogStore::new(&base_dir);
        let catalog_path = catalog.ensure_exists().await?;

        tracing::info!(
            base_dir = %base_dir.display(),
            catalog = %catalog_path.display(),
            fetcher = fetcher.name(),
            "media downloader ready"
        );

        let events = BroadcastRelay::new(config.event_channel_capacity);

        Ok(Self {
            config: Arc::new(config),
            pipeline: DownloadPipeline::new(fetcher, catalog),
            events,
        })
    }

    /// Subscribe to progress events
    ///
    /// Every download emits `starting`, zero or more `downloading`, then one
    /// of `complete` or `error`. Events emitted while nobody is subscribed are
    /// dropped.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use media_dl::{MediaDownloader, config::Config, types::Stage};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let downloader = MediaDownloader::new(Config::default()).await?;
    /// let mut events = downloader.subscribe();
    ///
    /// tokio::spawn(async move {
    ///     while let Ok(event) = events.recv().await {
    ///         if event.stage == Stage::Downloading {
    ///             println!("{}: {:.1}%", event.title, event.percent);
    ///         }
    ///     }
    /// });
    /// # Ok(())
    /// # }
    /// ```
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<ProgressEvent> {
        self.events.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Base storage directory
    pub fn base_dir(&self) -> &Path {
        self.pipeline.catalog().base_dir()
    }

    /// Name of the active fetcher
    pub fn fetcher_name(&self) -> &'static str {
        self.pipeline.fetcher().name()
    }
}

/// Create the base directory and one subdirectory per media kind plus the catalog's
async fn create_layout(base_dir: &Path) -> Result<()> {
    let dirs = [
        base_dir.to_path_buf(),
        base_dir.join(MediaKind::Video.directory()),
        base_dir.join(MediaKind::Audio.directory()),
        base_dir.join(crate::catalog::CATALOG_DIR),
    ];

    for dir in dirs {
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create directory '{}': {}", dir.display(), e),
            ))
        })?;
    }
    Ok(())
}
