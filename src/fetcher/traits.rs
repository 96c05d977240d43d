//! Trait for the external media fetcher

use crate::types::{FetchProgress, MediaInfo, MediaKind};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Callback receiving parsed progress lines, in emission order
pub type ProgressCallback<'a> = &'a (dyn Fn(FetchProgress) + Send + Sync);

/// Fetcher Process Adapter
///
/// One call is one attempt: implementations do not retry. The pipeline owns
/// artifact validation, so a successful return only means the fetcher
/// reported success.
///
/// # Examples
///
/// ```no_run
/// use media_dl::config::FetcherConfig;
/// use media_dl::fetcher::{Fetcher, YtDlpFetcher};
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = YtDlpFetcher::from_config(&FetcherConfig::default());
/// let info = fetcher.fetch_metadata("https://www.youtube.com/watch?v=xyz").await?;
///
/// let path = fetcher
///     .fetch_audio(
///         "https://www.youtube.com/watch?v=xyz",
///         Path::new("/tmp/musics/Song"),
///         "Song",
///         &|p| println!("{}%", p.percent),
///     )
///     .await?;
/// println!("{} -> {}", info.title, path.display());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Resolve metadata for a single URL (no playlist expansion)
    ///
    /// # Errors
    ///
    /// - `BinaryNotFound` / `ProcessSpawn` if the executable cannot be started
    /// - `FetchFailed` if it exits non-zero
    /// - `MetadataParse` if its output is not a valid metadata document
    async fn fetch_metadata(&self, url: &str) -> crate::Result<MediaInfo>;

    /// Download best-quality video+audio muxed to `<output_dir>/<title>.mp4`
    /// plus a `<title>.jpg` thumbnail
    ///
    /// Returns the path of the media file. Errors as for
    /// [`fetch_metadata`](Self::fetch_metadata), minus `MetadataParse`.
    async fn fetch_video(
        &self,
        url: &str,
        output_dir: &Path,
        title: &str,
        on_progress: ProgressCallback<'_>,
    ) -> crate::Result<PathBuf>;

    /// Extract audio to `<output_dir>/<title>.mp3` plus a `<title>.jpg` thumbnail
    async fn fetch_audio(
        &self,
        url: &str,
        output_dir: &Path,
        title: &str,
        on_progress: ProgressCallback<'_>,
    ) -> crate::Result<PathBuf>;

    /// Dispatch to [`fetch_video`](Self::fetch_video) or
    /// [`fetch_audio`](Self::fetch_audio)
    async fn fetch(
        &self,
        kind: MediaKind,
        url: &str,
        output_dir: &Path,
        title: &str,
        on_progress: ProgressCallback<'_>,
    ) -> crate::Result<PathBuf> {
        match kind {
            MediaKind::Video => self.fetch_video(url, output_dir, title, on_progress).await,
            MediaKind::Audio => self.fetch_audio(url, output_dir, title, on_progress).await,
        }
    }

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
