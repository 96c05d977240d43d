//! Metadata lookup and downloads.

use super::MediaDownloader;
use crate::error::Result;
use crate::relay::{EventRelay, Tee};
use crate::types::{CompletedDownload, MediaInfo, MediaKind};

impl MediaDownloader {
    /// Resolve metadata for `url` without downloading anything
    pub async fn get_metadata(&self, url: &str) -> Result<MediaInfo> {
        if url.trim().is_empty() {
            return Err(crate::Error::InvalidUrl("URL is empty".to_string()));
        }
        self.pipeline.fetcher().fetch_metadata(url).await
    }

    /// Download `url` as an mp4 video and record it under `videos`
    pub async fn download_video(&self, url: &str) -> Result<CompletedDownload> {
        self.download(url, MediaKind::Video).await
    }

    /// Download `url` as an mp3 and record it under `musics`
    pub async fn download_audio(&self, url: &str) -> Result<CompletedDownload> {
        self.download(url, MediaKind::Audio).await
    }

    /// Download `url` as `kind`, broadcasting progress to subscribers
    ///
    /// # Errors
    ///
    /// Any failure is returned after an `error`-stage event carrying
    /// [`Error::user_message`](crate::Error::user_message) was broadcast. No
    /// catalog record is written unless the artifact passed validation.
    pub async fn download(&self, url: &str, kind: MediaKind) -> Result<CompletedDownload> {
        self.pipeline.run(url, kind, &self.events).await
    }

    /// Like [`download`](Self::download), also delivering every event to `relay`
    ///
    /// Subscribers see each event before `relay` does.
    pub async fn download_with_relay(
        &self,
        url: &str,
        kind: MediaKind,
        relay: &dyn EventRelay,
    ) -> Result<CompletedDownload> {
        let tee = Tee {
            first: &self.events,
            second: relay,
        };
        self.pipeline.run(url, kind, &tee).await
    }
}
