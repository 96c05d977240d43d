//! Transport-agnostic request dispatch
//!
//! The four operations of [`MediaDownloader`] as serializable [`Request`] and
//! [`Reply`] values, for embedding behind any transport (local RPC, HTTP,
//! in-process call). Failures become an [`ApiError`] whose message matches
//! the `error`-stage progress event of the same operation.
//!
//! # Example
//!
//! ```no_run
//! # use media_dl::{MediaDownloader, config::Config};
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = MediaDownloader::new(Config::default()).await?;
//!
//! let reply = downloader
//!     .dispatch_json(r#"{"method":"download_audio","params":{"url":"https://youtu.be/xyz"}}"#)
//!     .await;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```

use crate::downloader::MediaDownloader;
use crate::error::ApiError;
use crate::types::{Catalog, CompletedDownload, MediaInfo, MediaKind};
use serde::{Deserialize, Serialize};

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

/// One operation requested by the embedding shell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "snake_case")]
pub enum Request {
    /// Download an mp4 video
    DownloadVideo {
        /// Source URL
        url: String,
    },
    /// Download an mp3
    DownloadAudio {
        /// Source URL
        url: String,
    },
    /// Resolve metadata only
    GetMetadata {
        /// Source URL
        url: String,
    },
    /// Return both catalog sequences
    ListCatalog,
}

/// Successful result of a [`Request`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Reply {
    /// A download finished and was recorded
    Download(CompletedDownload),
    /// Resolved metadata
    Metadata(MediaInfo),
    /// Catalog contents
    Catalog(Catalog),
}

impl MediaDownloader {
    /// Run one request
    pub async fn dispatch(&self, request: Request) -> Result<Reply, ApiError> {
        tracing::debug!(?request, "dispatching request");

        let reply = match request {
            Request::DownloadVideo { url } => self
                .download(&url, MediaKind::Video)
                .await
                .map(Reply::Download),
            Request::DownloadAudio { url } => self
                .download(&url, MediaKind::Audio)
                .await
                .map(Reply::Download),
            Request::GetMetadata { url } => self.get_metadata(&url).await.map(Reply::Metadata),
            Request::ListCatalog => Ok(Reply::Catalog(self.list_catalog().await)),
        };

        reply.map_err(ApiError::from)
    }

    /// Run one JSON-encoded request and encode the outcome as JSON
    ///
    /// The output is `{"ok": <Reply>}` or `{"err": <ApiError>}`. Malformed
    /// requests produce a `validation_error`.
    pub async fn dispatch_json(&self, request: &str) -> String {
        let outcome = match serde_json::from_str::<Request>(request) {
            Ok(request) => self.dispatch(request).await,
            Err(e) => Err(ApiError::validation(format!("malformed request: {}", e))),
        };

        let envelope = match outcome {
            Ok(reply) => serde_json::json!({ "ok": reply }),
            Err(error) => serde_json::json!({ "err": error }),
        };
        envelope.to_string()
    }
}
