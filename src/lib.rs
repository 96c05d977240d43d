//! # media-dl
//!
//! Backend library for desktop media downloaders driving yt-dlp.
//!
//! ## Design Philosophy
//!
//! media-dl is designed to be:
//! - **Crash tolerant** - The JSON catalog survives interrupted writes and recovers from backup
//! - **Sensible defaults** - Works out of the box with zero configuration
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Event-driven** - Consumers subscribe to progress events, no polling required
//!
//! ## Storage layout
//!
//! ```text
//! <base>/videos/<title>/<title>.mp4  (+ <title>.jpg)
//! <base>/musics/<title>/<title>.mp3  (+ <title>.jpg)
//! <base>/database/catalog.json       (+ .backup / .tmp)
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use media_dl::{Config, MediaDownloader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = MediaDownloader::new(Config::with_base_dir("/srv/media")).await?;
//!
//!     // Subscribe to events
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("{:?} {} {:.1}%", event.stage, event.title, event.percent);
//!         }
//!     });
//!
//!     let done = downloader
//!         .download_video("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
//!         .await?;
//!     println!("saved {}", done.record.src);
//!
//!     for record in downloader.list_catalog().await.videos {
//!         println!("{} -> {}", record.title, record.src);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Transport-agnostic request dispatch
pub mod api;
/// Durable JSON catalog of completed downloads
pub mod catalog;
/// Configuration types
pub mod config;
/// Public downloader facade
pub mod downloader;
/// Error types
pub mod error;
/// External media fetcher (yt-dlp)
pub mod fetcher;
/// Fetch, validate and record pipeline
pub mod pipeline;
/// Progress event delivery
pub mod relay;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use api::{Reply, Request};
pub use catalog::CatalogStore;
pub use config::{Config, FetcherConfig, InstallMode, StorageConfig};
pub use downloader::MediaDownloader;
pub use error::{ApiError, ArtifactProblem, CatalogError, Error, ErrorDetail, Result};
pub use fetcher::{Fetcher, YtDlpFetcher};
pub use pipeline::DownloadPipeline;
pub use relay::{BroadcastRelay, EventRelay, NoOpRelay};
pub use types::{
    Catalog, CompletedDownload, DownloadRecord, FetchProgress, MediaInfo, MediaKind,
    ProgressEvent, Stage,
};
