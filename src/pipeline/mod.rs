//! Download pipeline
//!
//! One [`DownloadPipeline::run`] call takes a URL through
//! metadata → sanitize → fetch → validate → record, relaying progress
//! events along the way:
//!
//! ```text
//! starting (0%) → downloading* (non-decreasing) → complete (100%)
//!                                      ↘ error (last percent, user message)
//! ```
//!
//! Exactly one terminal event (`complete` or `error`) is emitted per run, and
//! a record is appended to the catalog only after the artifact validated.

use crate::catalog::CatalogStore;
use crate::error::{Error, Result};
use crate::fetcher::{Fetcher, thumbnail_path};
use crate::relay::EventRelay;
use crate::types::{CompletedDownload, DownloadRecord, FetchProgress, MediaKind, ProgressEvent};
use crate::utils::{storage_title, validate_artifact};
use std::sync::{Arc, Mutex};


/// Runs downloads against one fetcher and one catalog
#[derive(Clone)]
pub struct DownloadPipeline {
    fetcher: Arc<dyn Fetcher>,
    catalog: CatalogStore,
}

impl std::fmt::Debug for DownloadPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadPipeline")
            .field("fetcher", &self.fetcher.name())
            .field("catalog", &self.catalog.path())
            .finish()
    }
}

impl DownloadPipeline {
    /// Create a pipeline storing media under the catalog's base directory
    pub fn new(fetcher: Arc<dyn Fetcher>, catalog: CatalogStore) -> Self {
        Self { fetcher, catalog }
    }

    /// The fetcher used for metadata and downloads
    pub fn fetcher(&self) -> &dyn Fetcher {
        self.fetcher.as_ref()
    }

    /// The catalog completed downloads are recorded in
    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    /// Download `url` as `kind`, validate it and record it in the catalog
    ///
    /// On failure an `error`-stage event carrying [`Error::user_message`] is
    /// relayed before the error is returned.
    pub async fn run(
        &self,
        url: &str,
        kind: MediaKind,
        relay: &dyn EventRelay,
    ) -> Result<CompletedDownload> {
        let tracker = ProgressTracker::new(url, relay);

        match self.execute(url, kind, &tracker).await {
            Ok(done) => Ok(done),
            Err(e) => {
                tracing::error!(url, %kind, error = %e, "download failed");
                tracker.failed(&e);
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        url: &str,
        kind: MediaKind,
        tracker: &ProgressTracker<'_>,
    ) -> Result<CompletedDownload> {
        if url.trim().is_empty() {
            return Err(Error::InvalidUrl("URL is empty".to_string()));
        }

        let info = self.fetcher.fetch_metadata(url).await?;
        let title = storage_title(&info.title, &info.source_id);
        tracker.set_title(&title);

        let kind_dir = self.catalog.base_dir().join(kind.directory());
        let output_dir = kind_dir.join(&title);
        if output_dir == kind_dir || !output_dir.starts_with(&kind_dir) {
            return Err(Error::MetadataParse(format!(
                "title {title:?} does not name a directory under {}",
                kind_dir.display()
            )));
        }
        tokio::fs::create_dir_all(&output_dir).await?;

        tracing::info!(url, %kind, title = %title, fetcher = self.fetcher.name(), "starting download");
        tracker.starting();

        let on_progress = |progress: FetchProgress| tracker.downloading(&progress);
        let media_path = self
            .fetcher
            .fetch(kind, url, &output_dir, &title, &on_progress)
            .await?;

        let size = validate_artifact(&media_path, kind).await?;
        let thumbnail = thumbnail_path(&output_dir, &title);
        if !tokio::fs::try_exists(&thumbnail).await.unwrap_or(false) {
            tracing::warn!(thumbnail = %thumbnail.display(), "thumbnail missing, recording anyway");
        }

        let record = DownloadRecord::new(&title, info.description.unwrap_or_default(), kind);
        self.catalog.insert(record.clone(), kind).await?;

        tracing::info!(title = %title, %kind, size, path = %media_path.display(), "download complete");
        tracker.complete();

        Ok(CompletedDownload {
            record,
            kind,
            media_path,
        })
    }
}

/// Per-run progress state shared with the fetcher callback
struct ProgressTracker<'a> {
    relay: &'a dyn EventRelay,
    state: Mutex<TrackerState>,
}

struct TrackerState {
    /// URL until metadata resolves, then the sanitized title
    title: String,
    percent: f32,
}

impl<'a> ProgressTracker<'a> {
    fn new(url: &str, relay: &'a dyn EventRelay) -> Self {
        Self {
            relay,
            state: Mutex::new(TrackerState {
                title: url.to_string(),
                percent: 0.0,
            }),
        }
    }

    fn set_title(&self, title: &str) {
        self.with_state(|state| state.title = title.to_string());
    }

    fn starting(&self) {
        let event = self.with_state(|state| ProgressEvent::starting(state.title.clone()));
        self.relay.emit(&event);
    }

    /// Relay a progress line, clamped to [0, 100] and never below the last one
    fn downloading(&self, progress: &FetchProgress) {
        let event = self.with_state(|state| {
            let percent = if progress.percent.is_finite() {
                progress.percent.clamp(0.0, 100.0)
            } else {
                state.percent
            };
            state.percent = state.percent.max(percent);
            ProgressEvent::downloading(state.title.clone(), state.percent, progress)
        });
        self.relay.emit(&event);
    }

    fn complete(&self) {
        let event = self.with_state(|state| {
            state.percent = 100.0;
            ProgressEvent::complete(state.title.clone())
        });
        self.relay.emit(&event);
    }

    fn failed(&self, error: &Error) {
        let event = self.with_state(|state| {
            ProgressEvent::failed(state.title.clone(), state.percent, error.user_message())
        });
        self.relay.emit(&event);
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut TrackerState) -> T) -> T {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut state)
    }
}
