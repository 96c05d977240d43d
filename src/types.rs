//! Core types for media-dl

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Metadata resolved for a single media URL
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Raw (unsanitized) title
    pub title: String,
    /// Description text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Remote thumbnail URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Duration in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Identifier of the item at its source
    pub source_id: String,
    /// Channel or uploader name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// View count at resolution time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_count: Option<u64>,
}

/// What a download produces
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    /// Muxed video + audio (`.mp4`)
    #[serde(rename = "video")]
    Video,
    /// Extracted audio (`.mp3`)
    #[serde(rename = "mp3")]
    Audio,
}

impl MediaKind {
    /// Directory under the base path holding this kind of media
    pub fn directory(self) -> &'static str {
        match self {
            MediaKind::Video => "videos",
            MediaKind::Audio => "musics",
        }
    }

    /// File extension of the produced media file
    pub fn extension(self) -> &'static str {
        match self {
            MediaKind::Video => "mp4",
            MediaKind::Audio => "mp3",
        }
    }

    /// Smallest media file considered a plausible download (bytes)
    pub fn min_artifact_size(self) -> u64 {
        match self {
            MediaKind::Video => 100 * 1024,
            MediaKind::Audio => 50 * 1024,
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Video => write!(f, "video"),
            MediaKind::Audio => write!(f, "mp3"),
        }
    }
}

/// Progress stage of a download operation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Metadata resolved, fetch about to start
    Starting,
    /// Fetch in progress
    Downloading,
    /// Artifact validated and recorded
    Complete,
    /// Operation failed
    Error,
}

/// Progress notification emitted by the pipeline
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Percentage (0.0 to 100.0), never decreasing within one operation
    pub percent: f32,
    /// Current stage
    pub stage: Stage,
    /// Transfer speed as reported by the fetcher (e.g. "2.50MiB/s")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<String>,
    /// Remaining time as reported by the fetcher (e.g. "00:15")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta: Option<String>,
    /// Sanitized title of the item being downloaded
    pub title: String,
    /// Failure message (only for `Stage::Error`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProgressEvent {
    /// `starting` event at 0%
    pub fn starting(title: impl Into<String>) -> Self {
        Self {
            percent: 0.0,
            stage: Stage::Starting,
            speed: None,
            eta: None,
            title: title.into(),
            error: None,
        }
    }

    /// `downloading` event built from a fetcher progress line
    pub fn downloading(title: impl Into<String>, percent: f32, progress: &FetchProgress) -> Self {
        Self {
            percent,
            stage: Stage::Downloading,
            speed: Some(progress.speed.clone()),
            eta: Some(progress.eta.clone()),
            title: title.into(),
            error: None,
        }
    }

    /// `complete` event at 100%
    pub fn complete(title: impl Into<String>) -> Self {
        Self {
            percent: 100.0,
            stage: Stage::Complete,
            speed: None,
            eta: None,
            title: title.into(),
            error: None,
        }
    }

    /// `error` event carrying `message`, keeping the last reported percentage
    pub fn failed(title: impl Into<String>, percent: f32, message: impl Into<String>) -> Self {
        Self {
            percent,
            stage: Stage::Error,
            speed: None,
            eta: None,
            title: title.into(),
            error: Some(message.into()),
        }
    }
}

/// One parsed fetcher progress line
#[derive(Clone, Debug, PartialEq)]
pub struct FetchProgress {
    /// Percentage as printed by the fetcher
    pub percent: f32,
    /// Total size (e.g. "50.00MiB")
    pub size: String,
    /// Transfer speed (e.g. "2.50MiB/s")
    pub speed: String,
    /// Remaining time (e.g. "00:15")
    pub eta: String,
}

/// A completed download as stored in the catalog
///
/// Paths are relative to the base storage directory. Which catalog sequence a
/// record belongs to is given by its [`MediaKind`] at insert time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRecord {
    /// Sanitized title
    pub title: String,
    /// Description (empty when the source has none)
    #[serde(default)]
    pub description: String,
    /// Relative thumbnail path, e.g. `videos/T/T.jpg`
    pub thumbnail: String,
    /// Relative media path, e.g. `videos/T/T.mp4`
    pub src: String,
}

impl DownloadRecord {
    /// Build the record for `title` of `kind` with the standard relative layout
    pub fn new(title: &str, description: impl Into<String>, kind: MediaKind) -> Self {
        let dir = kind.directory();
        Self {
            title: title.to_string(),
            description: description.into(),
            thumbnail: format!("{dir}/{title}/{title}.jpg"),
            src: format!("{dir}/{title}/{title}.{}", kind.extension()),
        }
    }

    /// Kind implied by the media path's top-level directory
    pub fn kind(&self) -> Option<MediaKind> {
        let dir = self.src.split('/').next()?;
        [MediaKind::Video, MediaKind::Audio]
            .into_iter()
            .find(|kind| kind.directory() == dir)
    }
}

/// The persisted catalog of completed downloads
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Video records in insertion order
    #[serde(default)]
    pub videos: Vec<DownloadRecord>,
    /// Audio records in insertion order
    #[serde(default)]
    pub musics: Vec<DownloadRecord>,
}

impl Catalog {
    /// Append `record` to the sequence matching `kind`
    pub fn push(&mut self, record: DownloadRecord, kind: MediaKind) {
        match kind {
            MediaKind::Video => self.videos.push(record),
            MediaKind::Audio => self.musics.push(record),
        }
    }

    /// Records of one kind
    pub fn records(&self, kind: MediaKind) -> &[DownloadRecord] {
        match kind {
            MediaKind::Video => &self.videos,
            MediaKind::Audio => &self.musics,
        }
    }

    /// Whether both sequences are empty
    pub fn is_empty(&self) -> bool {
        self.videos.is_empty() && self.musics.is_empty()
    }
}

/// Result of a successful pipeline run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompletedDownload {
    /// The record appended to the catalog
    pub record: DownloadRecord,
    /// Catalog sequence the record was appended to
    pub kind: MediaKind,
    /// Absolute path of the validated media file
    pub media_path: PathBuf,
}
