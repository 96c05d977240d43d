//! Parsers for yt-dlp output
//!
//! Everything here is a pure function over literal text so it can be tested
//! without spawning the fetcher.

use crate::error::{Error, Result};
use crate::types::{FetchProgress, MediaInfo};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

/// Matches `[download]  45.2% of 50.00MiB at 2.50MiB/s ETA 00:15`
///
/// yt-dlp prefixes estimated sizes with `~`, which is tolerated and dropped.
#[allow(clippy::expect_used)]
static PROGRESS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[download\]\s+(\d+(?:\.\d+)?)%\s+of\s+~?\s*(\S+)\s+at\s+(\S+)\s+ETA\s+(\S+)")
        .expect("progress pattern is a valid regex")
});

/// Known stderr fragments and the message shown to the user for each
///
/// Order matters: the first fragment found wins.
const ERROR_MESSAGES: &[(&str, &str)] = &[
    (
        "Video unavailable",
        "This video is private or has been deleted",
    ),
    (
        "Sign in to confirm your age",
        "Age-restricted video, cannot download",
    ),
    (
        "not available in your country",
        "Video not available in your region",
    ),
    ("is not a valid URL", "Invalid YouTube URL"),
    ("Unable to extract", "Unable to extract video information"),
];

/// Parse one line of fetcher stdout into a progress update
///
/// Returns `None` for anything that is not a download progress line.
pub fn parse_progress_line(line: &str) -> Option<FetchProgress> {
    let caps = PROGRESS_LINE.captures(line)?;
    let percent = caps.get(1)?.as_str().parse::<f32>().ok()?;

    Some(FetchProgress {
        percent,
        size: caps.get(2)?.as_str().to_string(),
        speed: caps.get(3)?.as_str().to_string(),
        eta: caps.get(4)?.as_str().to_string(),
    })
}

/// Map fetcher stderr to a user-facing message
///
/// Returns `None` when nothing recognizable is present; callers then fall back
/// to [`exit_code_message`].
pub fn classify_error(stderr: &str) -> Option<&'static str> {
    ERROR_MESSAGES
        .iter()
        .find(|(needle, _)| stderr.contains(needle))
        .map(|(_, message)| *message)
}

/// Generic message for a non-zero exit with unrecognized stderr
pub fn exit_code_message(exit_code: Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("yt-dlp exited with code {}", code),
        None => "yt-dlp was terminated by a signal".to_string(),
    }
}

/// Build the `FetchFailed` error for a failed invocation
pub fn fetch_failed(stderr: &str, exit_code: Option<i32>) -> Error {
    let message = classify_error(stderr)
        .map(str::to_string)
        .unwrap_or_else(|| exit_code_message(exit_code));

    Error::FetchFailed { exit_code, message }
}

/// Subset of the `--dump-json` document we care about
#[derive(Debug, Deserialize)]
struct DumpJson {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    id: String,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    view_count: Option<u64>,
}

/// Parse the stdout of a metadata dump into [`MediaInfo`]
pub fn parse_media_info(stdout: &[u8]) -> Result<MediaInfo> {
    let dump: DumpJson =
        serde_json::from_slice(stdout).map_err(|e| Error::MetadataParse(e.to_string()))?;

    Ok(MediaInfo {
        title: dump.title,
        description: dump.description,
        thumbnail_url: dump.thumbnail,
        duration: dump.duration,
        source_id: dump.id,
        channel: dump.channel,
        view_count: dump.view_count,
    })
}
