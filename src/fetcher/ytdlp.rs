//! Fetcher backed by the external yt-dlp executable

use super::binary::resolve_binary_path;
use super::parser::{fetch_failed, parse_media_info, parse_progress_line};
use super::traits::{Fetcher, ProgressCallback};
use crate::config::FetcherConfig;
use crate::error::{Error, Result};
use crate::types::{MediaInfo, MediaKind};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};

/// Extensions yt-dlp may leave the thumbnail under, tried in order
const THUMBNAIL_FALLBACK_EXTENSIONS: &[&str] = &["webp", "png"];

/// Video format selector: mp4 video + m4a audio, falling back to the best single file
const VIDEO_FORMAT: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best";

/// Audio bitrate for extracted mp3 files
const AUDIO_QUALITY: &str = "128K";

/// yt-dlp based fetcher
///
/// Each call spawns one yt-dlp process. Output is streamed: progress lines
/// are parsed as they arrive and stderr is collected for error
/// classification. The child is killed if the returned future is dropped.
///
/// # Examples
///
/// ```no_run
/// use media_dl::fetcher::YtDlpFetcher;
/// use std::path::PathBuf;
///
/// // Explicit path
/// let fetcher = YtDlpFetcher::new(PathBuf::from("/usr/local/bin/yt-dlp"));
///
/// // Or resolved from configuration
/// let fetcher = YtDlpFetcher::from_config(&Default::default());
/// ```
pub struct YtDlpFetcher {
    binary_path: PathBuf,
}

impl YtDlpFetcher {
    /// Create a fetcher using the binary at `binary_path`
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }

    /// Create a fetcher using [`resolve_binary_path`]
    pub fn from_config(config: &FetcherConfig) -> Self {
        Self::new(resolve_binary_path(config))
    }

    /// Path of the executable this fetcher spawns
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    fn spawn(&self, args: &[String]) -> Result<Child> {
        tracing::debug!(binary = %self.binary_path.display(), ?args, "spawning fetcher");

        Command::new(&self.binary_path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))
    }

    fn spawn_error(&self, source: std::io::Error) -> Error {
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::BinaryNotFound {
                path: self.binary_path.clone(),
            }
        } else {
            Error::ProcessSpawn {
                binary: self.binary_path.clone(),
                source,
            }
        }
    }

    /// Run a download invocation, streaming stdout progress into `on_progress`
    async fn run_download(&self, args: &[String], on_progress: ProgressCallback<'_>) -> Result<()> {
        let mut child = self.spawn(args)?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Io(std::io::Error::other("fetcher stdout not captured")))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::Io(std::io::Error::other("fetcher stderr not captured")))?;

        // Lines are split on raw bytes: titles in yt-dlp output are not
        // guaranteed to be UTF-8.
        let read_stdout = async {
            let mut segments = BufReader::new(stdout).split(b'\n');
            while let Some(segment) = segments.next_segment().await? {
                let line = String::from_utf8_lossy(&segment);
                let line = line.trim_end_matches('\r');
                match parse_progress_line(line) {
                    Some(progress) => on_progress(progress),
                    None => tracing::trace!(line = %line, "fetcher output"),
                }
            }
            Ok::<(), std::io::Error>(())
        };

        let read_stderr = async {
            let mut buf = Vec::new();
            stderr.read_to_end(&mut buf).await?;
            Ok::<String, std::io::Error>(String::from_utf8_lossy(&buf).into_owned())
        };

        let (stdout_result, stderr_result) = tokio::join!(read_stdout, read_stderr);
        let status = child.wait().await?;
        stdout_result?;
        let stderr_text = stderr_result?;

        if !status.success() {
            tracing::warn!(
                exit_code = ?status.code(),
                stderr = %stderr_text.trim(),
                "fetcher exited with failure"
            );
            return Err(fetch_failed(&stderr_text, status.code()));
        }

        Ok(())
    }

    async fn download(
        &self,
        kind: MediaKind,
        url: &str,
        output_dir: &Path,
        title: &str,
        on_progress: ProgressCallback<'_>,
    ) -> Result<PathBuf> {
        let output_path = media_path(output_dir, title, kind);
        let args = download_args(kind, url, &output_path);

        self.run_download(&args, on_progress).await?;
        normalize_thumbnail(output_dir, title).await;

        Ok(output_path)
    }
}

#[async_trait]
impl Fetcher for YtDlpFetcher {
    async fn fetch_metadata(&self, url: &str) -> Result<MediaInfo> {
        let args = metadata_args(url);
        let child = self.spawn(&args)?;
        let output = child.wait_with_output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(fetch_failed(&stderr, output.status.code()));
        }

        parse_media_info(&output.stdout)
    }

    async fn fetch_video(
        &self,
        url: &str,
        output_dir: &Path,
        title: &str,
        on_progress: ProgressCallback<'_>,
    ) -> Result<PathBuf> {
        self.download(MediaKind::Video, url, output_dir, title, on_progress)
            .await
    }

    async fn fetch_audio(
        &self,
        url: &str,
        output_dir: &Path,
        title: &str,
        on_progress: ProgressCallback<'_>,
    ) -> Result<PathBuf> {
        self.download(MediaKind::Audio, url, output_dir, title, on_progress)
            .await
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}

/// Deterministic media path `<output_dir>/<title>.<ext>`
pub fn media_path(output_dir: &Path, title: &str, kind: MediaKind) -> PathBuf {
    output_dir.join(format!("{}.{}", title, kind.extension()))
}

/// Canonical thumbnail path `<output_dir>/<title>.jpg`
pub fn thumbnail_path(output_dir: &Path, title: &str) -> PathBuf {
    output_dir.join(format!("{}.jpg", title))
}

fn metadata_args(url: &str) -> Vec<String> {
    vec![
        "--dump-json".to_string(),
        "--no-playlist".to_string(),
        url.to_string(),
    ]
}

fn download_args(kind: MediaKind, url: &str, output_path: &Path) -> Vec<String> {
    let mut args: Vec<String> = match kind {
        MediaKind::Video => vec![
            "-f".into(),
            VIDEO_FORMAT.into(),
            "--merge-output-format".into(),
            "mp4".into(),
        ],
        MediaKind::Audio => vec![
            "-x".into(),
            "--audio-format".into(),
            "mp3".into(),
            "--audio-quality".into(),
            AUDIO_QUALITY.into(),
        ],
    };

    args.extend([
        "-o".to_string(),
        output_path.to_string_lossy().into_owned(),
        "--write-thumbnail".to_string(),
        "--convert-thumbnails".to_string(),
        "jpg".to_string(),
        "--no-playlist".to_string(),
        "--newline".to_string(),
        url.to_string(),
    ]);
    args
}

/// Rename a thumbnail written under a fallback extension to `<title>.jpg`
///
/// The first fallback present wins. Leaves an existing `.jpg` untouched.
async fn normalize_thumbnail(output_dir: &Path, title: &str) {
    let canonical = thumbnail_path(output_dir, title);
    if tokio::fs::try_exists(&canonical).await.unwrap_or(false) {
        return;
    }

    for ext in THUMBNAIL_FALLBACK_EXTENSIONS {
        let candidate = output_dir.join(format!("{}.{}", title, ext));
        if !tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
            continue;
        }
        match tokio::fs::rename(&candidate, &canonical).await {
            Ok(()) => tracing::debug!(from = %candidate.display(), "renamed thumbnail to jpg"),
            Err(e) => tracing::warn!(
                from = %candidate.display(),
                error = %e,
                "failed to rename thumbnail"
            ),
        }
        return;
    }
}
