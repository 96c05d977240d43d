//! Fetcher fixtures: an in-process fake and a scripted stand-in for yt-dlp

use async_trait::async_trait;
use media_dl::fetcher::{Fetcher, ProgressCallback, media_path, thumbnail_path};
use media_dl::{Error, FetchProgress, MediaInfo, MediaKind};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Artifact size comfortably above both validation thresholds
pub const VALID_SIZE: usize = 200 * 1024;

/// Artifact size below both validation thresholds
pub const UNDERSIZED: usize = 10 * 1024;

/// In-process fetcher producing a fixed-size artifact
///
/// The title is the last path segment of the URL, taken verbatim.
#[derive(Debug, Clone)]
pub struct FakeFetcher {
    /// Bytes written to the media file
    pub artifact_size: usize,
    /// Percentages replayed through the progress callback
    pub progress: Vec<f32>,
    /// Delay before the artifact is written
    pub delay: Duration,
    /// Description reported in metadata
    pub description: Option<String>,
}

impl Default for FakeFetcher {
    fn default() -> Self {
        Self {
            artifact_size: VALID_SIZE,
            progress: vec![0.0, 25.0, 50.0, 75.0, 100.0],
            delay: Duration::ZERO,
            description: Some("A description".to_string()),
        }
    }
}

impl FakeFetcher {
    /// Fake writing `artifact_size` bytes
    pub fn with_size(artifact_size: usize) -> Self {
        Self {
            artifact_size,
            ..Default::default()
        }
    }

    async fn produce(
        &self,
        kind: MediaKind,
        output_dir: &Path,
        title: &str,
        on_progress: ProgressCallback<'_>,
    ) -> media_dl::Result<PathBuf> {
        for percent in &self.progress {
            on_progress(FetchProgress {
                percent: *percent,
                size: "200.00KiB".to_string(),
                speed: "1.00MiB/s".to_string(),
                eta: "00:00".to_string(),
            });
        }
        tokio::time::sleep(self.delay).await;

        let path = media_path(output_dir, title, kind);
        tokio::fs::write(&path, vec![7u8; self.artifact_size]).await?;
        tokio::fs::write(thumbnail_path(output_dir, title), b"jpg").await?;
        Ok(path)
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch_metadata(&self, url: &str) -> media_dl::Result<MediaInfo> {
        let title = url
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .ok_or_else(|| Error::MetadataParse(format!("no title in {url}")))?;

        Ok(MediaInfo {
            title: title.to_string(),
            description: self.description.clone(),
            thumbnail_url: None,
            duration: Some(212.0),
            source_id: title.to_lowercase(),
            channel: Some("Fixtures".to_string()),
            view_count: Some(1),
        })
    }

    async fn fetch_video(
        &self,
        _url: &str,
        output_dir: &Path,
        title: &str,
        on_progress: ProgressCallback<'_>,
    ) -> media_dl::Result<PathBuf> {
        self.produce(MediaKind::Video, output_dir, title, on_progress)
            .await
    }

    async fn fetch_audio(
        &self,
        _url: &str,
        output_dir: &Path,
        title: &str,
        on_progress: ProgressCallback<'_>,
    ) -> media_dl::Result<PathBuf> {
        self.produce(MediaKind::Audio, output_dir, title, on_progress)
            .await
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}

/// Behavior of the scripted yt-dlp stand-in
#[derive(Debug, Clone)]
pub struct ScriptedYtDlp {
    /// Title printed by `--dump-json`
    pub title: String,
    /// Bytes written to the `-o` path
    pub artifact_size: usize,
    /// Line printed to stderr before a failing exit
    pub stderr: Option<String>,
    /// Exit status of download runs
    pub exit_code: i32,
}

impl ScriptedYtDlp {
    /// Script that succeeds and writes a `.webp` thumbnail
    pub fn succeeding(title: &str, artifact_size: usize) -> Self {
        Self {
            title: title.to_string(),
            artifact_size,
            stderr: None,
            exit_code: 0,
        }
    }

    /// Script whose downloads fail with `stderr` and exit status `exit_code`
    pub fn failing(title: &str, stderr: &str, exit_code: i32) -> Self {
        Self {
            title: title.to_string(),
            artifact_size: 0,
            stderr: Some(stderr.to_string()),
            exit_code,
        }
    }

    /// Write the script into `dir` and return its path
    #[cfg(unix)]
    pub fn install(&self, dir: &Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let failure = match &self.stderr {
            Some(line) => format!("echo '{}' >&2\nexit {}", line, self.exit_code),
            None => String::new(),
        };
        let body = format!(
            r#"#!/bin/sh
out=""
dump=0
while [ $# -gt 0 ]; do
  case "$1" in
    --dump-json) dump=1 ;;
    -o) shift; out="$1" ;;
    -f|--merge-output-format|--audio-format|--audio-quality|--convert-thumbnails) shift ;;
  esac
  shift
done
if [ "$dump" = 1 ]; then
  echo '{{"id":"scripted","title":"{title}","description":"From script"}}'
  exit 0
fi
echo "[youtube] scripted: Downloading webpage"
echo "[download]   0.0% of ~ 200.00KiB at  1.00KiB/s ETA 03:20"
echo "[download]  42.5% of 200.00KiB at 1.00MiB/s ETA 00:01"
{failure}
echo "[download] 100.0% of 200.00KiB at 2.00MiB/s ETA 00:00"
head -c {size} /dev/zero > "$out"
printf 'img' > "${{out%.*}}.webp"
exit 0
"#,
            title = self.title,
            failure = failure,
            size = self.artifact_size,
        );

        let path = dir.join("yt-dlp");
        std::fs::write(&path, body).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }
}
