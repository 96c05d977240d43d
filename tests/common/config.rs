//! Test configuration helpers for creating downloaders in temp directories

use super::fixtures::{FakeFetcher, ScriptedYtDlp};
use media_dl::config::{FetcherConfig, InstallMode};
use media_dl::{Config, MediaDownloader};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Config rooted at `<dir>/media` with PATH lookup disabled
pub fn test_config(dir: &Path) -> Config {
    let mut config = Config::with_base_dir(dir.join("media"));
    config.fetcher = FetcherConfig {
        install_mode: InstallMode::Development {
            bin_dir: dir.join("bin"),
        },
        binary_path: None,
        search_path: false,
    };
    config
}

/// Downloader backed by an in-process fake fetcher
///
/// Returns the downloader and the tempdir (which must be kept alive).
pub async fn create_test_downloader(fetcher: FakeFetcher) -> (MediaDownloader, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let downloader = MediaDownloader::with_fetcher(test_config(temp_dir.path()), Arc::new(fetcher))
        .await
        .unwrap();
    (downloader, temp_dir)
}

/// Downloader spawning a scripted yt-dlp from `<dir>/bin`
///
/// Goes through [`MediaDownloader::new`], so binary resolution and process
/// plumbing are exercised for real.
#[cfg(unix)]
pub async fn create_scripted_downloader(script: ScriptedYtDlp) -> (MediaDownloader, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let bin_dir = temp_dir.path().join("bin");
    std::fs::create_dir_all(&bin_dir).unwrap();
    script.install(&bin_dir);

    let downloader = MediaDownloader::new(test_config(temp_dir.path()))
        .await
        .unwrap();
    (downloader, temp_dir)
}
