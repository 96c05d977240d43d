//! Fetcher executable discovery

use crate::config::FetcherConfig;
use std::path::PathBuf;

/// Base name of the fetcher executable
pub const BINARY_STEM: &str = "yt-dlp";

/// Platform-specific file name of the fetcher executable
pub fn binary_name() -> String {
    if cfg!(windows) {
        format!("{}.exe", BINARY_STEM)
    } else {
        BINARY_STEM.to_string()
    }
}

/// Resolve the absolute path of the fetcher executable
///
/// Resolution order:
/// 1. `binary_path` when explicitly configured
/// 2. `<install_mode dir>/<binary_name>`
/// 3. PATH lookup via `which`, only when `search_path` is enabled and step 2
///    does not exist
///
/// Existence is not required: a missing binary surfaces as
/// [`Error::BinaryNotFound`](crate::Error::BinaryNotFound) when it is spawned.
pub fn resolve_binary_path(config: &FetcherConfig) -> PathBuf {
    if let Some(ref explicit) = config.binary_path {
        return absolutize(explicit.clone());
    }

    let bundled = absolutize(config.install_mode.binary_dir().join(binary_name()));
    if bundled.exists() || !config.search_path {
        return bundled;
    }

    match which::which(BINARY_STEM) {
        Ok(found) => {
            tracing::debug!(path = %found.display(), "using fetcher binary from PATH");
            found
        }
        Err(_) => bundled,
    }
}

fn absolutize(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path,
    }
}
