//! Configuration types for media-dl

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How the fetcher executable was installed alongside the host application
///
/// Chosen by the embedding application at startup. The library never inspects
/// the environment to guess whether it is running from an installed package.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum InstallMode {
    /// Installed application: the binary lives in `<resources_dir>/bin/`
    Packaged {
        /// Packaged resource directory of the host application
        resources_dir: PathBuf,
    },
    /// Development checkout: the binary lives in `bin_dir`
    Development {
        /// Directory holding the development copy of the binary
        #[serde(default = "default_bin_dir")]
        bin_dir: PathBuf,
    },
}

impl Default for InstallMode {
    fn default() -> Self {
        InstallMode::Development {
            bin_dir: default_bin_dir(),
        }
    }
}

impl InstallMode {
    /// Directory the fetcher binary is expected in for this mode
    pub fn binary_dir(&self) -> PathBuf {
        match self {
            InstallMode::Packaged { resources_dir } => resources_dir.join("bin"),
            InstallMode::Development { bin_dir } => bin_dir.clone(),
        }
    }
}

/// Fetcher executable settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Where the bundled binary is looked up
    #[serde(default)]
    pub install_mode: InstallMode,

    /// Explicit binary path (overrides `install_mode` when set)
    #[serde(default)]
    pub binary_path: Option<PathBuf>,

    /// Fall back to searching PATH when the resolved binary is absent (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            install_mode: InstallMode::default(),
            binary_path: None,
            search_path: true,
        }
    }
}

/// On-disk storage settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base directory holding `videos/`, `musics/` and `database/` (default: "./downloads")
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
        }
    }
}

/// Main configuration for [`MediaDownloader`](crate::MediaDownloader)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Storage layout settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Fetcher executable settings
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Buffer size of the progress broadcast channel (default: 1000)
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            fetcher: FetcherConfig::default(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

impl Config {
    /// Build a config rooted at `base_dir`, everything else defaulted
    pub fn with_base_dir(base_dir: impl AsRef<Path>) -> Self {
        Self {
            storage: StorageConfig {
                base_dir: base_dir.as_ref().to_path_buf(),
            },
            ..Default::default()
        }
    }

    /// Base storage directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.storage.base_dir
    }
}

fn default_true() -> bool {
    true
}

fn default_base_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_bin_dir() -> PathBuf {
    PathBuf::from("./bin")
}

fn default_event_channel_capacity() -> usize {
    1000
}
