//! JSON catalog of completed downloads
//!
//! The catalog lives at `<base>/database/catalog.json` next to two private
//! siblings:
//! - `catalog.json.backup`: copy of the previous primary, taken before each write
//! - `catalog.json.tmp`: staging file for the next primary
//!
//! ## Write protocol
//!
//! 1. Copy the current primary to the backup when it is readable (failure is
//!    logged, not fatal)
//! 2. Serialize to the temp file and fsync it
//! 3. Re-read the temp file and check it has both `videos` and `musics`
//! 4. Rename the temp file over the primary
//!
//! Rename is atomic, so a reader sees either the previous or the new
//! catalog, never a truncated one. On failure in steps 2-4 the temp file is
//! removed and, if the primary is missing or unreadable, it is restored from
//! the backup.
//!
//! ## Reads
//!
//! [`CatalogStore::read`] never fails: an empty or unparsable primary is
//! replaced by a valid backup when one exists, otherwise an empty catalog is
//! returned.
//!
//! ## Serialization
//!
//! Every store opened on the same base directory shares one async mutex, so
//! concurrent [`CatalogStore::insert`] calls cannot lose each other's
//! records.

use crate::error::{CatalogError, Result};
use crate::types::{Catalog, DownloadRecord, MediaKind};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, LazyLock, Weak};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

/// Directory under the base path holding the catalog
pub const CATALOG_DIR: &str = "database";
/// Catalog file name
pub const CATALOG_FILE: &str = "catalog.json";

const BACKUP_SUFFIX: &str = ".backup";
const TEMP_SUFFIX: &str = ".tmp";

/// Writer locks keyed by canonical base directory
static WRITE_LOCKS: LazyLock<std::sync::Mutex<HashMap<PathBuf, Weak<Mutex<()>>>>> =
    LazyLock::new(|| std::sync::Mutex::new(HashMap::new()));

/// Canonical form of `path`, stable before and after it is created
///
/// The deepest existing ancestor is canonicalized (resolving `..` and
/// symlinks) and the not-yet-existing remainder is appended lexically.
fn lock_key(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

    for ancestor in absolute.ancestors() {
        let Ok(canonical) = std::fs::canonicalize(ancestor) else {
            continue;
        };
        let Ok(rest) = absolute.strip_prefix(ancestor) else {
            break;
        };
        let mut key = canonical;
        for component in rest.components() {
            match component {
                Component::ParentDir => {
                    key.pop();
                }
                Component::Normal(name) => key.push(name),
                _ => {}
            }
        }
        return key;
    }
    absolute
}

fn write_lock_for(base_dir: &Path) -> Arc<Mutex<()>> {
    let key = lock_key(base_dir);
    let mut locks = WRITE_LOCKS
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    if let Some(existing) = locks.get(&key).and_then(Weak::upgrade) {
        return existing;
    }

    locks.retain(|_, lock| lock.strong_count() > 0);
    let lock = Arc::new(Mutex::new(()));
    locks.insert(key, Arc::downgrade(&lock));
    lock
}

/// Durable store for the download catalog (cloneable, clones share the lock)
#[derive(Clone, Debug)]
pub struct CatalogStore {
    base_dir: PathBuf,
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl CatalogStore {
    /// Open the store for `base_dir` (no I/O is performed)
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let path = base_dir.join(CATALOG_DIR).join(CATALOG_FILE);
        let write_lock = write_lock_for(&base_dir);

        Self {
            base_dir,
            path,
            write_lock,
        }
    }

    /// Base directory this store belongs to
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of the primary catalog file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn backup_path(&self) -> PathBuf {
        with_suffix(&self.path, BACKUP_SUFFIX)
    }

    pub(crate) fn temp_path(&self) -> PathBuf {
        with_suffix(&self.path, TEMP_SUFFIX)
    }

    /// Create the catalog directory and an empty catalog file if missing
    ///
    /// Idempotent: an existing file is left untouched. Returns the primary path.
    pub async fn ensure_exists(&self) -> Result<PathBuf> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        if !tokio::fs::try_exists(&self.path).await? {
            let _guard = self.write_lock.lock().await;
            // Re-check under the lock; another task may have created it.
            if !tokio::fs::try_exists(&self.path).await? {
                if load(&self.backup_path()).await.is_ok() {
                    tracing::warn!(path = %self.path.display(), "catalog missing, restoring from backup");
                    self.restore_from_backup().await?;
                } else {
                    tracing::info!(path = %self.path.display(), "creating empty catalog");
                    self.stage_and_commit(&Catalog::default()).await?;
                }
            }
        }

        Ok(self.path.clone())
    }

    /// Load the catalog, recovering from the backup if needed
    ///
    /// Never fails: the worst case is an empty catalog.
    pub async fn read(&self) -> Catalog {
        let _guard = self.write_lock.lock().await;
        self.read_unlocked().await
    }

    /// Replace the catalog on disk using the copy-on-write protocol
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Corrupt`] if the staged file fails verification
    /// - [`CatalogError::WriteFailed`] if staging or committing fails
    pub async fn write(&self, catalog: &Catalog) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write_unlocked(catalog).await
    }

    /// Append `record` to the sequence for `kind`
    ///
    /// The read-modify-write runs under the base directory's writer lock.
    pub async fn insert(&self, record: DownloadRecord, kind: MediaKind) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut catalog = self.read_unlocked().await;
        tracing::debug!(title = %record.title, %kind, "appending catalog record");
        catalog.push(record, kind);
        self.write_unlocked(&catalog).await
    }

    async fn read_unlocked(&self) -> Catalog {
        if let Some(dir) = self.path.parent()
            && let Err(e) = tokio::fs::create_dir_all(dir).await
        {
            tracing::warn!(dir = %dir.display(), error = %e, "failed to create catalog directory");
        }

        let primary_exists = tokio::fs::try_exists(&self.path).await.unwrap_or(true);
        if !primary_exists && !self.backup_exists().await {
            if let Err(e) = self.stage_and_commit(&Catalog::default()).await {
                tracing::warn!(error = %e, "failed to materialize empty catalog");
            }
            return Catalog::default();
        }

        let failure = match load(&self.path).await {
            Ok(catalog) => return catalog,
            Err(reason) => reason,
        };

        tracing::error!(
            path = %self.path.display(),
            reason = %failure,
            "catalog unreadable, trying backup"
        );

        let backup = self.backup_path();
        match load(&backup).await {
            Ok(catalog) => {
                tracing::warn!(backup = %backup.display(), "restoring catalog from backup");
                if let Err(e) = self.restore_from_backup().await {
                    tracing::error!(error = %e, "failed to restore catalog from backup");
                }
                catalog
            }
            Err(reason) => {
                tracing::error!(
                    reason = %reason,
                    "catalog recovery failed, using empty catalog"
                );
                Catalog::default()
            }
        }
    }

    async fn write_unlocked(&self, catalog: &Catalog) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| write_failed("create catalog directory", &e))?;
        }

        // An unreadable primary is not copied: it would clobber a good backup.
        let primary_exists = tokio::fs::try_exists(&self.path).await.unwrap_or(false);
        if primary_exists {
            match load(&self.path).await {
                Ok(_) => {
                    if let Err(e) = tokio::fs::copy(&self.path, self.backup_path()).await {
                        tracing::warn!(error = %e, "failed to back up catalog, continuing");
                    }
                }
                Err(reason) => {
                    tracing::warn!(reason = %reason, "not backing up unreadable catalog");
                }
            }
        }

        match self.stage_and_commit(catalog).await {
            Ok(()) => {
                tracing::debug!(
                    videos = catalog.videos.len(),
                    musics = catalog.musics.len(),
                    "catalog written"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "catalog write failed");
                self.cleanup_after_failed_write().await;
                Err(e.into())
            }
        }
    }

    /// Steps 2-4 of the write protocol
    async fn stage_and_commit(&self, catalog: &Catalog) -> std::result::Result<(), CatalogError> {
        let temp = self.temp_path();

        let json = serde_json::to_vec_pretty(catalog).map_err(|e| write_failed("serialize", &e))?;
        write_synced(&temp, &json)
            .await
            .map_err(|e| write_failed("write temp file", &e))?;

        let staged = tokio::fs::read(&temp)
            .await
            .map_err(|e| write_failed("re-read temp file", &e))?;
        verify_catalog_bytes(&staged)?;

        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| write_failed("rename temp file", &e))
    }

    async fn cleanup_after_failed_write(&self) {
        let temp = self.temp_path();
        if tokio::fs::try_exists(&temp).await.unwrap_or(false)
            && let Err(e) = tokio::fs::remove_file(&temp).await
        {
            tracing::warn!(temp = %temp.display(), error = %e, "failed to remove temp catalog");
        }

        if load(&self.path).await.is_ok() || !self.backup_exists().await {
            return;
        }

        match self.restore_from_backup().await {
            Ok(()) => tracing::warn!("catalog write failed, restored from backup"),
            Err(e) => tracing::error!(error = %e, "failed to restore catalog from backup"),
        }
    }

    /// Copy the backup's bytes over the primary
    ///
    /// Only called when the primary is missing or unreadable, so a torn copy
    /// is no worse than what it replaces and is repaired by the next read.
    async fn restore_from_backup(&self) -> std::io::Result<()> {
        tokio::fs::copy(self.backup_path(), &self.path).await?;
        Ok(())
    }

    async fn backup_exists(&self) -> bool {
        tokio::fs::try_exists(self.backup_path())
            .await
            .unwrap_or(false)
    }
}

/// Check a staged document has both record sequences
pub(crate) fn verify_catalog_bytes(bytes: &[u8]) -> std::result::Result<(), CatalogError> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| CatalogError::Corrupt(e.to_string()))?;

    for key in ["videos", "musics"] {
        if !value.get(key).is_some_and(serde_json::Value::is_array) {
            return Err(CatalogError::Corrupt(format!("missing `{}` array", key)));
        }
    }
    Ok(())
}

/// Read and parse one catalog file; empty content counts as a failure
async fn load(path: &Path) -> std::result::Result<Catalog, String> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("read error: {}", e))?;

    if content.trim().is_empty() {
        return Err("file is empty".to_string());
    }

    serde_json::from_str(&content).map_err(|e| format!("parse error: {}", e))
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

fn write_failed(step: &str, err: &dyn std::fmt::Display) -> CatalogError {
    CatalogError::WriteFailed {
        cause: format!("{}: {}", step, err),
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(suffix);
    PathBuf::from(os)
}
