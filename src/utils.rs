//! Utility functions for titles and on-disk artifacts

use crate::error::{ArtifactProblem, Error, Result};
use crate::types::MediaKind;
use std::path::{Component, Path};

/// Characters removed from titles before they become directory and file names
pub const FORBIDDEN_TITLE_CHARS: &[char] = &['!', '?', '@', '#', '$', '%', '^', '&', '*', '|', '.', ';'];

/// Name used when a title sanitizes to nothing and the source has no id
const UNTITLED: &str = "untitled";

/// Replacement for path separators inside a title
const SEPARATOR_REPLACEMENT: &str = "_";

/// Strip every [`FORBIDDEN_TITLE_CHARS`] character from `title`
///
/// Nothing else is altered: whitespace, case and other punctuation survive.
///
/// # Examples
///
/// ```
/// use media_dl::utils::sanitize_title;
///
/// assert_eq!(sanitize_title("My! Video?"), "My Video");
/// assert_eq!(sanitize_title("v1.0 release; final"), "v10 release final");
/// ```
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| !FORBIDDEN_TITLE_CHARS.contains(c))
        .collect()
}

/// Sanitized title usable as a single path component
///
/// Path separators become `_`. Falls back to the sanitized `source_id`, then
/// to `"untitled"`, when the title is blank or still not a plain file name
/// (a drive prefix on Windows, for instance).
///
/// # Examples
///
/// ```
/// use media_dl::utils::storage_title;
///
/// assert_eq!(storage_title("AC/DC", "id"), "AC_DC");
/// assert_eq!(storage_title("/etc/x", "id"), "_etc_x");
/// assert_eq!(storage_title("?!", "abc"), "abc");
/// ```
pub fn storage_title(title: &str, source_id: &str) -> String {
    [title, source_id]
        .into_iter()
        .map(|candidate| sanitize_title(candidate).replace(['/', '\\'], SEPARATOR_REPLACEMENT))
        .find(|candidate| !candidate.trim().is_empty() && is_single_component(candidate))
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// True when `name` joins onto a directory as exactly one normal component
fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Check that `path` holds a plausible artifact of `kind`
///
/// Returns the file size on success.
///
/// # Errors
///
/// [`Error::ArtifactInvalid`] when the file is missing, empty or not larger
/// than [`MediaKind::min_artifact_size`]; [`Error::Io`] for other metadata
/// errors.
pub async fn validate_artifact(path: &Path, kind: MediaKind) -> Result<u64> {
    let invalid = |reason| Error::ArtifactInvalid {
        path: path.to_path_buf(),
        reason,
    };

    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(invalid(ArtifactProblem::Missing));
        }
        Err(e) => return Err(e.into()),
    };

    if !metadata.is_file() {
        return Err(invalid(ArtifactProblem::Missing));
    }

    let size = metadata.len();
    let minimum = kind.min_artifact_size();
    if size == 0 {
        Err(invalid(ArtifactProblem::Empty))
    } else if size <= minimum {
        Err(invalid(ArtifactProblem::TooSmall { size, minimum }))
    } else {
        Ok(size)
    }
}
