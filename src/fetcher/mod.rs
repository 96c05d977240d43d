//! External media fetcher
//!
//! The [`Fetcher`] trait is the seam between the download pipeline and the
//! process that actually retrieves media. [`YtDlpFetcher`] drives the yt-dlp
//! executable; tests substitute in-process fakes.
//!
//! ## Invocation lifecycle
//!
//! `Idle -> Spawned -> Streaming -> Exited(success | failure)`, or
//! `SpawnFailed` when the executable cannot be started. There is no retry
//! inside a fetcher: one call is one attempt.
//!
//! ## Output parsing
//!
//! Progress and error parsing live in pure functions
//! ([`parse_progress_line`], [`classify_error`]) that never touch a process.

mod binary;
mod parser;
mod traits;
mod ytdlp;

pub use binary::{BINARY_STEM, binary_name, resolve_binary_path};
pub use parser::{classify_error, exit_code_message, parse_media_info, parse_progress_line};
pub use traits::{Fetcher, ProgressCallback};
pub use ytdlp::{YtDlpFetcher, media_path, thumbnail_path};
