//! Error types surfaced by the packer library.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the crate.
pub type PackResult<T> = Result<T, PackError>;

/// Fatal failures of a packing run.
///
/// Anything below the root document degrades instead of failing, so this enum stays small.
#[derive(Debug, Error)]
pub enum PackError {
  /// The root model could not be read under any search root.
  #[error("root model `{0}` could not be found")]
  RootNotFound(String),
  /// Reading or writing a file failed.
  #[error("failed to access {}: {}", .path.display(), .source)]
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    #[source]
    source: std::io::Error,
  },
  /// The computed output path points at the input model.
  #[error("refusing to overwrite the input model {}", .0.display())]
  OutputIsInput(PathBuf),
  /// The external lookup client could not be constructed.
  #[error("failed to initialise the identifier lookup: {0}")]
  Lookup(#[from] LookupError),
}

/// Failures of a single external identifier lookup.
///
/// The resolver treats every variant as "no match"; they exist so the cause can be logged.
#[derive(Debug, Error)]
pub enum LookupError {
  /// The request could not be sent or the body could not be read.
  #[error("lookup request failed: {0}")]
  Transport(#[from] reqwest::Error),
  /// The service answered with a non-success status.
  #[error("lookup service answered with status {0}")]
  Status(u16),
  /// The response body was not JSON.
  #[error("lookup response could not be decoded: {0}")]
  Decode(#[from] serde_json::Error),
}
