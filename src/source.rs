//! Read-only document storage consulted by the resolver.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

/// Storage the resolver reads candidate documents from.
pub trait DocumentSource {
  /// Read the document stored at the slash-separated `path`.
  ///
  /// An error means the candidate is unreadable; the resolver moves on to the next one.
  fn read(&self, path: &str) -> io::Result<String>;
}

/// Filesystem storage made of ordered search roots.
#[derive(Debug, Clone)]
pub struct FsSource {
  roots: Vec<PathBuf>,
}

impl FsSource {
  /// Create a source searching `roots` in order.
  pub fn new(roots: impl IntoIterator<Item = PathBuf>) -> Self {
    Self {
      roots: roots.into_iter().collect(),
    }
  }
}

impl DocumentSource for FsSource {
  fn read(&self, path: &str) -> io::Result<String> {
    let mut last_error = None;
    for root in &self.roots {
      let candidate = join_slash_path(root, path);
      match fs::read(&candidate) {
        Ok(bytes) => {
          log::trace!("read {}", candidate.display());
          return Ok(String::from_utf8_lossy(&bytes).into_owned());
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => {
          log::debug!("cannot read {}: {}", candidate.display(), err);
          last_error = Some(err);
        }
      }
    }
    Err(last_error.unwrap_or_else(|| io::Error::new(ErrorKind::NotFound, path.to_string())))
  }
}

fn join_slash_path(root: &Path, path: &str) -> PathBuf {
  path
    .split('/')
    .filter(|segment| !segment.is_empty())
    .fold(root.to_path_buf(), |acc, segment| acc.join(segment))
}
