//! Candidate-location search for LDraw reference names.
//!
//! Name normalisation and the candidate table live here; the resolver walks the table in order
//! against its search roots and stops at the first readable document.

mod candidates;

pub use candidates::{Candidate, generate_candidates};

/// Rewrite every backslash into a forward slash.
///
/// LDraw files authored on Windows reference subparts as `s\3001s01.dat`; resolved paths always
/// use forward slashes so they behave the same on every platform.
pub fn normalize_slashes(name: &str) -> String {
  name.replace('\\', "/")
}

/// Final path component of a slash-normalised name.
pub fn file_name(name: &str) -> &str {
  name.rsplit('/').next().unwrap_or(name)
}
