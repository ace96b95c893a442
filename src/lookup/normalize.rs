use std::sync::OnceLock;

use regex::Regex;

use crate::search::{file_name, normalize_slashes};

fn leading_zeros() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"^0+(\d)").expect("invalid leading zero regex"))
}

fn digit_run() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"\d+").expect("invalid digit run regex"))
}

/// Split a reference into its directory part (with trailing slash) and file stem.
fn split_reference(name: &str) -> (&str, &str) {
  let base = file_name(name);
  let dir = &name[..name.len() - base.len()];
  let stem = match base.rfind('.') {
    Some(0) | None => base,
    Some(index) => &base[..index],
  };
  (dir, stem)
}

/// Query token sent to the lookup service: the bare, lower-cased part number.
///
/// `parts\3001PR0001.dat` becomes `3001pr0001`.
pub fn header_token(name: &str) -> String {
  let normalized = normalize_slashes(name.trim());
  let (_, stem) = split_reference(&normalized);
  stem.to_lowercase()
}

/// Drop leading zeros from the numeric head of a token, if there are any.
///
/// Returns `None` when the token is unchanged.
pub fn strip_leading_zeros(token: &str) -> Option<String> {
  let stripped = leading_zeros().replace(token, "$1");
  (stripped != token).then(|| stripped.into_owned())
}

/// Re-attach the directory of `original` and the content extension to a looked-up identifier.
pub fn qualify_identifier(original: &str, identifier: &str, extension: &str) -> String {
  let normalized = normalize_slashes(original.trim());
  let (dir, _) = split_reference(&normalized);
  format!("{dir}{}{extension}", identifier.trim())
}

/// Best-effort base part for an identifier the lookup could not translate.
///
/// Keeps the first digit run of the file stem and drops everything else, so printed or
/// patterned variants (`3001pr0001.dat`) fall back to their base part (`3001.dat`). Stems
/// without digits are kept whole.
pub fn degraded_identifier(name: &str, extension: &str) -> String {
  let normalized = normalize_slashes(name.trim());
  let (dir, stem) = split_reference(&normalized);
  let base = digit_run()
    .find(stem)
    .map_or(stem, |found| found.as_str());
  format!("{dir}{base}{extension}")
}
