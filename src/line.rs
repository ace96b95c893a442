//! Classification of raw LDraw lines.
//!
//! The packer only cares about two line forms: `0 FILE` boundaries that separate the sections
//! of a multi-part document, and type `1` lines that pull in another document. Everything else
//! is carried through opaquely.

use crate::search::normalize_slashes;

/// Meta command opening a new section of a multi-part document.
pub const FILE_BOUNDARY_TOKEN: &str = "0 FILE";

/// Meta command closing the current section of a multi-part document.
pub const NOFILE_TOKEN: &str = "0 NOFILE";

/// Token opening a subfile reference line.
pub const SUBPART_TOKEN: &str = "1 ";

/// Number of whitespace-delimited fields between the subpart token and the referenced name:
/// colour, the position vector and the nine rotation matrix entries.
pub const SUBPART_FIELD_COUNT: usize = 13;

/// A single classified document line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
  /// Boundary on the first line of a document; its own self-declaration is never re-emitted.
  Suppressed,
  /// Start of an embedded section, with the slash-normalised section name.
  FileBoundary(String),
  /// Reference to another document.
  SubpartRef {
    /// Indentation, token and fixed fields, including the whitespace before the name,
    /// byte-for-byte.
    prefix: &'a str,
    /// Referenced name as written, trimmed.
    name: &'a str,
  },
  /// Any other line, untouched.
  Plain(&'a str),
}

/// Normalise line endings so a document can be split on `\n` alone.
pub fn normalize_line_endings(text: &str) -> String {
  text.replace("\r\n", "\n")
}

/// Classify one line. `is_first_line` marks the first line of its document.
pub fn classify(line: &str, is_first_line: bool) -> Line<'_> {
  let stripped = line.trim_start_matches([' ', '\t']);

  if let Some(payload) = boundary_payload(stripped) {
    if is_first_line {
      return Line::Suppressed;
    }
    return Line::FileBoundary(normalize_slashes(payload.trim()));
  }

  if let Some(fields) = stripped.strip_prefix(SUBPART_TOKEN) {
    if let Some((consumed, rest)) = skip_fields(fields, SUBPART_FIELD_COUNT) {
      let name = rest.trim_end();
      if !name.is_empty() {
        let indent = line.len() - stripped.len();
        let prefix_len = indent + SUBPART_TOKEN.len() + consumed.len();
        return Line::SubpartRef {
          prefix: &line[..prefix_len],
          name,
        };
      }
    }
  }

  Line::Plain(line)
}

fn boundary_payload(stripped: &str) -> Option<&str> {
  let rest = stripped.strip_prefix(FILE_BOUNDARY_TOKEN)?;
  if rest.is_empty() || rest.starts_with([' ', '\t']) {
    Some(rest)
  } else {
    None
  }
}

/// Skip `count` whitespace-delimited fields of `text`.
///
/// Returns the consumed text (fields plus the whitespace following the last one) and the
/// remainder, or `None` when `text` holds fewer than `count` fields.
pub fn skip_fields(text: &str, count: usize) -> Option<(&str, &str)> {
  let mut index = skip_whitespace(text, 0);

  for _ in 0..count {
    let field_end = text[index..]
      .find(char::is_whitespace)
      .map_or(text.len(), |offset| index + offset);
    if field_end == index {
      return None;
    }
    index = skip_whitespace(text, field_end);
  }

  Some((&text[..index], &text[index..]))
}

fn skip_whitespace(text: &str, from: usize) -> usize {
  text[from..]
    .find(|c: char| !c.is_whitespace())
    .map_or(text.len(), |offset| from + offset)
}
