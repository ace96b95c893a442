use std::collections::BTreeSet;

use crate::layout::LibraryLayout;
use crate::search::normalize_slashes;

/// One prefix and case variant of a requested name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
  /// Library prefix the candidate lives under (empty for root-relative candidates).
  pub prefix: String,
  /// Prefix-qualified, slash-normalised path; doubles as the resolved path on success.
  pub path: String,
}

/// Generate the ordered candidate locations for a reference name.
///
/// The first pass uses the name as written, the second its lower-cased form so that libraries
/// extracted onto case-sensitive filesystems still resolve mixed-case references. Inside each
/// pass the root-relative candidate comes first, followed by the parts, primitives and models
/// prefixes.
pub fn generate_candidates(layout: &LibraryLayout, name: &str) -> Vec<Candidate> {
  let normalized = normalize_slashes(name.trim());
  if normalized.is_empty() {
    return Vec::new();
  }

  let mut builder = CandidateBuilder::new(layout);
  builder.add_pass(&normalized);
  builder.add_pass(&normalized.to_lowercase());
  builder.finish()
}

struct CandidateBuilder<'a> {
  layout: &'a LibraryLayout,
  seen: BTreeSet<String>,
  result: Vec<Candidate>,
}

impl<'a> CandidateBuilder<'a> {
  fn new(layout: &'a LibraryLayout) -> Self {
    Self {
      layout,
      seen: BTreeSet::new(),
      result: Vec::new(),
    }
  }

  fn add_pass(&mut self, name: &str) {
    let layout = self.layout;
    self.push(layout.root_relative_prefix(name), name);
    for prefix in layout.search_prefixes() {
      self.push(prefix, name);
    }
  }

  fn finish(self) -> Vec<Candidate> {
    self.result
  }

  fn push(&mut self, prefix: &str, name: &str) {
    let path = format!("{prefix}{name}");
    if self.seen.insert(path.clone()) {
      self.result.push(Candidate {
        prefix: prefix.to_string(),
        path,
      });
    }
  }
}
