use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A located document after its references have been rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDocument {
  /// Resolved path the document is embedded under.
  pub path: String,
  /// Rewritten body, including the synthesized boundary line for non-root documents.
  pub body: String,
}

/// State of a single packing run, threaded through every recursive resolution.
#[derive(Debug, Default)]
pub struct ResolveContext {
  path_map: BTreeMap<String, String>,
  names: HashMap<String, String>,
  documents: Vec<ResolvedDocument>,
  section_names: BTreeSet<String>,
  unsupported: Vec<String>,
}

impl ResolveContext {
  /// Create an empty context.
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns true once `path` has been claimed by a resolution, finished or not.
  pub fn contains_path(&self, path: &str) -> bool {
    self.path_map.contains_key(path)
  }

  /// Claim `path` before its references are walked so cycles terminate.
  pub(crate) fn claim_path(&mut self, path: &str) {
    self
      .path_map
      .insert(path.to_string(), path.to_string());
  }

  /// Resolved path previously produced for a normalised reference name.
  pub(crate) fn name_lookup(&self, name: &str) -> Option<&str> {
    self.names.get(name).map(String::as_str)
  }

  pub(crate) fn remember_name(&mut self, name: String, path: String) {
    self.names.insert(name, path);
  }

  pub(crate) fn push_document(&mut self, document: ResolvedDocument) {
    self.documents.push(document);
  }

  /// Record an embedded section name declared by a `0 FILE` line.
  pub(crate) fn record_section(&mut self, name: &str) {
    self.section_names.insert(name.to_lowercase());
  }

  /// Returns true when `name` is a section embedded by one of the walked documents.
  ///
  /// LDraw names are case-insensitive, so the comparison is too.
  pub fn is_section(&self, name: &str) -> bool {
    self.section_names.contains(&name.to_lowercase())
  }

  /// Record a reference that could not be resolved; repeated names are kept once.
  pub(crate) fn record_unsupported(&mut self, name: &str) {
    if !self.unsupported.iter().any(|existing| existing == name) {
      self.unsupported.push(name.to_string());
    }
  }

  /// Rewritten documents in completion order; dependencies precede the documents using them.
  pub fn documents(&self) -> &[ResolvedDocument] {
    &self.documents
  }

  /// References that exhausted the local search and the external lookup.
  pub fn unsupported(&self) -> &[String] {
    &self.unsupported
  }

  /// Consume the context, returning documents and unsupported references.
  pub fn into_parts(self) -> (Vec<ResolvedDocument>, Vec<String>) {
    (self.documents, self.unsupported)
  }
}
