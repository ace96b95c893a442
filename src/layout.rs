//! Filesystem and naming conventions of an LDraw parts library.

/// Owned description of the library layout consumed by the resolver and packer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryLayout {
  /// Prefix for standard parts, relative to the library root.
  pub parts_prefix: String,
  /// Prefix for shared primitives.
  pub primitives_prefix: String,
  /// Prefix for library models.
  pub models_prefix: String,
  /// Leading name segment marking a subpart (`s/`), mapped onto the parts prefix.
  pub subpart_marker: String,
  /// Leading name segments marking secondary primitive geometry, mapped onto the primitives prefix.
  pub secondary_geometry_markers: Vec<String>,
  /// Extensions that make a missing reference eligible for the external lookup.
  pub lookup_extensions: Vec<String>,
  /// Extension appended to identifiers returned by the external lookup.
  pub content_extension: String,
  /// Materials header file, relative to the library root.
  pub materials_header: String,
  /// Suffix appended to the input file stem to form the packed output name.
  pub output_suffix: String,
}

impl Default for LibraryLayout {
  fn default() -> Self {
    Self {
      parts_prefix: "parts/".into(),
      primitives_prefix: "p/".into(),
      models_prefix: "models/".into(),
      subpart_marker: "s/".into(),
      secondary_geometry_markers: vec!["48/".into(), "8/".into()],
      lookup_extensions: vec![".dat".into()],
      content_extension: ".dat".into(),
      materials_header: "LDConfig.ldr".into(),
      output_suffix: "_packed.mpd".into(),
    }
  }
}

impl LibraryLayout {
  /// Returns true when a reference with this name may be translated by the external lookup.
  pub fn is_lookup_candidate(&self, name: &str) -> bool {
    let lower = name.to_lowercase();
    self
      .lookup_extensions
      .iter()
      .any(|ext| lower.ends_with(&ext.to_lowercase()))
  }

  /// Prefix used for the root-relative candidate of `name`.
  ///
  /// Subpart and secondary geometry names are never stored at the library root, so their
  /// first candidate is redirected into the directory that actually holds them.
  pub fn root_relative_prefix(&self, name: &str) -> &str {
    if name.starts_with(&self.subpart_marker) {
      return &self.parts_prefix;
    }
    if self
      .secondary_geometry_markers
      .iter()
      .any(|marker| name.starts_with(marker.as_str()))
    {
      return &self.primitives_prefix;
    }
    ""
  }

  /// Prefixes tried after the root-relative candidate, in priority order.
  pub fn search_prefixes(&self) -> [&str; 3] {
    [
      self.parts_prefix.as_str(),
      self.primitives_prefix.as_str(),
      self.models_prefix.as_str(),
    ]
  }
}
