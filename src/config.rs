//! Packer configuration loader describing the parts library and the external lookup.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::layout::LibraryLayout;

const DEFAULT_CONFIG_FILE: &str = "ldraw_packer.config.json";

/// Environment variable naming the LDraw library root.
pub const LIBRARY_DIR_ENV: &str = "LDRAW_DIR";

/// Environment variable holding the Rebrickable API key.
pub const API_KEY_ENV: &str = "REBRICKABLE_API_KEY";

/// Discoverable packer configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PackerConfig {
  /// Root directory of the LDraw parts library.
  pub library_dir: PathBuf,
  /// Directory (relative to the library root) holding standard parts.
  pub parts_dir: String,
  /// Directory holding shared primitives.
  pub primitives_dir: String,
  /// Directory holding library models.
  pub models_dir: String,
  /// Materials header emitted at the top of every packed document.
  pub materials_header: String,
  /// Suffix appended to the input stem to form the output file name.
  pub output_suffix: String,
  /// Base URL of the Rebrickable API.
  pub lookup_base_url: String,
  /// Rebrickable API key; the external lookup is disabled when absent.
  pub api_key: Option<String>,
}

impl Default for PackerConfig {
  fn default() -> Self {
    Self {
      library_dir: PathBuf::from("ldraw"),
      parts_dir: "parts".into(),
      primitives_dir: "p".into(),
      models_dir: "models".into(),
      materials_header: "LDConfig.ldr".into(),
      output_suffix: "_packed.mpd".into(),
      lookup_base_url: "https://rebrickable.com/api/v3".into(),
      api_key: None,
    }
  }
}

impl PackerConfig {
  /// Attempt to load configuration from the provided directory, then apply environment overrides.
  ///
  /// When the configuration file does not exist or fails to parse we fall back to default
  /// values so a bare invocation still packs against `./ldraw`.
  pub fn discover(dir: &Path) -> Self {
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    let mut config = Self::from_path(&candidate).unwrap_or_default();
    config.apply_env(|key| env::var(key).ok());
    config
  }

  /// Read configuration from a specific JSON file.
  pub fn from_path(path: &Path) -> Option<Self> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
      Ok(config) => Some(config),
      Err(err) => {
        log::warn!("ignoring malformed {}: {}", path.display(), err);
        None
      }
    }
  }

  /// Override values from the environment, read through `lookup`.
  pub fn apply_env<F>(&mut self, lookup: F)
  where
    F: Fn(&str) -> Option<String>,
  {
    if let Some(dir) = lookup(LIBRARY_DIR_ENV).filter(|value| !value.trim().is_empty()) {
      self.library_dir = PathBuf::from(dir);
    }
    if let Some(key) = lookup(API_KEY_ENV).filter(|value| !value.trim().is_empty()) {
      self.api_key = Some(key);
    }
  }

  /// Borrowing conversion into a layout, normalising directory names into prefixes.
  pub fn to_layout(&self) -> LibraryLayout {
    LibraryLayout {
      parts_prefix: dir_prefix(&self.parts_dir),
      primitives_prefix: dir_prefix(&self.primitives_dir),
      models_prefix: dir_prefix(&self.models_dir),
      materials_header: self.materials_header.clone(),
      output_suffix: self.output_suffix.clone(),
      ..LibraryLayout::default()
    }
  }
}

fn dir_prefix(dir: &str) -> String {
  let trimmed = dir.replace('\\', "/").trim_matches('/').to_string();
  if trimmed.is_empty() {
    trimmed
  } else {
    format!("{trimmed}/")
  }
}
