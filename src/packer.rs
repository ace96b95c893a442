//! Packing orchestrator: resolves a model and writes the self-contained document.

use std::fs;
use std::path::{Path, PathBuf};

use same_file::is_same_file;

use crate::error::{PackError, PackResult};
use crate::layout::LibraryLayout;
use crate::line::normalize_line_endings;
use crate::lookup::IdentifierLookup;
use crate::resolver::{ResolveContext, ResolvedDocument, Resolver};
use crate::source::FsSource;

/// Summary of a finished packing run.
#[derive(Debug, Clone)]
pub struct PackReport {
  /// Path the packed document was written to.
  pub output_path: PathBuf,
  /// Resolved paths of every embedded document, in completion order.
  pub embedded: Vec<String>,
  /// References that could not be resolved and were left unembedded or degraded.
  pub unsupported: Vec<String>,
}

/// High-level helper packing a model against a parts library.
pub struct Packer<'a> {
  layout: &'a LibraryLayout,
  library_dir: &'a Path,
  lookup: &'a dyn IdentifierLookup,
}

impl<'a> Packer<'a> {
  /// Create a packer for the library rooted at `library_dir`.
  pub fn new(
    layout: &'a LibraryLayout,
    library_dir: &'a Path,
    lookup: &'a dyn IdentifierLookup,
  ) -> Self {
    Self {
      layout,
      library_dir,
      lookup,
    }
  }

  /// Default output location: a sibling of the model with the configured suffix.
  pub fn output_path(&self, model: &Path) -> PathBuf {
    let stem = model
      .file_stem()
      .map(|stem| stem.to_string_lossy().into_owned())
      .unwrap_or_default();
    model.with_file_name(format!("{stem}{}", self.layout.output_suffix))
  }

  /// Resolve `model`, assemble the packed document and write it.
  ///
  /// Only a missing root model or an I/O failure while writing aborts the run; unresolved
  /// references are reported in [`PackReport::unsupported`].
  pub fn pack(&self, model: &Path, output: Option<&Path>) -> PackResult<PackReport> {
    let model_dir = match model.parent() {
      Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
      _ => PathBuf::from("."),
    };
    let root_name = model
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .ok_or_else(|| PackError::RootNotFound(model.display().to_string()))?;

    let source = FsSource::new([model_dir, self.library_dir.to_path_buf()]);
    let resolver = Resolver::new(self.layout, &source, self.lookup);
    let mut ctx = ResolveContext::new();
    resolver.resolve_root(&root_name, &mut ctx)?;

    let (documents, unsupported) = ctx.into_parts();
    let header = self.read_materials_header();
    let packed = assemble(header.as_deref(), &documents);

    let output_path = output.map_or_else(|| self.output_path(model), Path::to_path_buf);
    ensure_not_input(model, &output_path)?;
    fs::write(&output_path, packed).map_err(|source| PackError::Io {
      path: output_path.clone(),
      source,
    })?;
    log::info!(
      "wrote {} with {} embedded documents",
      output_path.display(),
      documents.len()
    );

    if !unsupported.is_empty() {
      log::warn!(
        "{} unsupported references, the packed model may be incomplete: {}",
        unsupported.len(),
        unsupported.join(", ")
      );
    }

    Ok(PackReport {
      output_path,
      embedded: documents.into_iter().map(|document| document.path).collect(),
      unsupported,
    })
  }

  fn read_materials_header(&self) -> Option<String> {
    let path = self.library_dir.join(&self.layout.materials_header);
    match fs::read(&path) {
      Ok(bytes) => Some(normalize_line_endings(&String::from_utf8_lossy(&bytes))),
      Err(err) => {
        log::warn!("materials header {} unavailable: {}", path.display(), err);
        None
      }
    }
  }
}

/// Concatenate the materials header and the documents, most recently completed first.
///
/// Documents complete after everything they reference, so the root model comes right after the
/// header and every dependency follows the documents using it.
pub fn assemble(header: Option<&str>, documents: &[ResolvedDocument]) -> String {
  let mut packed = String::new();
  if let Some(header) = header {
    packed.push_str(header);
    if !header.is_empty() && !header.ends_with('\n') {
      packed.push('\n');
    }
  }
  for document in documents.iter().rev() {
    packed.push_str(&document.body);
  }
  packed
}

fn ensure_not_input(model: &Path, output: &Path) -> PackResult<()> {
  if !output.exists() {
    return Ok(());
  }
  let same = is_same_file(model, output).map_err(|source| PackError::Io {
    path: output.to_path_buf(),
    source,
  })?;
  if same {
    return Err(PackError::OutputIsInput(output.to_path_buf()));
  }
  Ok(())
}
