//! Recursive resolution of LDraw references into embeddable documents.
//!
//! Resolution is depth-first and strictly sequential: every reference of a document is fully
//! resolved, including any network lookup, before the next line is looked at. The order in
//! which documents complete is therefore deterministic for a given library and model.

mod context;
mod rewrite;

pub use context::{ResolveContext, ResolvedDocument};

use crate::error::{PackError, PackResult};
use crate::layout::LibraryLayout;
use crate::lookup::{IdentifierLookup, Translation, translate};
use crate::search::{generate_candidates, normalize_slashes};
use crate::source::DocumentSource;

/// Result of searching the candidate table for a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
  /// A candidate's resolved path was already claimed; nothing was read.
  Cached(String),
  /// A candidate was read.
  Read {
    /// Raw document content.
    document: String,
    /// Library prefix of the winning candidate.
    prefix: String,
    /// Resolved path of the winning candidate.
    path: String,
  },
}

/// Resolver over a document source and an external identifier lookup.
pub struct Resolver<'a> {
  layout: &'a LibraryLayout,
  source: &'a dyn DocumentSource,
  lookup: &'a dyn IdentifierLookup,
}

impl<'a> Resolver<'a> {
  /// Create a resolver.
  pub fn new(
    layout: &'a LibraryLayout,
    source: &'a dyn DocumentSource,
    lookup: &'a dyn IdentifierLookup,
  ) -> Self {
    Self {
      layout,
      source,
      lookup,
    }
  }

  /// Resolve the root model and everything it references.
  ///
  /// The root is never translated through the external lookup; failing to find it aborts the
  /// run.
  pub fn resolve_root(&self, name: &str, ctx: &mut ResolveContext) -> PackResult<String> {
    let normalized = normalize_slashes(name.trim());
    match self.locate(&normalized, ctx) {
      Some(Located::Read { document, prefix, path }) => {
        log::debug!("root {normalized} found under `{prefix}`");
        Ok(self.embed(&document, path, true, ctx))
      }
      Some(Located::Cached(path)) => Ok(path),
      None => Err(PackError::RootNotFound(normalized)),
    }
  }

  /// Resolve a reference made by some document, returning the path to write into its line.
  ///
  /// Never fails: references that cannot be found degrade to a best-effort path and are
  /// recorded as unsupported.
  pub fn resolve_reference(&self, name: &str, ctx: &mut ResolveContext) -> String {
    let normalized = normalize_slashes(name.trim());
    if let Some(path) = ctx.name_lookup(&normalized) {
      return path.to_string();
    }

    let path = self.resolve_uncached(&normalized, ctx);
    ctx.remember_name(normalized, path.clone());
    path
  }

  /// Walk the candidate table for `name`, stopping at the first cached or readable candidate.
  pub fn locate(&self, name: &str, ctx: &ResolveContext) -> Option<Located> {
    for candidate in generate_candidates(self.layout, name) {
      if ctx.contains_path(&candidate.path) {
        return Some(Located::Cached(candidate.path));
      }
      match self.source.read(&candidate.path) {
        Ok(document) => {
          return Some(Located::Read {
            document,
            prefix: candidate.prefix,
            path: candidate.path,
          });
        }
        Err(err) => log::trace!("{} unreadable: {}", candidate.path, err),
      }
    }
    None
  }

  fn resolve_uncached(&self, name: &str, ctx: &mut ResolveContext) -> String {
    match self.locate(name, ctx) {
      Some(Located::Cached(path)) => path,
      Some(Located::Read { document, path, .. }) => self.embed(&document, path, false, ctx),
      None if self.layout.is_lookup_candidate(name) => {
        match translate(self.lookup, name, self.layout) {
          Translation::Alternate(alternate) => self.resolve_translated(name, &alternate, ctx),
          Translation::Degraded(fallback) => {
            log::warn!("{name} is not in the library, falling back to {fallback}");
            ctx.record_unsupported(name);
            self.resolve_translated(name, &fallback, ctx)
          }
        }
      }
      None => {
        log::warn!("{name} could not be found");
        ctx.record_unsupported(name);
        self.best_effort_path(name)
      }
    }
  }

  /// Resolve the identifier `original` was translated or degraded to.
  fn resolve_translated(&self, original: &str, name: &str, ctx: &mut ResolveContext) -> String {
    if let Some(path) = ctx.name_lookup(name) {
      return path.to_string();
    }
    match self.locate(name, ctx) {
      Some(Located::Cached(path)) => path,
      Some(Located::Read { document, path, .. }) => self.embed(&document, path, false, ctx),
      None => {
        log::warn!("{name} could not be found either, leaving {original} unembedded");
        ctx.record_unsupported(original);
        self.best_effort_path(name)
      }
    }
  }

  fn embed(&self, document: &str, path: String, is_root: bool, ctx: &mut ResolveContext) -> String {
    ctx.claim_path(&path);
    let body = self.rewrite(document, &path, is_root, ctx);
    log::info!("embedded {path}");
    ctx.push_document(ResolvedDocument {
      path: path.clone(),
      body,
    });
    path
  }

  /// Path written into a line whose reference could not be located.
  fn best_effort_path(&self, name: &str) -> String {
    let prefix = self.layout.root_relative_prefix(name);
    if !prefix.is_empty() {
      format!("{prefix}{name}")
    } else if self.layout.is_lookup_candidate(name) {
      format!("{}{name}", self.layout.parts_prefix)
    } else {
      name.to_string()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::lookup::DisabledLookup;
  use crate::lookup::stub::StubLookup;
  use crate::source::memory::MemorySource;

  const REF: &str = "1 16 0 0 0 1 0 0 0 1 0 0 0 1 ";

  fn reference(name: &str) -> String {
    format!("{REF}{name}\n")
  }

  fn body_of<'c>(ctx: &'c ResolveContext, path: &str) -> &'c str {
    ctx
      .documents()
      .iter()
      .find(|document| document.path == path)
      .map(|document| document.body.as_str())
      .unwrap()
  }

  #[test]
  fn shared_dependencies_are_read_and_embedded_once() {
    let source = MemorySource::default()
      .with(
        "model.ldr",
        &format!("{}{}", reference("left.ldr"), reference("right.ldr")),
      )
      .with("models/left.ldr", &reference("3001.dat"))
      .with("models/right.ldr", &reference("parts\\3001.dat"))
      .with("parts/3001.dat", "0 Brick 2 x 4\n");
    let layout = LibraryLayout::default();
    let resolver = Resolver::new(&layout, &source, &DisabledLookup);
    let mut ctx = ResolveContext::new();

    resolver.resolve_root("model.ldr", &mut ctx).unwrap();

    assert_eq!(source.reads("parts/3001.dat"), 1);
    assert_eq!(body_of(&ctx, "models/left.ldr"), format!(
      "0 FILE models/left.ldr\n{}",
      reference("parts/3001.dat")
    ));
    assert_eq!(body_of(&ctx, "models/right.ldr"), format!(
      "0 FILE models/right.ldr\n{}",
      reference("parts/3001.dat")
    ));
    let paths: Vec<&str> = ctx.documents().iter().map(|doc| doc.path.as_str()).collect();
    assert_eq!(paths, vec![
      "parts/3001.dat",
      "models/left.ldr",
      "models/right.ldr",
      "model.ldr"
    ]);
  }

  #[test]
  fn standard_parts_win_over_models() {
    let source = MemorySource::default()
      .with("model.ldr", &reference("wheel.dat"))
      .with("parts/wheel.dat", "0 part\n")
      .with("models/wheel.dat", "0 model\n");
    let layout = LibraryLayout::default();
    let resolver = Resolver::new(&layout, &source, &DisabledLookup);
    let mut ctx = ResolveContext::new();

    resolver.resolve_root("model.ldr", &mut ctx).unwrap();

    assert_eq!(body_of(&ctx, "model.ldr"), reference("parts/wheel.dat"));
    assert_eq!(source.reads("models/wheel.dat"), 0);
  }

  #[test]
  fn falls_back_to_lower_case_names() {
    let source = MemorySource::default()
      .with("model.ldr", &reference("Foo.dat"))
      .with("parts/foo.dat", "0 foo\n");
    let layout = LibraryLayout::default();
    let resolver = Resolver::new(&layout, &source, &DisabledLookup);
    let mut ctx = ResolveContext::new();

    resolver.resolve_root("model.ldr", &mut ctx).unwrap();

    assert_eq!(body_of(&ctx, "model.ldr"), reference("parts/foo.dat"));
    assert_eq!(body_of(&ctx, "parts/foo.dat"), "0 FILE parts/foo.dat\n0 foo\n");
    assert!(ctx.unsupported().is_empty());
  }

  #[test]
  fn short_reference_lines_pass_through() {
    let short = "1 16 0 0 0 1 0 0 0 1 0 0 0 1";
    let exact = "1 16 10 -8 20 1 0 0 0 1 0 0 0 1 s\\3001s01.dat";
    let source = MemorySource::default()
      .with("model.ldr", &format!("{short}\n{exact}\n"))
      .with("parts/s/3001s01.dat", "0 subpart\n");
    let layout = LibraryLayout::default();
    let resolver = Resolver::new(&layout, &source, &DisabledLookup);
    let mut ctx = ResolveContext::new();

    resolver.resolve_root("model.ldr", &mut ctx).unwrap();

    assert_eq!(
      body_of(&ctx, "model.ldr"),
      format!("{short}\n1 16 10 -8 20 1 0 0 0 1 0 0 0 1 parts/s/3001s01.dat\n")
    );
  }

  #[test]
  fn untranslatable_parts_degrade_to_base_part() {
    let source = MemorySource::default()
      .with(
        "model.ldr",
        &format!(
          "{}{}{}",
          reference("3001pr0001.dat"),
          reference("3001pr0001.dat"),
          reference("sub.ldr")
        ),
      )
      .with("sub.ldr", &reference("3001pr0001.dat"))
      .with("parts/3001.dat", "0 Brick 2 x 4\n");
    let layout = LibraryLayout::default();
    let lookup = StubLookup::default();
    let resolver = Resolver::new(&layout, &source, &lookup);
    let mut ctx = ResolveContext::new();

    resolver.resolve_root("model.ldr", &mut ctx).unwrap();

    assert_eq!(
      body_of(&ctx, "model.ldr"),
      format!("{}{}", reference("parts/3001.dat").repeat(2), reference("sub.ldr"))
    );
    assert_eq!(
      body_of(&ctx, "sub.ldr"),
      format!("0 FILE sub.ldr\n{}", reference("parts/3001.dat"))
    );
    assert_eq!(ctx.unsupported(), ["3001pr0001.dat"]);
    assert_eq!(lookup.queries(), vec!["3001pr0001"]);
    assert_eq!(source.reads("parts/3001.dat"), 1);
  }

  #[test]
  fn unresolvable_alternates_are_reported() {
    let source = MemorySource::default().with("model.ldr", &reference("3001old.dat"));
    let layout = LibraryLayout::default();
    let lookup = StubLookup::default().answering("3001old", "3001new");
    let resolver = Resolver::new(&layout, &source, &lookup);
    let mut ctx = ResolveContext::new();

    resolver.resolve_root("model.ldr", &mut ctx).unwrap();

    assert_eq!(body_of(&ctx, "model.ldr"), reference("parts/3001new.dat"));
    assert_eq!(ctx.unsupported(), ["3001old.dat"]);
    assert_eq!(ctx.documents().len(), 1);
  }

  #[test]
  fn translated_identifiers_are_resolved() {
    let source = MemorySource::default()
      .with("model.ldr", &reference("3001old.dat"))
      .with("parts/3001.dat", "0 Brick 2 x 4\n");
    let layout = LibraryLayout::default();
    let lookup = StubLookup::default().answering("3001old", "3001");
    let resolver = Resolver::new(&layout, &source, &lookup);
    let mut ctx = ResolveContext::new();

    resolver.resolve_root("model.ldr", &mut ctx).unwrap();

    assert_eq!(body_of(&ctx, "model.ldr"), reference("parts/3001.dat"));
    assert!(ctx.unsupported().is_empty());
  }

  #[test]
  fn missing_parts_keep_a_best_effort_path() {
    let source = MemorySource::default().with(
      "model.ldr",
      &format!("{}{}", reference("ghost.dat"), reference("sub.ldr")),
    );
    let layout = LibraryLayout::default();
    let resolver = Resolver::new(&layout, &source, &DisabledLookup);
    let mut ctx = ResolveContext::new();

    resolver.resolve_root("model.ldr", &mut ctx).unwrap();

    assert_eq!(
      body_of(&ctx, "model.ldr"),
      format!("{}{}", reference("parts/ghost.dat"), reference("sub.ldr"))
    );
    assert_eq!(ctx.unsupported(), ["ghost.dat", "sub.ldr"]);
    assert_eq!(ctx.documents().len(), 1);
  }

  #[test]
  fn root_is_never_translated() {
    let source = MemorySource::default();
    let layout = LibraryLayout::default();
    let lookup = StubLookup::default().answering("3001", "3001");
    let resolver = Resolver::new(&layout, &source, &lookup);
    let mut ctx = ResolveContext::new();

    let err = resolver.resolve_root("3001.dat", &mut ctx).unwrap_err();
    assert!(matches!(err, PackError::RootNotFound(name) if name == "3001.dat"));
    assert!(lookup.queries().is_empty());
  }

  #[test]
  fn boundaries_are_synthesized_for_non_root_documents_only() {
    let source = MemorySource::default()
      .with(
        "model.ldr",
        &format!("0 FILE model.ldr\r\n0 Name: model.ldr\r\n{}", reference("sub.ldr")),
      )
      .with("sub.ldr", "0 FILE stale-name.ldr\n0 sub\n");
    let layout = LibraryLayout::default();
    let resolver = Resolver::new(&layout, &source, &DisabledLookup);
    let mut ctx = ResolveContext::new();

    resolver.resolve_root("model.ldr", &mut ctx).unwrap();

    assert_eq!(
      body_of(&ctx, "model.ldr"),
      format!("0 Name: model.ldr\n{}", reference("sub.ldr"))
    );
    assert_eq!(body_of(&ctx, "sub.ldr"), "0 FILE sub.ldr\n0 sub\n");
  }

  #[test]
  fn embedded_sections_are_not_resolved() {
    let document = format!(
      "0 FILE main.ldr\n{}0 NOFILE\n0 FILE Wing.ldr\n{}",
      reference("wing.ldr"),
      reference("3001.dat")
    );
    let source = MemorySource::default()
      .with("main.mpd", &document)
      .with("parts/3001.dat", "0 brick\n");
    let layout = LibraryLayout::default();
    let resolver = Resolver::new(&layout, &source, &DisabledLookup);
    let mut ctx = ResolveContext::new();

    resolver.resolve_root("main.mpd", &mut ctx).unwrap();

    assert_eq!(
      body_of(&ctx, "main.mpd"),
      format!(
        "{}0 NOFILE\n0 FILE Wing.ldr\n{}",
        reference("wing.ldr"),
        reference("parts/3001.dat")
      )
    );
    assert!(ctx.unsupported().is_empty());
  }

  #[test]
  fn sections_already_embedded_are_dropped() {
    let sub = format!(
      "0 FILE sub.mpd\n{}0 FILE a.ldr\n0 embedded copy\n{}0 NOFILE\n0 trailing\n",
      reference("a.ldr"),
      reference("3001.dat")
    );
    let source = MemorySource::default()
      .with(
        "model.ldr",
        &format!("{}{}", reference("a.ldr"), reference("sub.mpd")),
      )
      .with("a.ldr", "0 original\n")
      .with("sub.mpd", &sub)
      .with("parts/3001.dat", "0 brick\n");
    let layout = LibraryLayout::default();
    let resolver = Resolver::new(&layout, &source, &DisabledLookup);
    let mut ctx = ResolveContext::new();

    resolver.resolve_root("model.ldr", &mut ctx).unwrap();

    assert_eq!(
      body_of(&ctx, "sub.mpd"),
      format!("0 FILE sub.mpd\n{}0 trailing\n", reference("a.ldr"))
    );
    let boundaries = ctx
      .documents()
      .iter()
      .flat_map(|document| document.body.lines())
      .filter(|line| *line == "0 FILE a.ldr")
      .count();
    assert_eq!(boundaries, 1);
    assert_eq!(source.reads("parts/3001.dat"), 0);
  }

  #[test]
  fn reference_indentation_is_preserved() {
    let source = MemorySource::default()
      .with("model.ldr", &format!("  {}", reference("3001.dat")))
      .with("parts/3001.dat", "0 brick\n");
    let layout = LibraryLayout::default();
    let resolver = Resolver::new(&layout, &source, &DisabledLookup);
    let mut ctx = ResolveContext::new();

    resolver.resolve_root("model.ldr", &mut ctx).unwrap();

    assert_eq!(
      body_of(&ctx, "model.ldr"),
      format!("  {}", reference("parts/3001.dat"))
    );
  }

  #[test]
  fn reference_cycles_terminate() {
    let source = MemorySource::default()
      .with("model.ldr", &reference("a.ldr"))
      .with("a.ldr", &reference("b.ldr"))
      .with("b.ldr", &reference("a.ldr"));
    let layout = LibraryLayout::default();
    let resolver = Resolver::new(&layout, &source, &DisabledLookup);
    let mut ctx = ResolveContext::new();

    resolver.resolve_root("model.ldr", &mut ctx).unwrap();

    assert_eq!(source.reads("a.ldr"), 1);
    assert_eq!(body_of(&ctx, "b.ldr"), format!("0 FILE b.ldr\n{}", reference("a.ldr")));
    assert_eq!(ctx.documents().len(), 3);
  }
}
