use std::collections::BTreeSet;

use crate::line::{FILE_BOUNDARY_TOKEN, Line, NOFILE_TOKEN, classify, normalize_line_endings};
use crate::resolver::{ResolveContext, Resolver};
use crate::search::normalize_slashes;

impl Resolver<'_> {
  /// Rewrite `document`, resolving every reference it makes.
  ///
  /// Non-root bodies open with a boundary line naming `path`; the root body never does.
  /// Sections whose name is already embedded are dropped up to the next boundary or
  /// `0 NOFILE`, so every name appears once in the packed output.
  pub(crate) fn rewrite(
    &self,
    document: &str,
    path: &str,
    is_root: bool,
    ctx: &mut ResolveContext,
  ) -> String {
    let text = normalize_line_endings(document);

    // Sections must be known before the lines that reference them are reached.
    let mut duplicates = BTreeSet::new();
    for (index, raw) in text.lines().enumerate() {
      if let Line::FileBoundary(name) = classify(raw, index == 0) {
        if ctx.contains_path(&name) || ctx.is_section(&name) {
          log::debug!("{path}: section {name} is already embedded, dropping it");
          duplicates.insert(index);
        } else {
          ctx.record_section(&name);
        }
      }
    }

    let mut body = String::with_capacity(text.len() + path.len() + 8);
    if !is_root {
      push_line(&mut body, &format!("{FILE_BOUNDARY_TOKEN} {path}"));
    }

    let mut skipping = false;
    for (index, raw) in text.lines().enumerate() {
      let line = classify(raw, index == 0);
      if let Line::FileBoundary(_) = line {
        skipping = duplicates.contains(&index);
        if skipping {
          continue;
        }
      } else if skipping {
        if is_nofile(raw) {
          skipping = false;
        }
        continue;
      }

      match line {
        Line::Suppressed => {}
        Line::FileBoundary(name) => push_line(&mut body, &format!("{FILE_BOUNDARY_TOKEN} {name}")),
        Line::SubpartRef { prefix, name } => {
          if ctx.is_section(&normalize_slashes(name)) {
            push_line(&mut body, raw);
            continue;
          }
          let resolved = self.resolve_reference(name, ctx);
          body.push_str(prefix);
          push_line(&mut body, &resolved);
        }
        Line::Plain(line) => push_line(&mut body, line),
      }
    }

    body
  }
}

fn is_nofile(raw: &str) -> bool {
  raw.trim() == NOFILE_TOKEN
}

fn push_line(body: &mut String, line: &str) {
  body.push_str(line);
  body.push('\n');
}
