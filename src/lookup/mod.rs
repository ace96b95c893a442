//! External identifier translation for references missing from the local library.
//!
//! Part numbers get renamed between library releases, so a model authored against one release
//! may reference files another release no longer ships under that name. The lookup asks an
//! external catalogue for the current number before giving up on a reference.

mod normalize;
mod rebrickable;

pub use normalize::{
  degraded_identifier, header_token, qualify_identifier, strip_leading_zeros,
};
pub use rebrickable::{RebrickableLookup, first_ldraw_identifier};

use crate::config::PackerConfig;
use crate::error::{LookupError, PackResult};
use crate::layout::LibraryLayout;

/// Service translating a local part identifier into an equivalent one.
pub trait IdentifierLookup {
  /// Return an alternate identifier for `query`, or `None` when the service knows no match.
  fn find_alternate(&self, query: &str) -> Result<Option<String>, LookupError>;
}

/// Lookup used when no API key is configured; it never matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledLookup;

impl IdentifierLookup for DisabledLookup {
  fn find_alternate(&self, _query: &str) -> Result<Option<String>, LookupError> {
    Ok(None)
  }
}

/// Build the lookup described by the configuration.
pub fn lookup_from_config(config: &PackerConfig) -> PackResult<Box<dyn IdentifierLookup>> {
  match config.api_key.as_deref() {
    Some(key) => Ok(Box::new(RebrickableLookup::new(&config.lookup_base_url, key)?)),
    None => {
      log::info!("no API key configured, external part lookup disabled");
      Ok(Box::new(DisabledLookup))
    }
  }
}

/// Outcome of translating a missing reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
  /// The service returned an equivalent identifier, qualified like the original reference.
  Alternate(String),
  /// Both attempts missed; the best-effort base part identifier.
  Degraded(String),
}

/// Translate a missing reference through `lookup`.
///
/// The header token is tried first, then its zero-stripped variant when that differs. Attempts
/// run strictly one after another and a failed request counts as a miss.
pub fn translate(lookup: &dyn IdentifierLookup, name: &str, layout: &LibraryLayout) -> Translation {
  let token = header_token(name);
  let mut queries = vec![token.clone()];
  if let Some(stripped) = strip_leading_zeros(&token) {
    queries.push(stripped);
  }

  for query in &queries {
    match lookup.find_alternate(query) {
      Ok(Some(identifier)) => {
        log::info!("lookup translated {name} via `{query}` to {identifier}");
        return Translation::Alternate(qualify_identifier(
          name,
          &identifier,
          &layout.content_extension,
        ));
      }
      Ok(None) => log::debug!("lookup found no match for `{query}`"),
      Err(err) => log::error!("lookup for `{query}` failed: {err}"),
    }
  }

  Translation::Degraded(degraded_identifier(name, &layout.content_extension))
}
