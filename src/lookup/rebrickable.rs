//! Rebrickable API client translating LDraw part numbers.

use serde_json::Value;

use crate::error::LookupError;
use crate::lookup::IdentifierLookup;

const USER_AGENT: &str = concat!("ldraw_packer/", env!("CARGO_PKG_VERSION"));

/// Blocking Rebrickable client.
///
/// Queries `lego/parts/?ldraw_id=<token>` and reports the first LDraw identifier listed for the
/// first matching part, which is usually the number the current library files the part under.
pub struct RebrickableLookup {
  client: reqwest::blocking::Client,
  base_url: String,
  api_key: String,
}

impl RebrickableLookup {
  /// Create a client for the API rooted at `base_url`.
  pub fn new(base_url: &str, api_key: &str) -> Result<Self, LookupError> {
    let client = reqwest::blocking::Client::builder()
      .user_agent(USER_AGENT)
      .build()?;

    Ok(Self {
      client,
      base_url: base_url.trim_end_matches('/').to_string(),
      api_key: api_key.to_string(),
    })
  }
}

impl IdentifierLookup for RebrickableLookup {
  fn find_alternate(&self, query: &str) -> Result<Option<String>, LookupError> {
    let url = format!("{}/lego/parts/", self.base_url);
    log::debug!("querying {url} for ldraw_id={query}");

    let response = self
      .client
      .get(&url)
      .query(&[("ldraw_id", query)])
      .header("Authorization", format!("key {}", self.api_key))
      .send()?;

    let status = response.status();
    if !status.is_success() {
      return Err(LookupError::Status(status.as_u16()));
    }

    let body: Value = serde_json::from_str(&response.text()?)?;
    Ok(first_ldraw_identifier(&body))
  }
}

/// Pull `results[0].external_ids.LDraw[0]` out of a parts listing.
///
/// Any missing field or empty list means "no match".
pub fn first_ldraw_identifier(body: &Value) -> Option<String> {
  let identifier = body
    .get("results")?
    .as_array()?
    .first()?
    .get("external_ids")?
    .get("LDraw")?
    .as_array()?
    .first()?;

  let identifier = match identifier {
    Value::String(value) => value.trim().to_string(),
    Value::Number(value) => value.to_string(),
    _ => return None,
  };
  (!identifier.is_empty()).then_some(identifier)
}
