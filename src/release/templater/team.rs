//! Team identifier resolution.

use regex::Regex;

use crate::release::error::{Error, Result};

const TEAM_ID_IN_IDENTITY: &str = r"\(([A-Za-z0-9]{10})\)";

/// Returns `explicit` when given, otherwise the parenthesized ten character
/// token inside `identity`.
///
/// `Developer ID Application: Example (ABCDEFGH12)` yields `ABCDEFGH12`.
pub fn resolve_team_id(identity: &str, explicit: Option<&str>) -> Result<String> {
    if let Some(team_id) = explicit.map(str::trim).filter(|t| !t.is_empty()) {
        return Ok(team_id.to_string());
    }

    let pattern = Regex::new(TEAM_ID_IN_IDENTITY)?;

    pattern
        .captures_iter(identity)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            Error::config(format!(
                "cannot determine team id from signing identity {identity:?}; supply a team id explicitly"
            ))
        })
}
