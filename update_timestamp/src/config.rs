//! Inputs and secrets for a single run.
//!
//! Named inputs come from the command line (or the `INPUT_*` variables the CI
//! host exports for them); secrets come from the environment and are never
//! printed. Empty values count as missing.

use reqwest::Url;

use crate::error::{ActionError, Result};

/// Only repositories owned by this account may run the action.
pub const EXPECTED_OWNER: &str = "pawcoding";

pub const TOKEN_VAR: &str = "PB_TOKEN";
pub const EMAIL_VAR: &str = "PB_EMAIL";
pub const PASSWORD_VAR: &str = "PB_PASSWORD";

/// Validated target of the update. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inputs {
    pub base_url: Url,
    pub collection_id: String,
    pub record_id: String,
}

/// How the run authenticates.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// A token issued elsewhere; login is skipped.
    Token(String),
    EmailPassword { identity: String, password: String },
}

// Keep secrets out of debug output.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Token(_) => f.write_str("Token(<redacted>)"),
            Credentials::EmailPassword { .. } => f.write_str("EmailPassword(<redacted>)"),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Fails unless the invoking context belongs to `expected`.
pub fn validate_context(owner: Option<&str>, expected: &str) -> Result<()> {
    let owner = owner.unwrap_or_default();
    if owner != expected {
        return Err(ActionError::configuration(format!(
            "This action can only be used in repositories owned by \"{}\". Current owner: {}.",
            expected, owner
        )));
    }
    Ok(())
}

/// Checks the three required inputs in order and stops at the first missing one.
pub fn validate_inputs(
    base_url: Option<&str>,
    collection_id: Option<&str>,
    record_id: Option<&str>,
) -> Result<Inputs> {
    let base_url = non_empty(base_url)
        .ok_or_else(|| ActionError::configuration("\"pocketbase-url\" is required."))?;
    let collection_id = non_empty(collection_id)
        .ok_or_else(|| ActionError::configuration("\"collection-id\" is required."))?;
    let record_id = non_empty(record_id)
        .ok_or_else(|| ActionError::configuration("\"record-id\" is required."))?;

    Ok(Inputs {
        base_url: parse_base_url(base_url)?,
        collection_id: collection_id.to_string(),
        record_id: record_id.to_string(),
    })
}

/// Parses the base URL and makes sure it ends in `/`, so that relative API
/// paths are appended to it rather than replacing its last segment.
fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw).map_err(|e| {
        ActionError::configuration(format!("\"pocketbase-url\" is not a valid URL: {}", e))
    })?;
    if url.cannot_be_a_base() {
        return Err(ActionError::configuration(format!(
            "\"pocketbase-url\" is not a valid base URL: {}",
            raw
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Picks the credentials to use. A supplied token wins; otherwise both email
/// and password are required.
pub fn resolve_credentials<F>(lookup: F) -> Result<Credentials>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

    if let Some(token) = get(TOKEN_VAR) {
        return Ok(Credentials::Token(token));
    }

    let identity = get(EMAIL_VAR).ok_or_else(|| {
        ActionError::configuration(format!(
            "Pocketbase email is not set in environment variable \"{}\".",
            EMAIL_VAR
        ))
    })?;
    let password = get(PASSWORD_VAR).ok_or_else(|| {
        ActionError::configuration(format!(
            "Pocketbase password is not set in environment variable \"{}\".",
            PASSWORD_VAR
        ))
    })?;

    Ok(Credentials::EmailPassword { identity, password })
}
