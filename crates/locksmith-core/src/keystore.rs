//! Candidate-key handling: constructor validation, tool-flag formatting,
//! and the lenient key-file scan.

use crate::error::{LocksmithError, LocksmithResult};
use hex::FromHex;
use log::{debug, warn};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Keys harvested from a file are full Mifare keys: 12 hex characters,
/// matched anywhere in the content, not anchored to lines or delimiters.
fn file_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[0-9a-fA-F]{12}").expect("static pattern"))
}

/// Check every constructor-supplied key against the 8-hex-character
/// shorthand form, failing on the first offender so the caller never
/// ends up holding a partially validated set.
pub fn validate(raw_keys: &[String]) -> LocksmithResult<Vec<String>> {
    let mut keys = Vec::with_capacity(raw_keys.len());
    for key in raw_keys {
        if key.len() != 8 {
            return Err(invalid_key(key, "must be exactly 8 hex characters"));
        }
        <[u8; 4]>::from_hex(key)
            .map_err(|err| invalid_key(key, format!("not valid hex: {err}")))?;
        keys.push(key.clone());
    }
    Ok(keys)
}

/// Turn each key into the flag token the dump tool consumes.
pub fn format(keys: &[String]) -> Vec<String> {
    keys.iter().map(|key| format!("-k {key}")).collect()
}

/// Scan a key file for full Mifare keys and return them as formatted
/// flags, in file order.
///
/// A missing or unreadable file is a normal situation (most operators
/// never create one), so read failures degrade to an empty list with a
/// warning instead of propagating.
pub async fn load_from_file(path: &Path) -> Vec<String> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(err) => {
            warn!(
                "key file {} not loaded ({err}); continuing with no default keys",
                path.display()
            );
            return Vec::new();
        }
    };

    let keys: Vec<String> = file_key_pattern()
        .find_iter(&contents)
        .map(|m| format!("-k {}", m.as_str()))
        .collect();
    debug!("loaded {} default keys from {}", keys.len(), path.display());
    keys
}

fn invalid_key(key: &str, reason: impl Into<String>) -> LocksmithError {
    LocksmithError::InvalidKey {
        key: key.to_string(),
        reason: reason.into(),
    }
}
