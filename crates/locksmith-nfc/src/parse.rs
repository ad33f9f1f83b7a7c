//! Helpers for pulling structure out of the NFC tools' console output.

use regex::Regex;
use std::sync::OnceLock;

/// The `nfc-list` report prints the UID as four 2-hex-character byte
/// tokens separated by exactly two spaces, e.g.
/// `UID (NFCID1): 33  c7  76  6c`. The pattern is deliberately loose
/// about everything around those columns; only the fixed-column byte
/// group is load-bearing.
fn uid_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"([0-9a-fA-F]{2}  [0-9a-fA-F]{2}  [0-9a-fA-F]{2}  [0-9a-fA-F]{2})")
            .expect("static pattern")
    })
}

/// Extract a 4-byte UID from a tag-listing report, with the column
/// spacing stripped. Returns `None` when no tag block is present.
pub(crate) fn extract_uid(output: &str) -> Option<String> {
    uid_pattern()
        .find(output)
        .map(|m| m.as_str().replace(' ', ""))
}
