//! Tag normalization and version ordering
//!
//! Tags on the hosting side come in mixed shapes (`v1.2.3`, `1.2.3`, the
//! occasional free-form label). Everything here works on normalized tags
//! with a leading `v`, compares semantic versions by semver precedence,
//! and falls back to plain lexicographic ordering for anything that does
//! not parse.

use semver::Version;
use std::cmp::Ordering;

/// Ensures a tag carries a leading `v`
pub fn normalize(version: &str) -> String {
    if version.starts_with('v') {
        version.to_string()
    } else {
        format!("v{version}")
    }
}

/// Parses a tag as a semantic version, tolerating a leading `v`
fn parse_semver(tag: &str) -> Option<Version> {
    Version::parse(tag.strip_prefix('v').unwrap_or(tag)).ok()
}

/// Returns true if the tag is a semantic version, with or without a leading `v`
///
/// Bare words (`latest`), build labels (`dev-build-123`) and truncated
/// versions (`1.2`) are all rejected.
pub fn is_semver_shaped(tag: &str) -> bool {
    parse_semver(tag).is_some()
}

/// Orders two tags
///
/// When both sides parse as semantic versions after normalization, semver
/// precedence decides. Otherwise the normalized strings are compared
/// lexicographically, which notably orders `v9` above `v10`.
pub fn compare(a: &str, b: &str) -> Ordering {
    let norm_a = normalize(a);
    let norm_b = normalize(b);
    match (parse_semver(&norm_a), parse_semver(&norm_b)) {
        (Some(va), Some(vb)) => va.cmp(&vb),
        _ => norm_a.cmp(&norm_b),
    }
}

/// Returns true if `candidate` orders strictly above `current`
pub fn is_newer(current: &str, candidate: &str) -> bool {
    compare(candidate, current) == Ordering::Greater
}
