//! Image reference extraction from build files

use crate::domain::Dependency;
use crate::version;
use regex::Regex;
use std::sync::LazyLock;

// Top-level assignments like `app_image = "my-app:v1.2.3"`. The name part
// is greedy, so registry hosts with ports split on the last colon.
static IMAGE_ASSIGN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^([A-Za-z_][A-Za-z0-9_]*_image)\s*=\s*"([^"]+):([^"]+)""#).unwrap()
});

/// Extracts tagged image references from a `.bzl` file
///
/// Only assignments whose key ends in `_image` count, and only tags that
/// look like semantic versions are kept. Floating tags (`latest`,
/// `dev-build-123`) never produce a dependency.
pub fn scan_images(content: &str, file_path: &str) -> Vec<Dependency> {
    IMAGE_ASSIGN_RE
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let tag = caps.get(3)?.as_str();
            if !version::is_semver_shaped(tag) {
                return None;
            }
            Some(Dependency::image(
                caps.get(1)?.as_str(),
                caps.get(2)?.as_str(),
                tag,
                file_path,
                super::line_of(content, whole.start()),
            ))
        })
        .collect()
}
