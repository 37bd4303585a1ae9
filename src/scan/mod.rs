//! Dependency scanning for infrastructure and build files
//!
//! This module provides:
//! - File kind detection by suffix
//! - Module reference extraction from infrastructure files
//! - Image reference extraction from build files

mod build;
mod infra;

pub use build::scan_images;
pub use infra::scan_modules;

use crate::domain::Dependency;

/// File suffixes the scanner understands, in traversal order
pub const SCAN_SUFFIXES: [&str; 2] = [".tf", ".bzl"];

/// The kind of file a path points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Infrastructure file with module blocks (`.tf`)
    Infra,
    /// Build file with image assignments (`.bzl`)
    Build,
}

/// Determines the file kind from a path suffix
pub fn file_kind(path: &str) -> Option<FileKind> {
    if path.ends_with(".tf") {
        Some(FileKind::Infra)
    } else if path.ends_with(".bzl") {
        Some(FileKind::Build)
    } else {
        None
    }
}

/// Scans file content for pinned dependency references
///
/// Unsupported file kinds yield an empty list. References without a
/// resolvable version are dropped, so every returned dependency carries a
/// non-empty `current_version`.
pub fn scan(content: &str, file_path: &str) -> Vec<Dependency> {
    match file_kind(file_path) {
        Some(FileKind::Infra) => infra::scan_modules(content, file_path),
        Some(FileKind::Build) => build::scan_images(content, file_path),
        None => Vec::new(),
    }
}

/// 1-based line number of a byte offset
pub(crate) fn line_of(content: &str, offset: usize) -> usize {
    content.as_bytes()[..offset]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DependencyKind;

    #[test]
    fn test_file_kind_by_suffix() {
        assert_eq!(file_kind("envs/prod/main.tf"), Some(FileKind::Infra));
        assert_eq!(file_kind("images.bzl"), Some(FileKind::Build));
        assert_eq!(file_kind("README.md"), None);
        assert_eq!(file_kind("main.tf.bak"), None);
    }

    #[test]
    fn test_scan_dispatches_on_kind() {
        let tf = r#"
module "net" {
  source = "git::https://host/org/_git/mod-net?ref=v1.0.0"
}
"#;
        let deps = scan(tf, "main.tf");
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].kind, DependencyKind::Module);

        let bzl = "app_image = \"my-app:v1.2.3\"\n";
        let deps = scan(bzl, "images.bzl");
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].kind, DependencyKind::Image);
    }

    #[test]
    fn test_scan_ignores_unknown_suffix() {
        let content = "app_image = \"my-app:v1.2.3\"\n";
        assert!(scan(content, "notes.txt").is_empty());
    }

    #[test]
    fn test_line_of_counts_newlines() {
        let content = "a\nb\nc";
        assert_eq!(line_of(content, 0), 1);
        assert_eq!(line_of(content, 2), 2);
        assert_eq!(line_of(content, 4), 3);
    }
}
