//! Keep-a-Changelog splicing
//!
//! Entries land under the `## [Unreleased]` heading, inside its `### Changed`
//! subsection. Only line insertion happens; every existing line survives
//! unchanged, and a document without an Unreleased heading is returned byte
//! for byte.

/// File the changelog splicer targets in every repository
pub const CHANGELOG_FILE: &str = "CHANGELOG.md";

/// Splices changelog entries into the Unreleased section
///
/// With an existing Changed subsection the entries are appended right after
/// its last bullet. Without one, a Changed subsection is synthesized after
/// the Unreleased heading. Returns the input unchanged when `entries` is
/// empty or no Unreleased heading exists.
pub fn insert_entries(content: &str, entries: &[String]) -> String {
    if entries.is_empty() {
        return content.to_string();
    }
    let lines: Vec<&str> = content.split('\n').collect();
    let Some(unreleased) = lines.iter().position(|l| is_unreleased_heading(l)) else {
        return content.to_string();
    };
    let section_end = lines[unreleased + 1..]
        .iter()
        .position(|l| l.starts_with("## "))
        .map(|i| unreleased + 1 + i)
        .unwrap_or(lines.len());

    let mut out: Vec<&str> = Vec::with_capacity(lines.len() + entries.len() + 3);
    match changed_heading(&lines, unreleased + 1, section_end) {
        Some(changed) => {
            let insert_at = bullet_run_end(&lines, changed + 1, section_end);
            out.extend(&lines[..insert_at]);
            out.extend(entries.iter().map(String::as_str));
            out.extend(&lines[insert_at..]);
        }
        None => {
            out.extend(&lines[..=unreleased]);
            out.push("");
            out.push("### Changed");
            out.push("");
            out.extend(entries.iter().map(String::as_str));
            out.extend(&lines[unreleased + 1..]);
        }
    }
    out.join("\n")
}

fn is_unreleased_heading(line: &str) -> bool {
    line.starts_with("## ") && line.contains("Unreleased")
}

/// Index of the Changed subsection heading within the section, if present
fn changed_heading(lines: &[&str], from: usize, to: usize) -> Option<usize> {
    (from..to).find(|&i| lines[i].starts_with("### ") && lines[i].contains("Changed"))
}

/// One past the last bullet of the run starting at `from`
///
/// Blank lines between bullets are tolerated; any other line ends the run.
fn bullet_run_end(lines: &[&str], from: usize, to: usize) -> usize {
    let mut end = from;
    for (i, line) in lines.iter().enumerate().take(to).skip(from) {
        if line.trim_start().starts_with("- ") {
            end = i + 1;
        } else if line.trim().is_empty() {
            continue;
        } else {
            break;
        }
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_appends_after_existing_changed_bullets() {
        let content = concat!(
            "# Changelog\n",
            "\n",
            "## [Unreleased]\n",
            "\n",
            "### Changed\n",
            "\n",
            "- Something earlier\n",
            "\n",
            "## [1.0.0] - 2024-01-01\n",
            "\n",
            "- Initial release\n",
        );
        let updated = insert_entries(
            content,
            &entries(&["- Upgrade module `net` from `v1.0.0` to `v2.0.0`"]),
        );
        let expected = concat!(
            "# Changelog\n",
            "\n",
            "## [Unreleased]\n",
            "\n",
            "### Changed\n",
            "\n",
            "- Something earlier\n",
            "- Upgrade module `net` from `v1.0.0` to `v2.0.0`\n",
            "\n",
            "## [1.0.0] - 2024-01-01\n",
            "\n",
            "- Initial release\n",
        );
        assert_eq!(updated, expected);
    }

    #[test]
    fn test_synthesizes_changed_subsection() {
        let content = "# Changelog\n\n## [Unreleased]\n\n## [1.0.0] - 2024-01-01\n";
        let updated = insert_entries(content, &entries(&["- Bump image `app` from `1` to `2`"]));
        let expected = concat!(
            "# Changelog\n",
            "\n",
            "## [Unreleased]\n",
            "\n",
            "### Changed\n",
            "\n",
            "- Bump image `app` from `1` to `2`\n",
            "\n",
            "## [1.0.0] - 2024-01-01\n",
        );
        assert_eq!(updated, expected);
    }

    #[test]
    fn test_changed_bullets_with_blank_gaps() {
        let content = concat!(
            "## [Unreleased]\n",
            "\n",
            "### Changed\n",
            "\n",
            "- First\n",
            "\n",
            "- Second\n",
            "\n",
            "### Added\n",
            "\n",
            "- A feature\n",
        );
        let updated = insert_entries(content, &entries(&["- Third"]));
        assert!(updated.contains("- Second\n- Third\n"));
        // The Added subsection is left alone.
        assert!(updated.contains("### Added\n\n- A feature\n"));
    }

    #[test]
    fn test_ignores_changed_in_released_section() {
        let content = concat!(
            "## [Unreleased]\n",
            "\n",
            "## [1.0.0] - 2024-01-01\n",
            "\n",
            "### Changed\n",
            "\n",
            "- Old change\n",
        );
        let updated = insert_entries(content, &entries(&["- New change"]));
        // A Changed subsection is synthesized under Unreleased instead of
        // touching the released one.
        let expected = concat!(
            "## [Unreleased]\n",
            "\n",
            "### Changed\n",
            "\n",
            "- New change\n",
            "\n",
            "## [1.0.0] - 2024-01-01\n",
            "\n",
            "### Changed\n",
            "\n",
            "- Old change\n",
        );
        assert_eq!(updated, expected);
    }

    #[test]
    fn test_no_unreleased_heading_is_a_byte_for_byte_noop() {
        let content = "# Changelog\n\n## [1.0.0] - 2024-01-01\n\n- Initial\n";
        let updated = insert_entries(content, &entries(&["- New change"]));
        assert_eq!(updated, content);
    }

    #[test]
    fn test_empty_entries_is_a_byte_for_byte_noop() {
        let content = "# Changelog\n\n## [Unreleased]\n";
        assert_eq!(insert_entries(content, &[]), content);
    }

    #[test]
    fn test_unreleased_at_end_of_file() {
        let content = "# Changelog\n\n## [Unreleased]\n";
        let updated = insert_entries(content, &entries(&["- Only change"]));
        assert_eq!(
            updated,
            "# Changelog\n\n## [Unreleased]\n\n### Changed\n\n- Only change\n"
        );
    }

    #[test]
    fn test_missing_trailing_newline_is_preserved() {
        let content = "## [Unreleased]\n\n### Changed\n\n- First";
        let updated = insert_entries(content, &entries(&["- Second"]));
        assert_eq!(updated, "## [Unreleased]\n\n### Changed\n\n- First\n- Second");
    }

    #[test]
    fn test_unreleased_without_brackets() {
        let content = "## Unreleased\n";
        let updated = insert_entries(content, &entries(&["- Change"]));
        assert!(updated.contains("### Changed"));
    }
}
