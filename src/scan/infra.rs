//! Module reference extraction from infrastructure files
//!
//! The structured pass walks module blocks with a small hand-rolled reader
//! that understands quoted strings, `#`, `//` and `/* */` comments, and
//! brace nesting. It is not a general configuration parser: anything it
//! cannot make sense of (including heredocs that unbalance braces) aborts
//! the pass as a whole, and the same content is rescanned with a looser
//! regex instead. Both passes feed the same filtering, so they agree on
//! which references count.

use crate::domain::Dependency;
use regex::Regex;
use std::sync::LazyLock;

// Fallback pattern: block label plus the first quoted source in a flat
// stretch of the block body.
static MODULE_FALLBACK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"module\s+"([^"]+)"\s*\{[^{}]*?source\s*=\s*"([^"]+)""#).unwrap()
});

/// A module block before filtering: label, raw source literal, byte offset
#[derive(Debug)]
struct RawModule {
    name: String,
    source: String,
    offset: usize,
}

/// Structured pass bailed out; the reason is only ever inspected by tests
#[derive(Debug, PartialEq, Eq)]
struct ParseAbort(&'static str);

/// Extracts versioned module references from a `.tf` file
///
/// References are kept only when their source points at a Git hosting
/// service and carries a `ref=` query parameter. Everything else (local
/// paths, registry shorthand, floating references) is dropped.
pub fn scan_modules(content: &str, file_path: &str) -> Vec<Dependency> {
    let raw = match parse_module_blocks(content) {
        Ok(blocks) => blocks,
        Err(_) => fallback_scan(content),
    };
    raw.into_iter()
        .filter_map(|block| to_dependency(block, content, file_path))
        .collect()
}

/// Converts a raw block into a dependency, or drops it
fn to_dependency(block: RawModule, content: &str, file_path: &str) -> Option<Dependency> {
    if !is_version_controlled(&block.source) {
        return None;
    }
    let (identity, query) = block.source.split_once('?')?;
    let version = ref_param(query)?;
    if version.is_empty() {
        return None;
    }
    Some(Dependency::module(
        block.name,
        identity,
        version,
        file_path,
        super::line_of(content, block.offset),
    ))
}

/// Returns true if the locator points at a Git hosting service
fn is_version_controlled(source: &str) -> bool {
    source.starts_with("git::")
        || source.starts_with("git@")
        || source.contains("github.com")
        || source.contains("gitlab")
        || source.contains("dev.azure.com")
        || source.contains("visualstudio.com")
        || source.contains("/_git/")
}

/// Pulls the `ref` parameter out of a source query string
fn ref_param(query: &str) -> Option<&str> {
    query.split('&').find_map(|pair| pair.strip_prefix("ref="))
}

/// Regex rescan of content the structured pass gave up on
fn fallback_scan(content: &str) -> Vec<RawModule> {
    MODULE_FALLBACK_RE
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(RawModule {
                name: caps.get(1)?.as_str().to_string(),
                source: caps.get(2)?.as_str().to_string(),
                offset: whole.start(),
            })
        })
        .collect()
}

/// Walks top-level blocks and collects module blocks with a literal source
fn parse_module_blocks(content: &str) -> Result<Vec<RawModule>, ParseAbort> {
    let mut cursor = Cursor::new(content);
    let mut blocks = Vec::new();
    loop {
        cursor.skip_trivia()?;
        if cursor.at_end() {
            return Ok(blocks);
        }
        let start = cursor.pos;
        let Some(ident) = cursor.eat_ident() else {
            return Err(ParseAbort("unexpected character at top level"));
        };
        // Block headers carry zero or more quoted labels before the body.
        let mut labels = Vec::new();
        loop {
            cursor.skip_trivia()?;
            match cursor.peek() {
                Some(b'"') => labels.push(cursor.eat_string()?),
                Some(b'{') => break,
                _ => return Err(ParseAbort("malformed block header")),
            }
        }
        cursor.bump(); // '{'
        let source = cursor.read_block_body()?;
        if ident == "module" {
            if let (Some(label), Some(source)) = (labels.first(), source) {
                blocks.push(RawModule {
                    name: (*label).to_string(),
                    source: source.to_string(),
                    offset: start,
                });
            }
        }
    }
}

/// Byte-oriented reader over file content
struct Cursor<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<u8> {
        self.bytes.get(self.pos + 1).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    /// Skips whitespace and all three comment forms
    fn skip_trivia(&mut self) -> Result<(), ParseAbort> {
        loop {
            match self.peek() {
                Some(b) if b.is_ascii_whitespace() => self.bump(),
                Some(b'#') => self.skip_line(),
                Some(b'/') if self.peek_next() == Some(b'/') => self.skip_line(),
                Some(b'/') if self.peek_next() == Some(b'*') => {
                    self.pos += 2;
                    loop {
                        if self.pos + 1 >= self.bytes.len() {
                            return Err(ParseAbort("unterminated block comment"));
                        }
                        if self.bytes[self.pos] == b'*' && self.bytes[self.pos + 1] == b'/' {
                            self.pos += 2;
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn skip_line(&mut self) {
        while let Some(b) = self.peek() {
            self.bump();
            if b == b'\n' {
                break;
            }
        }
    }

    /// Reads an identifier; returns None when not at one
    fn eat_ident(&mut self) -> Option<&'a str> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || b == b'_' || b == b'-' {
                self.bump();
            } else {
                break;
            }
        }
        if self.pos > start {
            Some(&self.src[start..self.pos])
        } else {
            None
        }
    }

    /// Reads a quoted string starting at `"`, escape-aware, raw inner text
    fn eat_string(&mut self) -> Result<&'a str, ParseAbort> {
        self.bump(); // opening quote
        let start = self.pos;
        while let Some(b) = self.peek() {
            match b {
                b'\\' => {
                    self.bump();
                    if self.peek().is_some() {
                        self.bump();
                    }
                }
                b'"' => {
                    let inner = &self.src[start..self.pos];
                    self.bump();
                    return Ok(inner);
                }
                b'\n' => return Err(ParseAbort("unterminated string")),
                _ => self.bump(),
            }
        }
        Err(ParseAbort("unterminated string"))
    }

    /// Walks one block body and captures the first `source` attribute at
    /// the block's own depth
    ///
    /// A source that is not a quoted literal, or that contains `${`, aborts
    /// the whole pass.
    fn read_block_body(&mut self) -> Result<Option<&'a str>, ParseAbort> {
        let mut depth = 1usize;
        let mut source = None;
        while depth > 0 {
            self.skip_trivia()?;
            match self.peek() {
                None => return Err(ParseAbort("unclosed block")),
                Some(b'{') => {
                    depth += 1;
                    self.bump();
                }
                Some(b'}') => {
                    depth -= 1;
                    self.bump();
                }
                Some(b'"') => {
                    self.eat_string()?;
                }
                Some(b) if b.is_ascii_alphanumeric() || b == b'_' || b == b'-' => {
                    if let Some(ident) = self.eat_ident() {
                        if depth == 1 && ident == "source" && source.is_none() {
                            self.skip_trivia()?;
                            if self.peek() == Some(b'=') {
                                self.bump();
                                self.skip_trivia()?;
                                if self.peek() == Some(b'"') {
                                    let value = self.eat_string()?;
                                    if value.contains("${") {
                                        return Err(ParseAbort("interpolated source"));
                                    }
                                    source = Some(value);
                                } else {
                                    return Err(ParseAbort("source is not a literal string"));
                                }
                            }
                        }
                    }
                }
                Some(_) => self.bump(),
            }
        }
        Ok(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_basic_module_block() {
        let content = r#"
module "net" {
  source = "git::https://host/org/_git/mod-net?ref=v1.0.0"
}
"#;
        let deps = scan_modules(content, "main.tf");
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].name, "net");
        assert_eq!(deps[0].source, "git::https://host/org/_git/mod-net");
        assert_eq!(deps[0].current_version, "v1.0.0");
        assert_eq!(deps[0].file_path, "main.tf");
        assert_eq!(deps[0].line, 2);
    }

    #[test]
    fn test_scan_multiple_blocks_in_order() {
        let content = r#"
module "net" {
  source = "git::https://host/org/_git/mod-net?ref=v1.0.0"
}

module "dns" {
  source  = "git@github.com:org/mod-dns.git?ref=v2.1.0"
  zone_id = "abc"
}
"#;
        let deps = scan_modules(content, "main.tf");
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].name, "net");
        assert_eq!(deps[1].name, "dns");
        assert_eq!(deps[1].source, "git@github.com:org/mod-dns.git");
        assert_eq!(deps[1].current_version, "v2.1.0");
        assert_eq!(deps[1].line, 6);
    }

    #[test]
    fn test_scan_skips_local_sources() {
        let content = r#"
module "shared" {
  source = "../modules/shared"
}
module "registry" {
  source = "hashicorp/consul/aws?ref=v1.0.0"
}
"#;
        assert!(scan_modules(content, "main.tf").is_empty());
    }

    #[test]
    fn test_scan_drops_reference_without_ref_param() {
        let content = r#"
module "floating" {
  source = "git::https://gitlab.example.com/org/mod-floating"
}
module "pinned" {
  source = "git::https://gitlab.example.com/org/mod-pinned?ref=v1.2.0"
}
"#;
        let deps = scan_modules(content, "main.tf");
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].name, "pinned");
    }

    #[test]
    fn test_scan_drops_empty_ref_value() {
        let content = r#"
module "net" {
  source = "git::https://host/org/_git/mod-net?ref="
}
"#;
        assert!(scan_modules(content, "main.tf").is_empty());
    }

    #[test]
    fn test_scan_reads_ref_among_other_params() {
        let content = r#"
module "net" {
  source = "git::https://host/org/_git/mod-net?depth=1&ref=v1.0.0"
}
"#;
        let deps = scan_modules(content, "main.tf");
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].current_version, "v1.0.0");
        assert_eq!(deps[0].source, "git::https://host/org/_git/mod-net");
    }

    #[test]
    fn test_scan_tolerates_comments_and_nested_blocks() {
        let content = r#"
# network layer
terraform {
  required_version = ">= 1.0"
}

module "net" {
  /* pinned on purpose */
  providers = {
    aws = aws.primary
  }
  source = "git::https://dev.azure.com/org/proj/_git/mod-net?ref=v1.0.0" // pinned
  cidr   = "10.0.0.0/16"
}
"#;
        let deps = scan_modules(content, "main.tf");
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].name, "net");
        assert_eq!(deps[0].line, 7);
    }

    #[test]
    fn test_structured_pass_ignores_source_in_nested_block() {
        let content = r#"
module "net" {
  lifecycle {
    source = "git::https://github.com/org/decoy?ref=v9.9.9"
  }
  source = "git::https://github.com/org/mod-net?ref=v1.0.0"
}
"#;
        let deps = scan_modules(content, "main.tf");
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].source, "git::https://github.com/org/mod-net");
    }

    #[test]
    fn test_interpolated_source_falls_back_to_regex() {
        // The interpolated block aborts the structured pass. The regex pass
        // re-extracts everything; the templated locator survives filtering
        // and is left for the resolver, whose exact-name lookup skips it.
        let content = r#"
module "templated" {
  source = "git::https://host/org/_git/${var.module}?ref=v1.0.0"
}
module "net" {
  source = "git::https://host/org/_git/mod-net?ref=v1.0.0"
}
"#;
        assert!(parse_module_blocks(content).is_err());
        let deps = scan_modules(content, "main.tf");
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].name, "templated");
        assert_eq!(deps[1].name, "net");
    }

    #[test]
    fn test_non_literal_source_falls_back_to_regex() {
        let content = r#"
module "dynamic" {
  source = var.module_source
}
module "net" {
  source = "git::https://github.com/org/mod-net?ref=v1.0.0"
}
"#;
        assert!(parse_module_blocks(content).is_err());
        let deps = scan_modules(content, "main.tf");
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].name, "net");
    }

    #[test]
    fn test_unclosed_block_falls_back_to_regex() {
        let content = r#"
module "net" {
  source = "git::https://github.com/org/mod-net?ref=v1.0.0"
"#;
        assert_eq!(parse_module_blocks(content).unwrap_err(), ParseAbort("unclosed block"));
        let deps = scan_modules(content, "main.tf");
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].name, "net");
    }

    #[test]
    fn test_fallback_line_numbers_match_block_start() {
        let content = "locals {\n\nmodule \"net\" {\n  source = \"git::https://github.com/org/mod-net?ref=v1.0.0\"\n}\n";
        // Unclosed `locals` forces the fallback.
        let deps = scan_modules(content, "main.tf");
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].line, 3);
    }

    #[test]
    fn test_structured_pass_handles_escaped_quotes() {
        let content = r#"
module "net" {
  description = "a \"quoted\" word"
  source      = "git::https://gitlab.com/org/mod-net?ref=v1.0.0"
}
"#;
        let deps = scan_modules(content, "main.tf");
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].current_version, "v1.0.0");
    }

    #[test]
    fn test_visualstudio_host_is_version_controlled() {
        let content = r#"
module "net" {
  source = "https://org.visualstudio.com/proj/_git/mod-net?ref=v0.3.0"
}
"#;
        let deps = scan_modules(content, "main.tf");
        assert_eq!(deps.len(), 1);
    }

    #[test]
    fn test_module_without_source_is_ignored() {
        let content = r#"
module "empty" {
  count = 1
}
"#;
        assert!(scan_modules(content, "main.tf").is_empty());
        assert!(parse_module_blocks(content).is_ok());
    }

    #[test]
    fn test_ref_param_requires_exact_key() {
        assert_eq!(ref_param("xref=v1"), None);
        assert_eq!(ref_param("depth=1&ref=v2"), Some("v2"));
        assert_eq!(ref_param("ref=v1&depth=1"), Some("v1"));
    }

    #[test]
    fn test_is_version_controlled_shapes() {
        assert!(is_version_controlled("git::https://example.com/org/repo"));
        assert!(is_version_controlled("git@example.com:org/repo.git"));
        assert!(is_version_controlled("https://github.com/org/repo"));
        assert!(is_version_controlled("https://gitlab.example.com/org/repo"));
        assert!(is_version_controlled("https://dev.azure.com/org/proj/_git/repo"));
        assert!(is_version_controlled("https://org.visualstudio.com/proj/_git/repo"));
        assert!(!is_version_controlled("../modules/shared"));
        assert!(!is_version_controlled("hashicorp/consul/aws"));
    }
}
