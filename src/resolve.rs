//! Cross-repository version resolution
//!
//! A dependency's source locator is mapped to a sibling repository in the
//! same organization by exact name, and that repository's tags become the
//! candidate versions. Resolution is memoized per source so a locator
//! shared by many files costs one provider call.

use crate::provider::{Provider, Repository};
use std::collections::HashMap;

/// Derives a repository name from a source locator
///
/// The name is the last path segment, with a trailing `.git` stripped.
pub fn repo_name(source: &str) -> &str {
    let trimmed = source.trim_end_matches('/');
    let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
    last.strip_suffix(".git").unwrap_or(last)
}

/// Resolves source locators to ordered version sets
pub struct VersionResolver<'a> {
    provider: &'a dyn Provider,
    repos: &'a [Repository],
    cache: HashMap<String, Vec<String>>,
}

impl<'a> VersionResolver<'a> {
    /// Creates a resolver over an organization's discovered repositories
    pub fn new(provider: &'a dyn Provider, repos: &'a [Repository]) -> Self {
        Self {
            provider,
            repos,
            cache: HashMap::new(),
        }
    }

    /// Known versions for a source, newest first, memoized
    ///
    /// An unknown repository name or a tag-listing failure yields an empty
    /// slice; callers treat that as "nothing to upgrade", not an error.
    pub async fn tags_for(&mut self, source: &str) -> &[String] {
        if !self.cache.contains_key(source) {
            let tags = self.fetch(source).await;
            self.cache.insert(source.to_string(), tags);
        }
        self.cache.get(source).map(Vec::as_slice).unwrap_or(&[])
    }

    async fn fetch(&self, source: &str) -> Vec<String> {
        let name = repo_name(source);
        let Some(repo) = self.repos.iter().find(|r| r.name == name) else {
            return Vec::new();
        };
        match self.provider.get_tags(repo).await {
            Ok(tags) => tags,
            Err(_) => Vec::new(),
        }
    }
}
