//! Text-preserving reference rewriting
//!
//! Patches are plain string edits on the original file content, never a
//! parse and re-serialize pass, so formatting and comments survive. Each
//! task rewrites at most one occurrence, found by trying increasingly
//! loose anchors:
//!
//! - the exact `source?ref=version` (or `name:tag`) substring
//! - a pattern anchored on the reference's label and its pinned value
//! - for modules, any `?ref=version` occurrence as a last resort
//!
//! A task whose reference cannot be located leaves the text untouched.

use crate::domain::{DependencyKind, FileChange, UpgradeTask};
use regex::{NoExpand, Regex};
use std::collections::HashMap;

/// Applies upgrade tasks and returns one edit per touched file
///
/// Tasks are grouped by file path in first-seen order. The first task for a
/// path seeds the working text from its stored content; later tasks for the
/// same path are applied on top of the already-patched text.
pub fn apply_upgrades(tasks: &[UpgradeTask]) -> Vec<FileChange> {
    let mut order: Vec<&str> = Vec::new();
    let mut buffers: HashMap<&str, String> = HashMap::new();

    for task in tasks {
        let path = task.dependency.file_path.as_str();
        if !buffers.contains_key(path) {
            order.push(path);
            buffers.insert(path, task.file_content.clone());
        }
        if let Some(text) = buffers.get_mut(path) {
            *text = apply_task(text, task);
        }
    }

    order
        .into_iter()
        .filter_map(|path| {
            buffers
                .remove(path)
                .map(|content| FileChange::edit(path, content))
        })
        .collect()
}

fn apply_task(text: &str, task: &UpgradeTask) -> String {
    match task.dependency.kind {
        DependencyKind::Module => patch_module(text, task),
        DependencyKind::Image => patch_image(text, task),
    }
}

fn patch_module(text: &str, task: &UpgradeTask) -> String {
    let dep = &task.dependency;

    let exact = format!("{}?ref={}", dep.source, dep.current_version);
    if text.contains(&exact) {
        let replacement = format!("{}?ref={}", dep.source, task.new_version);
        return text.replacen(&exact, &replacement, 1);
    }

    // The ref may sit behind other query parameters; anchor on the block
    // label instead of the full locator.
    let anchored = format!(
        r#"(module\s+"{}"\s*\{{[^}}]*?[?&]ref=){}"#,
        regex::escape(&dep.name),
        regex::escape(&dep.current_version)
    );
    if let Ok(re) = Regex::new(&anchored) {
        if re.is_match(text) {
            return re
                .replace(text, |caps: &regex::Captures| {
                    format!("{}{}", &caps[1], task.new_version)
                })
                .into_owned();
        }
    }

    let loose = format!(r"\?ref={}", regex::escape(&dep.current_version));
    if let Ok(re) = Regex::new(&loose) {
        if re.is_match(text) {
            let replacement = format!("?ref={}", task.new_version);
            return re.replace(text, NoExpand(&replacement)).into_owned();
        }
    }

    text.to_string()
}

fn patch_image(text: &str, task: &UpgradeTask) -> String {
    let dep = &task.dependency;

    let exact = format!("{}:{}", dep.source, dep.current_version);
    if text.contains(&exact) {
        let replacement = format!("{}:{}", dep.source, task.new_version);
        return text.replacen(&exact, &replacement, 1);
    }

    let anchored = format!(
        r#"({}\s*=\s*"{}:)[^"]+"#,
        regex::escape(&dep.name),
        regex::escape(&dep.source)
    );
    if let Ok(re) = Regex::new(&anchored) {
        if re.is_match(text) {
            return re
                .replace(text, |caps: &regex::Captures| {
                    format!("{}{}", &caps[1], task.new_version)
                })
                .into_owned();
        }
    }

    text.to_string()
}
