//! File change descriptions handed to the hosting provider

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a file change should be applied on the remote branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// Replace the content of an existing file
    Edit,
    /// Create a new file
    Add,
    /// Remove an existing file
    Delete,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeType::Edit => write!(f, "edit"),
            ChangeType::Add => write!(f, "add"),
            ChangeType::Delete => write!(f, "delete"),
        }
    }
}

/// A single file change to commit on an upgrade branch
///
/// `content` carries the complete new file text for edits and adds, and is
/// empty for deletes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// Repository-relative path of the file
    pub path: String,
    /// Complete new content of the file
    pub content: String,
    /// How the change is applied
    pub change_type: ChangeType,
}

impl FileChange {
    /// Creates an edit of an existing file
    pub fn edit(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            change_type: ChangeType::Edit,
        }
    }

    /// Creates a new file
    pub fn add(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            change_type: ChangeType::Add,
        }
    }

    /// Removes an existing file
    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: String::new(),
            change_type: ChangeType::Delete,
        }
    }
}

impl fmt::Display for FileChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.change_type, self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_constructor() {
        let change = FileChange::edit("main.tf", "module \"net\" {}");
        assert_eq!(change.change_type, ChangeType::Edit);
        assert_eq!(change.path, "main.tf");
        assert!(!change.content.is_empty());
    }

    #[test]
    fn test_add_constructor() {
        let change = FileChange::add("scripts/refup-update-node.sh", "#!/bin/sh\n");
        assert_eq!(change.change_type, ChangeType::Add);
    }

    #[test]
    fn test_delete_constructor() {
        let change = FileChange::delete("old.tf");
        assert_eq!(change.change_type, ChangeType::Delete);
        assert!(change.content.is_empty());
    }

    #[test]
    fn test_change_display() {
        let change = FileChange::edit("main.tf", "x");
        assert_eq!(format!("{}", change), "edit main.tf");
    }

    #[test]
    fn test_change_type_serialization() {
        let json = serde_json::to_string(&ChangeType::Edit).unwrap();
        assert_eq!(json, "\"edit\"");
    }
}
