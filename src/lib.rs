//! refup - Pinned dependency upgrader library
//!
//! This library provides the core functionality for keeping pinned
//! references current across every repository of an organization:
//! - Module references in infrastructure files (`?ref=` pins)
//! - Image references in build files (`name:tag` assignments)
//! - Upgrade branch and pull request creation on GitHub, GitLab and
//!   Azure DevOps

pub mod changelog;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod orchestrator;
pub mod output;
pub mod patch;
pub mod plan;
pub mod pr;
pub mod progress;
pub mod provider;
pub mod resolve;
pub mod runtime;
pub mod scan;
pub mod version;
