//! Configuration file loading and CLI merge
//!
//! Settings come from two layers: an optional TOML file and the CLI flags,
//! with CLI values winning. The access token is never stored in the file;
//! only the name of the environment variable holding it is.

use crate::cli::CliArgs;
use crate::error::ConfigError;
use crate::provider::ProviderKind;
use serde::Deserialize;
use std::path::Path;

/// Config file probed in the working directory when --config is not given
pub const DEFAULT_CONFIG_FILE: &str = "refup.toml";

/// On-disk configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    /// Hosting provider name
    pub provider: Option<String>,
    /// Provider host for self-managed installations
    pub host: Option<String>,
    /// Organizations to scan
    #[serde(default)]
    pub orgs: Vec<String>,
    /// Base branch for upgrade PRs
    pub base_branch: Option<String>,
    /// Record upgrades in CHANGELOG.md
    #[serde(default)]
    pub changelog: bool,
    /// Add runtime update scripts to upgrade branches
    #[serde(default)]
    pub runtime_scripts: bool,
    /// Environment variable holding the access token
    pub token_env: Option<String>,
}

impl ConfigFile {
    /// Loads and parses a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        toml::from_str(&text).map_err(|e| ConfigError::parse_error(path, e.to_string()))
    }

    /// Loads the given file, or the default one when it exists
    ///
    /// An explicit `--config` path must load; the implicit default file is
    /// optional.
    pub fn load_optional(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

/// Fully resolved runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub provider: ProviderKind,
    pub host: Option<String>,
    pub orgs: Vec<String>,
    pub base_branch: Option<String>,
    pub changelog: bool,
    pub runtime_scripts: bool,
    pub dry_run: bool,
    pub token: String,
}

impl Settings {
    /// Merges CLI arguments over the config file and validates the result
    pub fn resolve(args: &CliArgs) -> Result<Self, ConfigError> {
        let file = ConfigFile::load_optional(args.config.as_deref())?;

        let provider_name = args
            .provider
            .clone()
            .or(file.provider)
            .ok_or(ConfigError::MissingProvider)?;
        let provider: ProviderKind = provider_name.parse()?;

        let orgs = if args.org.is_empty() {
            file.orgs
        } else {
            args.org.clone()
        };
        if orgs.is_empty() {
            return Err(ConfigError::NoOrgs);
        }

        let token_var = file
            .token_env
            .unwrap_or_else(|| provider.default_token_var().to_string());
        let token =
            std::env::var(&token_var).map_err(|_| ConfigError::missing_token(&token_var))?;

        Ok(Self {
            provider,
            host: args.host.clone().or(file.host),
            orgs,
            base_branch: args.base_branch.clone().or(file.base_branch),
            changelog: args.changelog || file.changelog,
            runtime_scripts: args.runtime_scripts || file.runtime_scripts,
            dry_run: args.dry_run,
            token,
        })
    }
}
