//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ProviderError: Issues talking to a Git hosting provider
//! - ConfigError: Issues with CLI and config file resolution

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Hosting provider related errors
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors related to Git hosting provider communication
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Requested resource does not exist
    #[error("resource '{resource}' not found on {provider}")]
    NotFound { resource: String, provider: String },

    /// Network request failed
    #[error("request for '{resource}' failed on {provider}: {message}")]
    Network {
        resource: String,
        provider: String,
        message: String,
    },

    /// Rate limit exceeded
    #[error("rate limit exceeded for {provider}")]
    RateLimited { provider: String },

    /// Response body did not match the expected shape
    #[error("invalid response from {provider} for '{resource}': {message}")]
    InvalidResponse {
        resource: String,
        provider: String,
        message: String,
    },

    /// Request timed out
    #[error("timeout while waiting for '{resource}' from {provider}")]
    Timeout { resource: String, provider: String },

    /// Authentication or authorization failure
    #[error("authentication failed for {provider}: {message}")]
    AuthFailed { provider: String, message: String },
}

impl ProviderError {
    /// Creates a new NotFound error
    pub fn not_found(resource: impl Into<String>, provider: impl Into<String>) -> Self {
        ProviderError::NotFound {
            resource: resource.into(),
            provider: provider.into(),
        }
    }

    /// Creates a new Network error
    pub fn network(
        resource: impl Into<String>,
        provider: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ProviderError::Network {
            resource: resource.into(),
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Creates a new RateLimited error
    pub fn rate_limited(provider: impl Into<String>) -> Self {
        ProviderError::RateLimited {
            provider: provider.into(),
        }
    }

    /// Creates a new InvalidResponse error
    pub fn invalid_response(
        resource: impl Into<String>,
        provider: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ProviderError::InvalidResponse {
            resource: resource.into(),
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(resource: impl Into<String>, provider: impl Into<String>) -> Self {
        ProviderError::Timeout {
            resource: resource.into(),
            provider: provider.into(),
        }
    }

    /// Creates a new AuthFailed error
    pub fn auth_failed(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::AuthFailed {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the config file
    #[error("failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    /// Provider name is not recognized
    #[error("unknown provider '{value}': expected 'github', 'gitlab', or 'azure'")]
    UnknownProvider { value: String },

    /// No provider given on the CLI or in the config file
    #[error("no provider specified: pass --provider or set one in the config file")]
    MissingProvider,

    /// No organizations given on the CLI or in the config file
    #[error("no organizations specified: pass --org or set orgs in the config file")]
    NoOrgs,

    /// Access token environment variable is not set
    #[error("no access token found: set the {var} environment variable")]
    MissingToken { var: String },
}

impl ConfigError {
    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new ParseError
    pub fn parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ConfigError::ParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new UnknownProvider error
    pub fn unknown_provider(value: impl Into<String>) -> Self {
        ConfigError::UnknownProvider {
            value: value.into(),
        }
    }

    /// Creates a new MissingToken error
    pub fn missing_token(var: impl Into<String>) -> Self {
        ConfigError::MissingToken { var: var.into() }
    }
}
