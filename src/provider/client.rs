//! Shared HTTP client for provider REST calls
//!
//! Wraps reqwest with a timeout, a user agent, and exponential-backoff
//! retries for GET requests. POST requests are never retried: they create
//! branches and pull requests and are not safe to replay.

use crate::error::ProviderError;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_USER_AGENT: &str = concat!("refup/", env!("CARGO_PKG_VERSION"));
const MAX_RETRIES: u32 = 3;
const BASE_DELAY_MS: u64 = 100;

/// HTTP client shared by all provider implementations
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    max_retries: u32,
}

impl HttpClient {
    /// Creates a client with default timeout and user agent
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Creates a client with a custom timeout and user agent
    pub fn with_config(timeout: Duration, user_agent: &str) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| ProviderError::network("client", "http", e.to_string()))?;
        Ok(Self {
            client,
            max_retries: MAX_RETRIES,
        })
    }

    /// Overrides the retry count (mainly for tests)
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sends a GET and retries transient failures with exponential backoff
    async fn get_with_retry(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        resource: &str,
        provider: &str,
    ) -> Result<Response, ProviderError> {
        let mut last_error = None;
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_millis(BASE_DELAY_MS * 2u64.pow(attempt - 1));
                tokio::time::sleep(delay).await;
            }
            let mut request = self.client.get(url);
            for (name, value) in headers {
                request = request.header(*name, *value);
            }
            match request.send().await {
                Ok(response) => {
                    if let Some(err) = status_error(response.status(), resource, provider) {
                        // Only rate limiting is worth waiting out.
                        if matches!(err, ProviderError::RateLimited { .. })
                            && attempt < self.max_retries
                        {
                            last_error = Some(err);
                            continue;
                        }
                        return Err(err);
                    }
                    return Ok(response);
                }
                Err(e) if e.is_timeout() => {
                    last_error = Some(ProviderError::timeout(resource, provider));
                }
                Err(e) => {
                    last_error = Some(ProviderError::network(resource, provider, e.to_string()));
                }
            }
        }
        Err(last_error
            .unwrap_or_else(|| ProviderError::network(resource, provider, "request failed")))
    }

    /// GET returning a deserialized JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        resource: &str,
        provider: &str,
    ) -> Result<T, ProviderError> {
        let response = self.get_with_retry(url, headers, resource, provider).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::invalid_response(resource, provider, e.to_string()))
    }

    /// GET returning the raw body text
    pub async fn get_text(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        resource: &str,
        provider: &str,
    ) -> Result<String, ProviderError> {
        let response = self.get_with_retry(url, headers, resource, provider).await?;
        response
            .text()
            .await
            .map_err(|e| ProviderError::invalid_response(resource, provider, e.to_string()))
    }

    /// POST with a JSON body, returning a deserialized JSON response
    pub async fn post_json<B, T>(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &B,
        resource: &str,
        provider: &str,
    ) -> Result<T, ProviderError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.client.post(url).json(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::timeout(resource, provider)
            } else {
                ProviderError::network(resource, provider, e.to_string())
            }
        })?;
        if let Some(err) = status_error(response.status(), resource, provider) {
            return Err(err);
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::invalid_response(resource, provider, e.to_string()))
    }
}

/// Maps a non-success status to the matching provider error
fn status_error(status: StatusCode, resource: &str, provider: &str) -> Option<ProviderError> {
    if status == StatusCode::NOT_FOUND {
        return Some(ProviderError::not_found(resource, provider));
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Some(ProviderError::auth_failed(
            provider,
            format!("HTTP {}", status.as_u16()),
        ));
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Some(ProviderError::rate_limited(provider));
    }
    if !status.is_success() {
        return Some(ProviderError::network(
            resource,
            provider,
            format!("HTTP {}", status.as_u16()),
        ));
    }
    None
}
