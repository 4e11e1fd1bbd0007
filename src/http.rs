//! Shared HTTP client for fetching targets and probing registries.

use crate::types::{DephuntError, HttpConfig, Result};
use reqwest::header::USER_AGENT;
use reqwest::{redirect, Client};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

/// HTTP client reused by every worker of a run.
///
/// Content fetches follow redirects; registry probes do not, so a 302 from
/// the registry is observed as a status instead of being chased.
#[derive(Clone)]
pub struct HttpClient {
    fetch_client: Client,
    probe_client: Client,
    user_agents: Arc<Vec<String>>,
    next_agent: Arc<AtomicUsize>,
}

impl HttpClient {
    /// Create a new client.
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let fetch_client = Self::builder(config)
            .redirect(redirect::Policy::limited(5))
            .build()?;
        let probe_client = Self::builder(config)
            .redirect(redirect::Policy::none())
            .build()?;

        if config.user_agents.is_empty() {
            return Err(DephuntError::ConfigError(
                "at least one User-Agent is required".to_string(),
            ));
        }

        Ok(Self {
            fetch_client,
            probe_client,
            user_agents: Arc::new(config.user_agents.clone()),
            next_agent: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn builder(config: &HttpConfig) -> reqwest::ClientBuilder {
        Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(30))
    }

    /// Round-robin over the configured browser User-Agents.
    fn user_agent(&self) -> &str {
        let idx = self.next_agent.fetch_add(1, Ordering::Relaxed) % self.user_agents.len();
        &self.user_agents[idx]
    }

    /// GET a document and return its body. Non-2xx answers are errors.
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self
            .fetch_client
            .get(url)
            .header(USER_AGENT, self.user_agent())
            .send()
            .await
            .map_err(|e| DephuntError::FetchError {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DephuntError::FetchError {
                url: url.to_string(),
                reason: format!("HTTP {}", status),
            });
        }

        let content = response.text().await.map_err(|e| DephuntError::FetchError {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        debug!("Fetched {} ({} bytes)", url, content.len());
        Ok(content)
    }

    /// HEAD a lookup URL and return the raw status code.
    pub async fn probe_status(&self, url: &str) -> Result<u16> {
        trace!("Probing {}", url);
        let response = self
            .probe_client
            .head(url)
            .header(USER_AGENT, self.user_agent())
            .send()
            .await
            .map_err(|e| DephuntError::ProbeError {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(response.status().as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_rotation() {
        let client = HttpClient::new(&HttpConfig::default()).unwrap();
        let first = client.user_agent().to_string();
        let second = client.user_agent().to_string();
        let third = client.user_agent().to_string();
        let fourth = client.user_agent().to_string();
        assert_ne!(first, second);
        assert_ne!(second, third);
        assert_eq!(first, fourth);
    }

    #[test]
    fn test_empty_user_agents_rejected() {
        let config = HttpConfig {
            user_agents: Vec::new(),
            ..HttpConfig::default()
        };
        assert!(matches!(
            HttpClient::new(&config),
            Err(DephuntError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_is_fetch_error() {
        let config = HttpConfig {
            timeout_secs: 2,
            ..HttpConfig::default()
        };
        let client = HttpClient::new(&config).unwrap();
        // Port 9 (discard) on localhost is not expected to be listening.
        let result = client.fetch_text("http://127.0.0.1:9/package.json").await;
        assert!(matches!(result, Err(DephuntError::FetchError { .. })));
    }
}
