//! Registry checker for verifying package existence.

use crate::config::RegistryEndpoints;
use crate::http::HttpClient;
use crate::registry::cache::RegistryCache;
use crate::types::{Availability, Language};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{debug, trace};

type ProbeLimiter =
    RateLimiter<governor::state::NotKeyed, governor::state::InMemoryState, governor::clock::DefaultClock>;

/// Checks whether package names are unclaimed on npm or PyPI.
#[derive(Clone)]
pub struct RegistryChecker {
    http: HttpClient,
    cache: RegistryCache,
    endpoints: RegistryEndpoints,
    rate_limiter: Option<Arc<ProbeLimiter>>,
}

impl RegistryChecker {
    /// Create a checker. The cache is owned by the caller's scan run.
    pub fn new(http: HttpClient, cache: RegistryCache, endpoints: RegistryEndpoints) -> Self {
        Self {
            http,
            cache,
            endpoints,
            rate_limiter: None,
        }
    }

    /// Limit uncached probes to `per_second`. Zero leaves probes unlimited.
    pub fn with_rate_limit(mut self, per_second: u32) -> Self {
        self.rate_limiter = NonZeroU32::new(per_second)
            .map(|rate| Arc::new(RateLimiter::direct(Quota::per_second(rate))));
        self
    }

    pub fn cache(&self) -> &RegistryCache {
        &self.cache
    }

    /// Check whether `name` is unclaimed on the registry for `language`.
    ///
    /// A transport failure yields `Availability::indeterminate()`, which is
    /// never reported, and leaves the cache untouched.
    pub async fn is_unclaimed(&self, name: &str, language: Language) -> Availability {
        let lookup_url = self.endpoints.lookup_url(name, language);

        if let Some(status) = self.cache.get(&lookup_url) {
            trace!("Cache hit for {} ({})", lookup_url, status);
            return Availability::from_status(status);
        }

        if let Some(ref limiter) = self.rate_limiter {
            limiter.until_ready().await;
        }

        match self.http.probe_status(&lookup_url).await {
            Ok(status) => {
                self.cache.set(&lookup_url, status);
                let availability = Availability::from_status(status);
                if availability.unclaimed {
                    debug!("Package NOT FOUND on {} registry: {} ({})", language, name, status);
                }
                availability
            }
            Err(e) => {
                debug!("{}", e);
                Availability::indeterminate()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HttpConfig;

    #[tokio::test]
    async fn test_cached_status_skips_network() {
        // Point both registries at a closed port: only the cache can answer.
        let endpoints =
            RegistryEndpoints::new("http://127.0.0.1:9/npm/{name}", "http://127.0.0.1:9/pypi/{name}")
                .unwrap();
        let cache = RegistryCache::new();
        cache.set("http://127.0.0.1:9/npm/internal-ui", 404);
        cache.set("http://127.0.0.1:9/pypi/requests", 200);

        let http = HttpClient::new(&HttpConfig::default()).unwrap();
        let checker = RegistryChecker::new(http, cache, endpoints);

        assert_eq!(
            checker.is_unclaimed("internal-ui", Language::Js).await,
            Availability { unclaimed: true, status: 404 }
        );
        assert_eq!(
            checker.is_unclaimed("requests", Language::Python).await,
            Availability { unclaimed: false, status: 200 }
        );
    }

    #[tokio::test]
    async fn test_lookup_failure_is_indeterminate_and_uncached() {
        let endpoints =
            RegistryEndpoints::new("http://127.0.0.1:9/npm/{name}", "http://127.0.0.1:9/pypi/{name}")
                .unwrap();
        let config = HttpConfig {
            timeout_secs: 2,
            ..HttpConfig::default()
        };
        let http = HttpClient::new(&config).unwrap();
        let checker = RegistryChecker::new(http, RegistryCache::new(), endpoints).with_rate_limit(50);

        let availability = checker.is_unclaimed("whatever", Language::Js).await;
        assert_eq!(availability, Availability::indeterminate());
        assert!(checker.cache().is_empty());
    }
}
