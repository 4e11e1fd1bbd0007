//! Main scanner orchestrating all components.
//!
//! classify -> (pool over URLs) fetch + extract -> (pool over names) probe.

use crate::config::ScanConfig;
use crate::discovery::filter_target_urls;
use crate::http::HttpClient;
use crate::parser::DependencyExtractor;
use crate::pool::WorkerPool;
use crate::registry::{RegistryCache, RegistryChecker};
use crate::types::{Dependency, Result, Vulnerability};
use indicatif::ProgressBar;
use std::collections::HashSet;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, trace};

/// Everything a worker needs, shared by reference across both pool levels.
struct ScanContext {
    http: HttpClient,
    extractor: DependencyExtractor,
    checker: RegistryChecker,
    concurrency: usize,
}

/// Main scanner that orchestrates all scanning components.
pub struct Scanner {
    context: Arc<ScanContext>,
    progress: Option<ProgressBar>,
}

impl Scanner {
    /// Create a new scanner with the given configuration.
    ///
    /// The registry cache lives exactly as long as this scanner.
    pub fn new(config: ScanConfig) -> Result<Self> {
        let http = HttpClient::new(&config.http_config())?;
        let checker = RegistryChecker::new(http.clone(), RegistryCache::new(), config.endpoints.clone())
            .with_rate_limit(config.rate_limit);

        Ok(Self {
            context: Arc::new(ScanContext {
                http,
                extractor: DependencyExtractor::new(),
                checker,
                concurrency: config.concurrency.max(1),
            }),
            progress: None,
        })
    }

    /// Tick `progress` once per finished URL.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// The status cache shared by every probe of this scanner.
    pub fn cache(&self) -> &RegistryCache {
        self.context.checker.cache()
    }

    /// Classify raw input lines and scan the accepted URLs.
    pub async fn scan_lines<I, S>(&self, lines: I) -> Vec<Vulnerability>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls = filter_target_urls(lines);
        debug!("{} target URLs accepted", urls.len());
        self.scan_urls(urls).await
    }

    /// Scan already-classified URLs.
    ///
    /// Every URL is processed; a URL that cannot be fetched or parsed simply
    /// contributes nothing. Output order follows URL completion order.
    pub async fn scan_urls(&self, urls: Vec<String>) -> Vec<Vulnerability> {
        if let Some(ref pb) = self.progress {
            pb.set_length(urls.len() as u64);
        }

        let context = self.context.clone();
        let progress = self.progress.clone();
        let output = WorkerPool::new(self.context.concurrency)
            .run(urls, move |url: String| {
                let context = context.clone();
                let progress = progress.clone();
                async move {
                    let outcome = context.clone().scan_url(url.clone()).await;
                    if let Err(ref e) = outcome {
                        debug!("Abandoning {}: {}", url, e);
                    }
                    if let Some(pb) = progress {
                        pb.inc(1);
                    }
                    outcome
                }
            })
            .await;

        if let Some(e) = output.first_error() {
            trace!("First URL failure of this run: {}", e);
        }
        if let Some(ref pb) = self.progress {
            pb.finish_and_clear();
        }

        output.into_values().flatten().collect()
    }
}

impl ScanContext {
    /// Fetch one URL, extract its dependencies and probe each unique name.
    async fn scan_url(self: Arc<Self>, url: String) -> Result<Vec<Vulnerability>> {
        let content = self.http.fetch_text(&url).await?;
        let extraction = self.extractor.extract(&content, &url)?;
        let language = extraction.language;

        let dependencies = unique_dependencies(extraction.dependencies());
        if dependencies.is_empty() {
            trace!("No dependencies in {}", url);
            return Ok(Vec::new());
        }
        debug!("Checking {} {} dependencies from {}", dependencies.len(), language, url);

        let origin: Arc<str> = Arc::from(url);
        let context = self.clone();
        let output = WorkerPool::new(self.concurrency)
            .run(dependencies, move |dependency: Dependency| {
                let context = context.clone();
                let origin = origin.clone();
                async move {
                    let availability = context
                        .checker
                        .is_unclaimed(&dependency.name, dependency.language)
                        .await;
                    let vulnerability = availability.unclaimed.then(|| Vulnerability {
                        package: dependency.name,
                        status: availability.status,
                        language: dependency.language,
                        url: origin.to_string(),
                    });
                    Ok::<_, Infallible>(vulnerability)
                }
            })
            .await;

        Ok(output.into_values().flatten().collect())
    }
}

/// Trim names and drop blanks and exact duplicates, keeping first occurrence.
fn unique_dependencies<I>(dependencies: I) -> Vec<Dependency>
where
    I: IntoIterator<Item = Dependency>,
{
    let mut seen = HashSet::new();
    dependencies
        .into_iter()
        .map(|dependency| Dependency {
            name: dependency.name.trim().to_string(),
            ..dependency
        })
        .filter(|dependency| !dependency.name.is_empty() && seen.insert(dependency.name.clone()))
        .collect()
}
