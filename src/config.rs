//! Configuration handling for the scanner.

use crate::types::{DephuntError, HttpConfig, Language, Result};
use clap::Parser;
use std::path::PathBuf;

/// Lowest and highest worker counts the pool is ever handed.
pub const MIN_CONCURRENCY: usize = 1;
pub const MAX_CONCURRENCY: usize = 100;

pub const DEFAULT_NPM_TEMPLATE: &str = "https://registry.npmjs.org/{name}/";
pub const DEFAULT_PYPI_TEMPLATE: &str = "https://pypi.org/project/{name}/";

/// Dependency confusion scanner for manifest and source file URLs.
///
/// Reads candidate URLs (one per line) from stdin or a file and reports
/// dependencies whose names are not registered on the public registry.
#[derive(Parser, Debug, Clone)]
#[command(name = "dephunt")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Number of concurrent workers per stage (clamped to 1-100)
    #[arg(
        short = 't',
        long = "threads",
        env = "DEPHUNT_THREADS",
        default_value = "20",
        allow_negative_numbers = true
    )]
    pub threads: i64,

    /// Suppress banner output
    #[arg(short, long)]
    pub silent: bool,

    /// Read URLs from this file instead of stdin
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Output findings as JSON
    #[arg(long)]
    pub json: bool,

    /// Also write JSON findings to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, env = "DEPHUNT_TIMEOUT", default_value = "30")]
    pub timeout: u64,

    /// Maximum registry probes per second (0 disables the limit)
    #[arg(long, env = "DEPHUNT_RATE_LIMIT", default_value = "0")]
    pub rate_limit: u32,

    /// Accept invalid TLS certificates when fetching
    #[arg(long)]
    pub insecure: bool,

    /// npm lookup URL template ({name} is replaced by the package)
    #[arg(long, env = "DEPHUNT_NPM_REGISTRY", default_value = DEFAULT_NPM_TEMPLATE)]
    pub npm_registry: String,

    /// PyPI lookup URL template ({name} is replaced by the package)
    #[arg(long, env = "DEPHUNT_PYPI_REGISTRY", default_value = DEFAULT_PYPI_TEMPLATE)]
    pub pypi_registry: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Worker count clamped into the range the pool accepts.
    pub fn concurrency(&self) -> usize {
        clamp_concurrency(self.threads)
    }

    /// Build the library-facing scan configuration.
    pub fn scan_config(&self) -> Result<ScanConfig> {
        let endpoints = RegistryEndpoints::new(&self.npm_registry, &self.pypi_registry)?;
        Ok(ScanConfig {
            concurrency: self.concurrency(),
            timeout: self.timeout,
            rate_limit: self.rate_limit,
            insecure: self.insecure,
            endpoints,
        })
    }
}

/// Clamp a raw thread count into `[MIN_CONCURRENCY, MAX_CONCURRENCY]`.
pub fn clamp_concurrency(raw: i64) -> usize {
    raw.clamp(MIN_CONCURRENCY as i64, MAX_CONCURRENCY as i64) as usize
}

/// Lookup URL templates, one per ecosystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEndpoints {
    npm: String,
    pypi: String,
}

impl RegistryEndpoints {
    /// Both templates must contain a `{name}` placeholder.
    pub fn new(npm: &str, pypi: &str) -> Result<Self> {
        for template in [npm, pypi] {
            if !template.contains("{name}") {
                return Err(DephuntError::ConfigError(format!(
                    "registry template '{}' is missing the {{name}} placeholder",
                    template
                )));
            }
        }
        Ok(Self {
            npm: npm.to_string(),
            pypi: pypi.to_string(),
        })
    }

    /// Lookup URL for a package. This exact string is also the cache key.
    pub fn lookup_url(&self, name: &str, language: Language) -> String {
        let template = match language {
            Language::Js => &self.npm,
            Language::Python => &self.pypi,
        };
        template.replace("{name}", name)
    }
}

impl Default for RegistryEndpoints {
    fn default() -> Self {
        Self {
            npm: DEFAULT_NPM_TEMPLATE.to_string(),
            pypi: DEFAULT_PYPI_TEMPLATE.to_string(),
        }
    }
}

/// Settings for one scan run.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Worker count used at both pool levels, already clamped.
    pub concurrency: usize,
    /// Per-call network timeout in seconds.
    pub timeout: u64,
    /// Registry probes per second; 0 means unlimited.
    pub rate_limit: u32,
    pub insecure: bool,
    pub endpoints: RegistryEndpoints,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrency: 20,
            timeout: 30,
            rate_limit: 0,
            insecure: false,
            endpoints: RegistryEndpoints::default(),
        }
    }
}

impl ScanConfig {
    /// Get HTTP configuration from scan config.
    pub fn http_config(&self) -> HttpConfig {
        HttpConfig {
            timeout_secs: self.timeout,
            accept_invalid_certs: self.insecure,
            ..HttpConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_concurrency() {
        assert_eq!(clamp_concurrency(-5), 1);
        assert_eq!(clamp_concurrency(0), 1);
        assert_eq!(clamp_concurrency(20), 20);
        assert_eq!(clamp_concurrency(100), 100);
        assert_eq!(clamp_concurrency(5000), 100);
    }

    #[test]
    fn test_default_lookup_urls() {
        let endpoints = RegistryEndpoints::default();
        assert_eq!(
            endpoints.lookup_url("left-pad", Language::Js),
            "https://registry.npmjs.org/left-pad/"
        );
        assert_eq!(
            endpoints.lookup_url("@acme/ui", Language::Js),
            "https://registry.npmjs.org/@acme/ui/"
        );
        assert_eq!(
            endpoints.lookup_url("requests", Language::Python),
            "https://pypi.org/project/requests/"
        );
    }

    #[test]
    fn test_template_requires_placeholder() {
        assert!(RegistryEndpoints::new("https://registry.npmjs.org/", DEFAULT_PYPI_TEMPLATE).is_err());
        assert!(RegistryEndpoints::new(DEFAULT_NPM_TEMPLATE, DEFAULT_PYPI_TEMPLATE).is_ok());
    }

    #[test]
    fn test_cli_parsing() {
        let config = Config::parse_from(["dephunt", "-t", "500", "--silent", "--json"]);
        assert_eq!(config.concurrency(), 100);
        assert!(config.silent);
        assert!(config.json);

        let scan = config.scan_config().unwrap();
        assert_eq!(scan.concurrency, 100);
        assert_eq!(scan.timeout, 30);
        assert_eq!(scan.endpoints, RegistryEndpoints::default());
    }
}
