//! Core types and errors for the dependency confusion scanner.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur during scanning.
///
/// None of these ever reach the reporter: the pipeline absorbs each one at the
/// level where it happens and moves on.
#[derive(Error, Debug)]
pub enum DephuntError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Rejected URL {url}: {reason}")]
    RejectedUrl { url: String, reason: &'static str },

    #[error("Failed to fetch {url}: {reason}")]
    FetchError { url: String, reason: String },

    #[error("Failed to extract dependencies from {url}: {reason}")]
    ExtractionError { url: String, reason: String },

    #[error("Registry probe failed for {url}: {reason}")]
    ProbeError { url: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, DephuntError>;

/// Coarse ecosystem tag attached to every extracted dependency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// npm ecosystem.
    Js,
    /// PyPI ecosystem.
    Python,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Js => "js",
            Language::Python => "python",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a candidate target URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlKind {
    /// Known manifest file name (package.json, requirements.txt, ...).
    Manifest,
    /// JavaScript/TypeScript source file.
    CodeFile,
    /// Not something we can extract dependencies from.
    Rejected,
}

/// A package name referenced by one fetched document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Dependency {
    /// Package name (e.g., "@company/pkg" or "requests").
    pub name: String,
    pub language: Language,
}

/// A package name that no public registry entry could be found for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vulnerability {
    /// The unclaimed package name.
    pub package: String,
    /// HTTP status the registry answered with.
    pub status: u16,
    pub language: Language,
    /// The manifest or source file URL the name was found in.
    pub url: String,
}

/// Result of checking one name against its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Availability {
    /// True when the registry has no entry for the name.
    pub unclaimed: bool,
    /// Observed HTTP status, or 0 when the probe itself failed.
    pub status: u16,
}

impl Availability {
    /// Classify a registry status: 200 and 302 mean the name exists.
    pub fn from_status(status: u16) -> Self {
        Self {
            unclaimed: status != 200 && status != 302,
            status,
        }
    }

    /// A probe that could not complete. Never reported as a finding.
    pub fn indeterminate() -> Self {
        Self {
            unclaimed: false,
            status: 0,
        }
    }
}

/// Configuration for HTTP requests.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub accept_invalid_certs: bool,
    pub user_agents: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            accept_invalid_certs: false,
            user_agents: vec![
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36".to_string(),
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36".to_string(),
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:130.0) Gecko/20100101 Firefox/130.0".to_string(),
            ],
        }
    }
}
