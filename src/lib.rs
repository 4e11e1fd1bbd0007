//! dephunt - Dependency confusion scanner for manifest and source file URLs.
//!
//! This library provides tools for detecting dependency confusion exposure by:
//! - Filtering candidate URLs down to manifests and JS/TS source files
//! - Extracting referenced package names (package.json, imports, requirement lists)
//! - Probing npm and PyPI to find names nobody has registered
//!
//! Failures are absorbed where they happen: a URL that cannot be fetched or
//! parsed, or a probe that cannot complete, never becomes a finding.
//!
//! # Example
//!
//! ```no_run
//! use dephunt::{ScanConfig, Scanner};
//!
//! #[tokio::main]
//! async fn main() {
//!     let scanner = Scanner::new(ScanConfig::default()).unwrap();
//!     let findings = scanner
//!         .scan_lines(["https://example.com/app/package.json"])
//!         .await;
//!     println!("Found {} unclaimed packages", findings.len());
//! }
//! ```

pub mod config;
pub mod discovery;
pub mod http;
pub mod notify;
pub mod parser;
pub mod pool;
pub mod registry;
pub mod scanner;
pub mod types;

pub use config::{Config, RegistryEndpoints, ScanConfig};
pub use pool::{PoolOutput, TaskError, WorkerPool};
pub use scanner::Scanner;
pub use types::{
    Availability, Dependency, DephuntError, Language, Result, UrlKind, Vulnerability,
};
