//! Public registry existence checks.
//!
//! Probes the npm and PyPI lookup URLs for a package name and caches the
//! observed status for the rest of the run.

mod cache;
pub mod checker;

pub use cache::RegistryCache;
pub use checker::RegistryChecker;
