//! Target discovery.
//!
//! Filters raw input lines down to URLs that plausibly reference a
//! dependency manifest or a JS/TS source file.

pub mod classifier;

pub use classifier::{classify, filter_target_urls, looks_like_code_file};
