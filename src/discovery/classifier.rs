//! Target URL classification.
//!
//! Decides, from the URL string alone, whether a line plausibly points at a
//! dependency manifest or a JS/TS source file. No network access.

use crate::types::{DephuntError, Result, UrlKind};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::trace;
use url::Url;

/// Known manifest basenames, anchored to a full path segment.
static MANIFEST_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:^|/)(package\.json|package-lock\.json|yarn\.lock|pnpm-lock\.yaml|requirements\.txt|pyproject\.toml|Pipfile|Pipfile\.lock|constraints\.txt|setup\.py|composer\.json|go\.mod)(?:$|[?#/])",
    )
    .expect("manifest pattern is valid")
});

const CODE_FILE_SUFFIXES: &[&str] = &[".js", ".mjs", ".cjs", ".ts"];

/// Case-insensitive suffix check for JS/TS source files.
pub fn looks_like_code_file(path: &str) -> bool {
    let lower = path.to_lowercase();
    CODE_FILE_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix))
}

/// Whether a decoded path (plus query) names a known manifest file.
pub fn is_manifest_path(path: &str) -> bool {
    MANIFEST_PATTERN.is_match(path)
}

/// Parse an absolute http(s) URL and return its percent-decoded path+query.
pub fn target_path(raw: &str) -> Result<String> {
    let parsed = Url::parse(raw)?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(DephuntError::RejectedUrl {
            url: raw.to_string(),
            reason: "scheme is not http or https",
        });
    }

    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(DephuntError::RejectedUrl {
            url: raw.to_string(),
            reason: "empty host",
        });
    }

    let mut path = parsed.path().to_string();
    if let Some(query) = parsed.query().filter(|q| !q.is_empty()) {
        path.push('?');
        path.push_str(query);
    }

    urlencoding::decode(&path)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| DephuntError::RejectedUrl {
            url: raw.to_string(),
            reason: "path does not decode to UTF-8",
        })
}

/// Final non-empty path segment of a URL, percent-decoded, ignoring query
/// and fragment. A trailing slash does not produce an empty segment.
pub fn last_path_segment(raw: &str) -> Option<String> {
    let segment = match Url::parse(raw) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
            .map(|s| s.to_string()),
        Err(_) => raw
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').find(|s| !s.is_empty()))
            .map(|s| s.to_string()),
    }?;

    Some(match urlencoding::decode(&segment) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => segment,
    })
}

/// Classify one URL string.
pub fn classify(raw: &str) -> UrlKind {
    let path = match target_path(raw) {
        Ok(path) => path,
        Err(e) => {
            trace!("{}", e);
            return UrlKind::Rejected;
        }
    };

    if is_manifest_path(&path) {
        UrlKind::Manifest
    } else if looks_like_code_file(&path) {
        UrlKind::CodeFile
    } else {
        UrlKind::Rejected
    }
}

/// Trim, drop blanks, dedup (first occurrence wins) and keep only URLs that
/// classify as a manifest or code file. Input order is preserved.
pub fn filter_target_urls<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut accepted = Vec::new();

    for line in lines {
        let candidate = line.as_ref().trim();
        if candidate.is_empty() || seen.contains(candidate) {
            continue;
        }
        seen.insert(candidate.to_string());

        if classify(candidate) != UrlKind::Rejected {
            accepted.push(candidate.to_string());
        }
    }

    accepted
}
