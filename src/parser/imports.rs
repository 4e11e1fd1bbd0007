//! Import statement analysis for JS/TS source text.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;
use tracing::trace;

/// `require("x")` or `import ... from "x"` / `import "x"`.
static IMPORT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:require\(\s*['"]([^'"]+)['"]\s*\))|(?:import\s+(?:.+?\s+from\s+)?['"]([^'"]+)['"])"#,
    )
    .expect("import pattern is valid")
});

/// Scoped package tokens anywhere in the text, e.g. `@acme/design-system`.
/// ASCII word characters only; npm names cannot contain anything else.
static SCOPED_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+").expect("scoped pattern is valid")
});

/// Parser for package references in JavaScript source.
#[derive(Clone, Default)]
pub struct ImportParser;

impl ImportParser {
    pub fn new() -> Self {
        Self
    }

    /// Extract candidate package names, sorted and deduplicated.
    pub fn extract(&self, content: &str) -> BTreeSet<String> {
        let mut packages = BTreeSet::new();

        for m in SCOPED_PATTERN.find_iter(content) {
            // `./@scope/x` or `/node_modules/@scope/x` style paths are not
            // standalone package references.
            let preceding = content[..m.start()].chars().next_back();
            if matches!(preceding, Some('.') | Some('/')) {
                trace!("Skipping path-embedded scope: {}", m.as_str());
                continue;
            }
            // A match cut short by a non-ASCII letter is a fragment, not a name.
            let following = content[m.end()..].chars().next();
            if following.is_some_and(|c| !c.is_ascii() && c.is_alphanumeric()) {
                trace!("Skipping truncated scope: {}", m.as_str());
                continue;
            }
            packages.insert(m.as_str().to_string());
        }

        for caps in IMPORT_PATTERN.captures_iter(content) {
            let Some(specifier) = caps.get(1).or_else(|| caps.get(2)) else {
                continue;
            };
            let specifier = specifier.as_str().trim();
            if is_registry_specifier(specifier) {
                packages.insert(specifier.to_string());
            }
        }

        packages
    }
}

/// Relative paths, absolute paths and remote/VCS references never resolve
/// against a public registry.
fn is_registry_specifier(specifier: &str) -> bool {
    if specifier.is_empty() || specifier.starts_with('.') || specifier.starts_with('/') {
        return false;
    }

    let lower = specifier.to_lowercase();
    !(lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("git+"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(content: &str) -> Vec<String> {
        ImportParser::new().extract(content).into_iter().collect()
    }

    #[test]
    fn test_import_and_relative_require() {
        assert_eq!(
            names("import foo from 'lodash'; const bar = require('./local');"),
            vec!["lodash"]
        );
    }

    #[test]
    fn test_parse_require() {
        let content = r#"
            const express = require("express");
            const x = require( 'internal-auth' );
        "#;
        assert_eq!(names(content), vec!["express", "internal-auth"]);
    }

    #[test]
    fn test_side_effect_and_named_imports() {
        let content = r#"
            import "core-js/stable";
            import { render } from "react-dom";
            import * as api from '@acme/api-client';
        "#;
        assert_eq!(
            names(content),
            vec!["@acme/api-client", "core-js/stable", "react-dom"]
        );
    }

    #[test]
    fn test_skip_remote_and_absolute_imports() {
        let content = r#"
            import a from "https://cdn.example.com/a.js";
            import b from "HTTP://cdn.example.com/b.js";
            const c = require("git+https://github.com/acme/c.git");
            const d = require("/abs/path");
            import e from "../parent";
        "#;
        assert!(names(content).is_empty());
    }

    #[test]
    fn test_scoped_tokens_outside_imports() {
        let content = r#"var deps = {"@corp/logger": "1.0.0"}; // see @corp/metrics"#;
        assert_eq!(names(content), vec!["@corp/logger", "@corp/metrics"]);
    }

    #[test]
    fn test_scoped_token_in_path_rejected() {
        let content = r#"var p = "./node_modules/@corp/logger/index.js"; var q = "x.@corp/y";"#;
        assert!(names(content).is_empty());
    }

    #[test]
    fn test_scoped_tokens_are_ascii_only() {
        let content = r#"var a = "@café/ui"; var b = "@corp/loggér"; var c = "@corp/logger";"#;
        assert_eq!(names(content), vec!["@corp/logger"]);
    }

    #[test]
    fn test_results_sorted_and_deduplicated() {
        let content = r#"
            const b = require("zeta");
            import a from "alpha";
            const again = require("zeta");
        "#;
        assert_eq!(names(content), vec!["alpha", "zeta"]);
    }
}
