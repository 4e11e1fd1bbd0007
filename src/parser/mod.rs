//! Dependency extraction.
//!
//! Turns a fetched document into a set of candidate package names plus the
//! ecosystem they belong to:
//! - `package.json` manifests (dependencies + devDependencies, npm)
//! - JS/TS source files (import/require analysis, npm)
//! - everything else as a requirements-style list (PyPI)

pub mod imports;
pub mod manifest;

pub use imports::ImportParser;

use crate::discovery::classifier::{last_path_segment, looks_like_code_file, target_path};
use crate::types::{Dependency, Language, Result};
use std::collections::BTreeSet;
use tracing::debug;

/// Names found in one document, sorted and deduplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub names: BTreeSet<String>,
    pub language: Language,
}

impl Extraction {
    pub fn dependencies(&self) -> impl Iterator<Item = Dependency> + '_ {
        self.names.iter().map(|name| Dependency {
            name: name.clone(),
            language: self.language,
        })
    }
}

/// Picks the right parser for a document based on its URL.
#[derive(Clone, Default)]
pub struct DependencyExtractor {
    import_parser: ImportParser,
}

impl DependencyExtractor {
    pub fn new() -> Self {
        Self {
            import_parser: ImportParser::new(),
        }
    }

    /// Extract dependencies from `content` fetched from `url`.
    ///
    /// Only a malformed `package.json` is an error; every other document
    /// yields a (possibly empty) name set.
    pub fn extract(&self, content: &str, url: &str) -> Result<Extraction> {
        let is_package_json = last_path_segment(url)
            .is_some_and(|segment| segment.eq_ignore_ascii_case("package.json"));

        if is_package_json {
            let names = manifest::parse_package_json(content, url)?;
            debug!("package.json {}: {} dependencies", url, names.len());
            return Ok(Extraction {
                names,
                language: Language::Js,
            });
        }

        let is_code_file = target_path(url)
            .map(|path| looks_like_code_file(&path))
            .unwrap_or_else(|_| looks_like_code_file(url));

        if is_code_file {
            let names = self.import_parser.extract(content);
            if !names.is_empty() {
                debug!("Source file {}: {} imports", url, names.len());
                return Ok(Extraction {
                    names,
                    language: Language::Js,
                });
            }
            debug!("No imports in {}, reading it as a requirement list", url);
        }

        let names = manifest::parse_requirement_list(content);
        debug!("Requirement list {}: {} entries", url, names.len());
        Ok(Extraction {
            names,
            language: Language::Python,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DephuntError;

    fn extract(content: &str, url: &str) -> Extraction {
        DependencyExtractor::new().extract(content, url).unwrap()
    }

    fn names(extraction: &Extraction) -> Vec<&str> {
        extraction.names.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_package_json_url() {
        let ex = extract(
            r#"{"dependencies":{"left-pad":"^1.0.0"},"devDependencies":{"mocha":"^9"}}"#,
            "https://example.com/app/package.json",
        );
        assert_eq!(ex.language, Language::Js);
        assert_eq!(names(&ex), vec!["left-pad", "mocha"]);
    }

    #[test]
    fn test_package_json_case_insensitive_with_query() {
        let ex = extract(
            r#"{"dependencies":{"internal-sdk":"1"}}"#,
            "https://example.com/Package.JSON?raw=true",
        );
        assert_eq!(ex.language, Language::Js);
        assert_eq!(names(&ex), vec!["internal-sdk"]);
    }

    #[test]
    fn test_package_json_trailing_slash_and_encoded_name() {
        let content = "{\n  \"dependencies\": {\n    \"left-pad\": \"^1.3.0\"\n  }\n}\n";
        for url in [
            "https://example.com/app/package.json/",
            "https://example.com/app/package%2Ejson",
        ] {
            let ex = extract(content, url);
            assert_eq!(ex.language, Language::Js, "{}", url);
            assert_eq!(names(&ex), vec!["left-pad"], "{}", url);
        }
    }

    #[test]
    fn test_malformed_package_json_is_extraction_error() {
        let result = DependencyExtractor::new().extract("<html>", "https://example.com/package.json");
        assert!(matches!(result, Err(DephuntError::ExtractionError { .. })));
    }

    #[test]
    fn test_code_file_url() {
        let ex = extract(
            "import foo from 'lodash'; const bar = require('./local');",
            "https://cdn.example.com/static/app.js",
        );
        assert_eq!(ex.language, Language::Js);
        assert_eq!(names(&ex), vec!["lodash"]);
    }

    #[test]
    fn test_code_file_without_imports_falls_back() {
        let ex = extract("console.log(1)\n", "https://cdn.example.com/app.ts");
        assert_eq!(ex.language, Language::Python);
        assert_eq!(names(&ex), vec!["console.log(1)"]);
    }

    #[test]
    fn test_requirement_list_url() {
        let ex = extract(
            "requests==2.31.0\n# comment\n\nflask>=2.0\n",
            "https://example.com/requirements.txt",
        );
        assert_eq!(ex.language, Language::Python);
        assert_eq!(names(&ex), vec!["flask", "requests"]);
    }

    #[test]
    fn test_dependencies_carry_language() {
        let ex = extract("requests\n", "https://example.com/constraints.txt");
        let deps: Vec<Dependency> = ex.dependencies().collect();
        assert_eq!(
            deps,
            vec![Dependency {
                name: "requests".to_string(),
                language: Language::Python
            }]
        );
    }
}
