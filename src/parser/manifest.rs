//! Manifest parsers: `package.json` and line-oriented requirement lists.

use crate::types::{DephuntError, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

/// The two dependency tables of a `package.json`.
#[derive(Debug, Deserialize)]
struct PackageJson {
    dependencies: Option<BTreeMap<String, String>>,
    #[serde(rename = "devDependencies")]
    dev_dependencies: Option<BTreeMap<String, String>>,
}

/// Names from `dependencies` and `devDependencies`.
pub fn parse_package_json(content: &str, url: &str) -> Result<BTreeSet<String>> {
    let manifest: PackageJson =
        serde_json::from_str(content).map_err(|e| DephuntError::ExtractionError {
            url: url.to_string(),
            reason: format!("invalid package.json: {}", e),
        })?;

    Ok(manifest
        .dependencies
        .into_iter()
        .chain(manifest.dev_dependencies)
        .flat_map(BTreeMap::into_keys)
        .collect())
}

/// Characters that end a package name in a requirement line.
fn is_requirement_delimiter(c: char) -> bool {
    matches!(c, '<' | '>' | '=' | '!' | '~' | '[' | ']' | ';') || c.is_whitespace()
}

/// Leading package tokens of a requirements-style list.
///
/// Blank lines and `#` comments are skipped; everything from the first
/// version/extra/marker delimiter onward is dropped.
pub fn parse_requirement_list(content: &str) -> BTreeSet<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let name = line.split(is_requirement_delimiter).next()?.trim();
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_json_both_tables() {
        let content = r#"{"dependencies":{"left-pad":"^1.0.0"},"devDependencies":{"mocha":"^9"}}"#;
        let names = parse_package_json(content, "https://example.com/package.json").unwrap();
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["left-pad", "mocha"]);
    }

    #[test]
    fn test_package_json_missing_or_null_tables() {
        let names = parse_package_json(r#"{"name":"app","version":"1.0.0"}"#, "u").unwrap();
        assert!(names.is_empty());

        let names = parse_package_json(
            r#"{"dependencies":null,"devDependencies":{"@acme/build":"1.2.3"}}"#,
            "u",
        )
        .unwrap();
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["@acme/build"]);
    }

    #[test]
    fn test_package_json_overlapping_names_deduplicated() {
        let content = r#"{"dependencies":{"react":"18"},"devDependencies":{"react":"18"}}"#;
        assert_eq!(parse_package_json(content, "u").unwrap().len(), 1);
    }

    #[test]
    fn test_malformed_package_json() {
        for content in ["not json", r#"{"dependencies": ["a", "b"]}"#, r#"{"dependencies":{"a":1}}"#] {
            assert!(matches!(
                parse_package_json(content, "u"),
                Err(DephuntError::ExtractionError { .. })
            ));
        }
    }

    #[test]
    fn test_requirement_list() {
        let names = parse_requirement_list("requests==2.31.0\n# comment\n\nflask>=2.0\n");
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["flask", "requests"]);
    }

    #[test]
    fn test_requirement_delimiters() {
        let content = "\
            uvicorn[standard]~=0.23\n\
            django!=4.0 ; python_version > '3.8'\n\
            numpy<2\n\
            \tpandas\n\
            internal_tools @ git+https://example.com/tools.git\n\
            ## header\n\
            =1.0\n";
        let names: Vec<_> = parse_requirement_list(content).into_iter().collect();
        assert_eq!(
            names,
            vec!["django", "internal_tools", "numpy", "pandas", "uvicorn"]
        );
    }
}
