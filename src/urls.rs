//! The list of pages to audit.
//!
//! Accepted shapes (JSON, or YAML for `.yaml`/`.yml` files):
//!
//! ```json
//! { "urls": [{ "name": "home", "url": "https://example.com" }] }
//! { "homepage": "https://example.com" }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;
use url::Url;

use crate::report::file_stem;

/// Name used when an entry does not provide one. Later unnamed entries get `page-2`, `page-3`, ...
pub const DEFAULT_PAGE_NAME: &str = "page";

#[derive(Debug, Error)]
pub enum UrlListError {
    #[error("URL list file not found: {0}")]
    NotFound(String),
    #[error("failed to read URL list: {0}")]
    Io(std::io::Error),
    #[error("invalid URL list: {0}")]
    Format(String),
    #[error("URL list is empty")]
    Empty,
    #[error("duplicate page name '{0}' in URL list; page names must be unique")]
    DuplicateName(String),
    #[error("invalid URL '{url}' for page '{name}': {reason}")]
    InvalidUrl {
        name: String,
        url: String,
        reason: String,
    },
}

/// One page to visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageTarget {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    name: Option<String>,
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawList {
    Urls { urls: Vec<RawEntry> },
    Homepage { homepage: String },
}

/// Reads and validates the URL list at `path`.
pub fn load_url_list(path: &Path) -> Result<Vec<PageTarget>, UrlListError> {
    if !path.exists() {
        return Err(UrlListError::NotFound(path.display().to_string()));
    }
    let raw = fs::read_to_string(path).map_err(UrlListError::Io)?;
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    let list: RawList = if is_yaml {
        serde_yaml::from_str(&raw).map_err(|e| UrlListError::Format(e.to_string()))?
    } else {
        serde_json::from_str(&raw).map_err(|e| UrlListError::Format(e.to_string()))?
    };
    targets_from(list)
}

/// Parses a URL list from a JSON string.
pub fn parse_url_list(json: &str) -> Result<Vec<PageTarget>, UrlListError> {
    let list: RawList =
        serde_json::from_str(json).map_err(|e| UrlListError::Format(e.to_string()))?;
    targets_from(list)
}

fn targets_from(list: RawList) -> Result<Vec<PageTarget>, UrlListError> {
    let entries = match list {
        RawList::Urls { urls } => urls,
        RawList::Homepage { homepage } => vec![RawEntry {
            name: None,
            url: homepage,
        }],
    };
    if entries.is_empty() {
        return Err(UrlListError::Empty);
    }

    // Names become artifact file names, so uniqueness is checked on the file stem.
    let mut taken = HashSet::new();
    let named: Vec<Option<String>> = entries
        .iter()
        .map(|entry| {
            entry
                .name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
        })
        .collect();
    for name in named.iter().flatten() {
        if !taken.insert(artifact_key(name)) {
            return Err(UrlListError::DuplicateName(name.clone()));
        }
    }

    let mut next_default = 1;
    entries
        .into_iter()
        .zip(named)
        .map(|(entry, name)| {
            let name = match name {
                Some(name) => name,
                None => loop {
                    let candidate = match next_default {
                        1 => DEFAULT_PAGE_NAME.to_string(),
                        n => format!("{DEFAULT_PAGE_NAME}-{n}"),
                    };
                    next_default += 1;
                    if taken.insert(artifact_key(&candidate)) {
                        break candidate;
                    }
                },
            };
            let url = entry.url.trim().to_string();
            Url::parse(&url).map_err(|e| UrlListError::InvalidUrl {
                name: name.clone(),
                url: url.clone(),
                reason: e.to_string(),
            })?;
            Ok(PageTarget { name, url })
        })
        .collect()
}

fn artifact_key(name: &str) -> String {
    file_stem(name).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn list_form_keeps_order_and_defaults_names() {
        let targets = parse_url_list(
            r#"{"urls": [
                {"name": "home", "url": "https://example.com"},
                {"url": " https://example.com/about "}
            ]}"#,
        )
        .unwrap();
        assert_eq!(
            targets,
            vec![
                PageTarget {
                    name: "home".into(),
                    url: "https://example.com".into()
                },
                PageTarget {
                    name: "page".into(),
                    url: "https://example.com/about".into()
                },
            ]
        );
    }

    #[test]
    fn unnamed_entries_get_distinct_names() {
        let targets = parse_url_list(
            r#"{"urls": [
                {"url": "https://a.example"},
                {"name": "page-2", "url": "https://b.example"},
                {"url": "https://c.example"},
                {"name": "  ", "url": "https://d.example"}
            ]}"#,
        )
        .unwrap();
        let names: Vec<&str> = targets.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["page", "page-2", "page-3", "page-4"]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = parse_url_list(
            r#"{"urls": [
                {"name": "home", "url": "https://a.example"},
                {"name": "Home", "url": "https://b.example"}
            ]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, UrlListError::DuplicateName(ref n) if n == "Home"));

        let err = parse_url_list(
            r#"{"urls": [
                {"name": "blog/a", "url": "https://a.example"},
                {"name": "blog:a", "url": "https://b.example"}
            ]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, UrlListError::DuplicateName(_)));
    }

    #[test]
    fn homepage_form_is_a_single_target() {
        let targets = parse_url_list(r#"{"homepage": "https://example.org"}"#).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].name, DEFAULT_PAGE_NAME);
    }

    #[test]
    fn invalid_urls_are_rejected() {
        let err = parse_url_list(r#"{"urls": [{"name": "x", "url": "not a url"}]}"#).unwrap_err();
        assert!(matches!(err, UrlListError::InvalidUrl { .. }));
    }

    #[test]
    fn empty_lists_are_rejected() {
        assert!(matches!(parse_url_list(r#"{"urls": []}"#), Err(UrlListError::Empty)));
        assert!(matches!(parse_url_list(r#"{"pages": []}"#), Err(UrlListError::Format(_))));
    }

    #[test]
    fn yaml_files_are_supported() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("urls.yaml");
        fs::write(&path, "urls:\n  - name: blog\n    url: https://example.com/blog\n").expect("write");
        let targets = load_url_list(&path).unwrap();
        assert_eq!(targets[0].name, "blog");
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_url_list(Path::new("/no/such/urls.json")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
