//! Style guide loading.
//!
//! The guide is a sheet whose header row names the selector column, one column per
//! resolution (`1920px`, `768px`, ...) and optional family/weight/line-height/variant
//! columns. A sheet that cannot be interpreted is not fatal: the run falls back to a
//! default selector list with no expectations so the page is still inventoried.

mod parser;
mod rules;
mod source;

pub use parser::{parse, parse_with_policy, FormatError, StyleGuide};
pub use rules::{LineHeightPolicy, RuleOrigin, RuleSet, TypographyRule, ViewportExpectation};
pub use source::{read_rows, Cell};

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::viewport::Viewport;
use crate::Result;

/// Selectors audited when the guide cannot be interpreted.
pub const DEFAULT_FALLBACK_SELECTORS: [&str; 9] =
    ["h1", "h2", "h3", "h4", "h5", "h6", "p", "button", ".subtitle"];

/// Where the rules of a run came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum GuideStatus {
    Parsed,
    Fallback { reason: String },
}

impl GuideStatus {
    pub fn is_fallback(&self) -> bool {
        matches!(self, GuideStatus::Fallback { .. })
    }
}

/// Fallback selectors and breakpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackGuide {
    pub selectors: Vec<String>,
    pub viewports: Vec<Viewport>,
}

/// A guide ready to drive a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedGuide {
    pub guide: StyleGuide,
    pub status: GuideStatus,
}

/// Builds rules with every expectation unset for `selectors`.
pub fn fallback_rules(selectors: &[String]) -> RuleSet {
    let mut rules = RuleSet::new();
    for selector in selectors {
        let mut rule = TypographyRule::unspecified(selector.trim().to_lowercase(), "-");
        rule.origin = RuleOrigin::Fallback;
        rules.push(rule);
    }
    rules
}

/// Reads and parses the guide at `path`.
///
/// Read failures are returned as errors. Format errors are logged and replaced by the
/// fallback guide.
pub fn load(
    path: &Path,
    policy: LineHeightPolicy,
    fallback: &FallbackGuide,
) -> Result<LoadedGuide> {
    let rows = read_rows(path)?;
    Ok(resolve(&rows, policy, fallback))
}

/// Parses `rows`, substituting the fallback guide on a format error.
pub fn resolve(rows: &[Vec<Cell>], policy: LineHeightPolicy, fallback: &FallbackGuide) -> LoadedGuide {
    match parse_with_policy(rows, policy) {
        Ok(guide) => LoadedGuide {
            guide,
            status: GuideStatus::Parsed,
        },
        Err(err) => {
            log::warn!(
                "Style guide could not be interpreted ({}); auditing default selectors {:?}",
                err,
                fallback.selectors
            );
            LoadedGuide {
                guide: StyleGuide {
                    rules: fallback_rules(&fallback.selectors),
                    viewports: fallback.viewports.clone(),
                },
                status: GuideStatus::Fallback {
                    reason: err.to_string(),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fallback() -> FallbackGuide {
        FallbackGuide {
            selectors: vec!["h1".into(), ".Subtitle".into()],
            viewports: vec![Viewport::new("1920px", 1920, 1440)],
        }
    }

    #[test]
    fn format_error_falls_back_to_default_selectors() {
        let rows = vec![vec![Cell::from("Selector"), Cell::from("Font Family")]];
        let loaded = resolve(&rows, LineHeightPolicy::ParseTime, &fallback());

        assert!(loaded.status.is_fallback());
        assert_eq!(loaded.guide.rules.selectors(), vec!["h1", ".subtitle"]);
        assert_eq!(loaded.guide.viewports.len(), 1);
        let rule = &loaded.guide.rules.get("h1").unwrap()[0];
        assert_eq!(rule.origin, RuleOrigin::Fallback);
        assert_eq!(rule.font_size_for("1920px"), "-");
    }

    #[test]
    fn parsed_guide_is_not_fallback() {
        let rows = vec![
            vec![Cell::from("Selector"), Cell::from("1920px")],
            vec![Cell::from("h1"), Cell::Number(32.0)],
        ];
        let loaded = resolve(&rows, LineHeightPolicy::ParseTime, &fallback());
        assert_eq!(loaded.status, GuideStatus::Parsed);
    }

    #[test]
    fn unreadable_guide_is_fatal() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").expect("write");
        assert!(load(&path, LineHeightPolicy::ParseTime, &fallback()).is_err());
    }

    #[test]
    fn json_guide_loads_end_to_end() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("guide.json");
        fs::write(
            &path,
            r#"[["Selector","1920px","Font Family","Font Weight","Line Height"],
                ["h1","32","Inter","700","1.2"]]"#,
        )
        .expect("write");
        let loaded = load(&path, LineHeightPolicy::ParseTime, &fallback()).unwrap();
        let rule = &loaded.guide.rules.get("h1").unwrap()[0];
        assert_eq!(rule.line_height_for("1920px"), "38px");
    }
}
