use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::normalize::PLACEHOLDER;

/// When a unitless line-height multiplier is turned into pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineHeightPolicy {
    /// Resolve against each viewport's expected font size while parsing the guide.
    /// A viewport without a font size keeps the raw multiplier, which then never matches
    /// a pixel value.
    #[default]
    ParseTime,
    /// Keep the raw multiplier and resolve it during evaluation; a viewport without an
    /// expected font size uses the rendered font size as the base.
    EvaluateTime,
}

/// Expectations of one rule at one viewport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportExpectation {
    pub font_size: String,
    pub line_height: String,
}

/// Where a rule came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleOrigin {
    #[default]
    StyleGuide,
    /// Default selector list used when the guide could not be interpreted
    Fallback,
}

/// One expected style for a selector. A selector may own several (its variants).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypographyRule {
    pub selector: String,
    pub variant: String,
    pub font_family: String,
    pub font_weight: String,
    /// Raw line height from the guide
    pub line_height: String,
    #[serde(default)]
    pub per_viewport: BTreeMap<String, ViewportExpectation>,
    #[serde(default)]
    pub origin: RuleOrigin,
}

impl TypographyRule {
    /// A rule with every expectation unset.
    pub fn unspecified(selector: impl Into<String>, variant: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            variant: variant.into(),
            font_family: PLACEHOLDER.to_string(),
            font_weight: PLACEHOLDER.to_string(),
            line_height: PLACEHOLDER.to_string(),
            per_viewport: BTreeMap::new(),
            origin: RuleOrigin::default(),
        }
    }

    /// Expected font size at `viewport`, `-` when the guide has none.
    pub fn font_size_for(&self, viewport: &str) -> &str {
        self.per_viewport
            .get(viewport)
            .map(|e| e.font_size.as_str())
            .unwrap_or(PLACEHOLDER)
    }

    /// Line height to resolve at `viewport`: the precomputed value when there is one.
    pub fn line_height_for(&self, viewport: &str) -> &str {
        self.per_viewport
            .get(viewport)
            .map(|e| e.line_height.as_str())
            .unwrap_or(self.line_height.as_str())
    }
}

/// Rules keyed by selector, in first-appearance order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    rules: IndexMap<String, Vec<TypographyRule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule as a further variant of its selector.
    pub fn push(&mut self, rule: TypographyRule) {
        self.rules.entry(rule.selector.clone()).or_default().push(rule);
    }

    pub fn get(&self, selector: &str) -> Option<&[TypographyRule]> {
        self.rules.get(selector).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[TypographyRule])> {
        self.rules
            .iter()
            .map(|(selector, rules)| (selector.as_str(), rules.as_slice()))
    }

    pub fn selectors(&self) -> Vec<String> {
        self.rules.keys().cloned().collect()
    }

    pub fn selector_count(&self) -> usize {
        self.rules.len()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
