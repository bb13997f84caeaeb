//! Comparing rendered typography against guide rules.
//!
//! Every (rule, sampled element) pair yields one [`ComparisonResult`]. Properties whose
//! expectation is `-` are skipped, so they can never fail.

use serde::{Deserialize, Serialize};

use crate::guide::{LineHeightPolicy, RuleOrigin, RuleSet, TypographyRule};
use crate::normalize::{
    calculate_line_height, is_placeholder, normalize_font_size, normalize_font_weight,
};
use crate::sampler::{select_representative, RenderTree, SampledElement};
use crate::types::{
    ComparisonResult, ComputedStyle, DomSnapshot, MismatchDetail, Property, ResultStatus, TypographyValues,
    NOT_FOUND,
};

/// Knobs that change how results are judged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EvaluationPolicy {
    pub line_height: LineHeightPolicy,
    /// Report otherwise matching rules without a line height as "No Line Height in Guide"
    pub flag_missing_line_height: bool,
    /// Characters of element text kept in results
    pub text_preview_chars: usize,
    /// Selectors mentioning `iframe` cannot reach cross-frame content
    pub skip_iframe_selectors: bool,
}

impl Default for EvaluationPolicy {
    fn default() -> Self {
        Self {
            line_height: LineHeightPolicy::default(),
            flag_missing_line_height: false,
            text_preview_chars: 100,
            skip_iframe_selectors: true,
        }
    }
}

impl EvaluationPolicy {
    pub fn skips(&self, selector: &str) -> bool {
        self.skip_iframe_selectors && selector.to_ascii_lowercase().contains("iframe")
    }
}

/// Values the rule expects at `viewport`, normalized for reporting.
pub fn expected_values(
    rule: &TypographyRule,
    viewport: &str,
    actual_font_size: Option<&str>,
    policy: &EvaluationPolicy,
) -> TypographyValues {
    let font_size = normalize_font_size(rule.font_size_for(viewport));
    let base = match (policy.line_height, actual_font_size) {
        (LineHeightPolicy::EvaluateTime, Some(actual)) if is_placeholder(&font_size) => {
            actual.to_string()
        }
        _ => font_size.clone(),
    };
    TypographyValues {
        font_family: rule.font_family.clone(),
        font_size,
        font_weight: normalize_font_weight(&rule.font_weight),
        line_height: calculate_line_height(rule.line_height_for(viewport), &base),
    }
}

/// Rendered values in the same form as the expectations they are compared with.
pub fn actual_values(style: &ComputedStyle) -> TypographyValues {
    TypographyValues {
        font_family: style.font_family.clone(),
        font_size: normalize_font_size(&style.font_size),
        font_weight: normalize_font_weight(&style.font_weight),
        line_height: calculate_line_height(&style.line_height, &style.font_size),
    }
}

/// Compares one sampled element against one rule.
pub fn evaluate(
    rule: &TypographyRule,
    viewport: &str,
    element: &SampledElement,
    policy: &EvaluationPolicy,
) -> ComparisonResult {
    let style = &element.style;
    let expected = expected_values(rule, viewport, Some(&style.font_size), policy);
    let actual = actual_values(style);

    let mut details = Vec::new();
    for property in Property::all() {
        let wanted = expected.get(property);
        if is_placeholder(wanted) {
            continue;
        }
        let observed = actual.get(property).to_string();
        let matches = match property {
            Property::FontFamily => observed.to_lowercase().contains(&wanted.to_lowercase()),
            _ => observed == wanted,
        };
        if !matches {
            details.push(MismatchDetail {
                property,
                expected: wanted.to_string(),
                actual: observed,
            });
        }
    }

    let status = if !details.is_empty() {
        ResultStatus::Mismatch(details.iter().map(|d| d.property).collect())
    } else if rule.origin == RuleOrigin::Fallback {
        ResultStatus::NoStyleGuide
    } else if policy.flag_missing_line_height && is_placeholder(&rule.line_height) {
        ResultStatus::NoLineHeightInGuide
    } else {
        ResultStatus::Match
    };

    ComparisonResult {
        selector: rule.selector.clone(),
        variant: rule.variant.clone(),
        viewport: viewport.to_string(),
        status,
        expected,
        actual,
        text_content: preview(&element.text_content, policy.text_preview_chars),
        mismatch_details: details,
        bounds: Some(element.bounds),
    }
}

/// The row recorded for a rule whose selector matched nothing.
pub fn not_found(
    rule: &TypographyRule,
    viewport: &str,
    policy: &EvaluationPolicy,
) -> ComparisonResult {
    ComparisonResult {
        selector: rule.selector.clone(),
        variant: rule.variant.clone(),
        viewport: viewport.to_string(),
        status: ResultStatus::SelectorNotFound,
        expected: expected_values(rule, viewport, None, policy),
        actual: TypographyValues::filled(NOT_FOUND),
        text_content: String::new(),
        mismatch_details: Vec::new(),
        bounds: None,
    }
}

/// Evaluates every rule of a selector against every matched root, rule-major.
pub fn evaluate_selector<T: RenderTree>(
    tree: &T,
    rules: &[TypographyRule],
    roots: &[T::NodeId],
    viewport: &str,
    policy: &EvaluationPolicy,
) -> Vec<ComparisonResult> {
    if roots.is_empty() {
        return rules
            .iter()
            .map(|rule| not_found(rule, viewport, policy))
            .collect();
    }

    let samples: Vec<SampledElement> = roots
        .iter()
        .map(|root| select_representative(tree, *root))
        .collect();
    rules
        .iter()
        .flat_map(|rule| {
            samples
                .iter()
                .map(move |sample| evaluate(rule, viewport, sample, policy))
        })
        .collect()
}

/// Evaluates a whole rule set against a page snapshot, in rule-set order.
pub fn evaluate_rules(
    rules: &RuleSet,
    snapshot: &DomSnapshot,
    viewport: &str,
    policy: &EvaluationPolicy,
) -> Vec<ComparisonResult> {
    let mut results = Vec::new();
    for (selector, selector_rules) in rules.iter() {
        if policy.skips(selector) {
            log::debug!("Skipping selector '{}': iframe content is not reachable", selector);
            continue;
        }
        if let Some(err) = snapshot
            .matches
            .iter()
            .find(|m| m.selector == selector)
            .and_then(|m| m.error.as_deref())
        {
            log::warn!("Selector '{}' was rejected by the browser: {}", selector, err);
        }
        results.extend(evaluate_selector(
            snapshot,
            selector_rules,
            snapshot.roots_for(selector),
            viewport,
            policy,
        ));
    }
    results
}

fn preview(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((idx, _)) => trimmed[..idx].to_string(),
        None => trimmed.to_string(),
    }
}
