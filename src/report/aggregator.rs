use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::normalize::is_placeholder;
use crate::types::{ComparisonResult, Property, ResultStatus, Viewport};

/// Row header, in output order.
pub const COLUMNS: [&str; 12] = [
    "Selector",
    "Variant",
    "Status",
    "Expected_fontFamily",
    "Actual_fontFamily",
    "Expected_fontSize",
    "Actual_fontSize",
    "Expected_lineHeight",
    "Actual_lineHeight",
    "Expected_fontWeight",
    "Actual_fontWeight",
    "Text",
];

/// Which repeated results are dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DedupPolicy {
    /// Keep every (rule, element) row
    #[default]
    None,
    /// One row per (selector, text, variant, viewport)
    SelectorTextVariant,
}

/// Fill applied to a pair of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Highlight {
    Mismatch,
    Informational,
    Unverified,
}

/// Column indexes of a property's expected/actual pair.
pub fn highlight_columns(property: Property) -> (u16, u16) {
    match property {
        Property::FontFamily => (3, 4),
        Property::FontSize => (5, 6),
        Property::LineHeight => (7, 8),
        Property::FontWeight => (9, 10),
    }
}

/// One output row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub cells: Vec<String>,
    pub status: ResultStatus,
    /// Column pairs to fill
    pub highlights: Vec<(Property, Highlight)>,
}

impl ReportRow {
    fn from_result(result: &ComparisonResult, highlight_placeholder_weight: bool) -> Self {
        let e = &result.expected;
        let a = &result.actual;
        let cells = vec![
            result.selector.clone(),
            result.variant.clone(),
            result.status.to_string(),
            e.font_family.clone(),
            a.font_family.clone(),
            e.font_size.clone(),
            a.font_size.clone(),
            e.line_height.clone(),
            a.line_height.clone(),
            e.font_weight.clone(),
            a.font_weight.clone(),
            result.text_content.clone(),
        ];

        let mut highlights: Vec<(Property, Highlight)> = match &result.status {
            ResultStatus::Mismatch(props) => {
                props.iter().map(|p| (*p, Highlight::Mismatch)).collect()
            }
            ResultStatus::NoLineHeightInGuide => {
                vec![(Property::LineHeight, Highlight::Informational)]
            }
            _ => Vec::new(),
        };
        if highlight_placeholder_weight
            && result.status != ResultStatus::SelectorNotFound
            && is_placeholder(&e.font_weight)
            && !highlights.iter().any(|(p, _)| *p == Property::FontWeight)
        {
            highlights.push((Property::FontWeight, Highlight::Unverified));
        }

        Self {
            cells,
            status: result.status.clone(),
            highlights,
        }
    }
}

/// Rows of one viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    pub viewport: Viewport,
    pub rows: Vec<ReportRow>,
}

/// Per-status row counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub matched: usize,
    pub mismatched: usize,
    pub not_found: usize,
    pub informational: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: &ResultStatus) {
        match status {
            ResultStatus::Match => self.matched += 1,
            ResultStatus::Mismatch(_) => self.mismatched += 1,
            ResultStatus::SelectorNotFound => self.not_found += 1,
            ResultStatus::NoLineHeightInGuide | ResultStatus::NoStyleGuide => {
                self.informational += 1
            }
        }
    }

    pub fn total(&self) -> usize {
        self.matched + self.mismatched + self.not_found + self.informational
    }

    pub fn merge(&mut self, other: &StatusCounts) {
        self.matched += other.matched;
        self.mismatched += other.mismatched;
        self.not_found += other.not_found;
        self.informational += other.informational;
    }
}

/// Collects results for one URL and lays them out as sheets.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    dedup: DedupPolicy,
    highlight_placeholder_weight: bool,
    sheets: IndexMap<String, (Viewport, Vec<ComparisonResult>)>,
    seen: HashSet<(String, String, String, String)>,
}

impl ResultAggregator {
    pub fn new(dedup: DedupPolicy, highlight_placeholder_weight: bool) -> Self {
        Self {
            dedup,
            highlight_placeholder_weight,
            ..Self::default()
        }
    }

    /// Adds results for `viewport`; returns how many were kept.
    pub fn add(&mut self, viewport: &Viewport, results: Vec<ComparisonResult>) -> usize {
        let (_, bucket) = self
            .sheets
            .entry(viewport.name.clone())
            .or_insert_with(|| (viewport.clone(), Vec::new()));

        let mut kept = 0;
        for result in results {
            if self.dedup == DedupPolicy::SelectorTextVariant {
                let key = (
                    result.selector.clone(),
                    result.text_content.clone(),
                    result.variant.clone(),
                    viewport.name.clone(),
                );
                if !self.seen.insert(key) {
                    continue;
                }
            }
            bucket.push(result);
            kept += 1;
        }
        kept
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for (_, results) in self.sheets.values() {
            for result in results {
                counts.record(&result.status);
            }
        }
        counts
    }

    /// Sheets widest viewport first; equal widths keep insertion order.
    pub fn finish(self) -> Vec<Sheet> {
        let highlight_weight = self.highlight_placeholder_weight;
        let mut sheets: Vec<Sheet> = self
            .sheets
            .into_values()
            .map(|(viewport, results)| Sheet {
                viewport,
                rows: results
                    .iter()
                    .map(|r| ReportRow::from_result(r, highlight_weight))
                    .collect(),
            })
            .collect();
        sheets.sort_by(|a, b| b.viewport.width.cmp(&a.viewport.width));
        sheets
    }
}
