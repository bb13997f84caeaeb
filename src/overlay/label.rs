use serde::{Deserialize, Serialize};

use super::OverlayBox;
use crate::normalize::is_placeholder;

/// Words of element text shown under a label.
pub const PREVIEW_WORDS: usize = 20;

/// Size model used to estimate how much room a label needs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LabelMetrics {
    pub max_width: f64,
    pub line_height: f64,
    pub char_width: f64,
    pub padding_x: f64,
    pub padding_y: f64,
}

impl Default for LabelMetrics {
    fn default() -> Self {
        Self {
            max_width: 450.0,
            line_height: 16.0,
            char_width: 7.0,
            padding_x: 10.0,
            padding_y: 6.0,
        }
    }
}

impl LabelMetrics {
    fn chars_per_line(&self, width: f64) -> usize {
        let usable = (width.min(self.max_width) - 2.0 * self.padding_x).max(self.char_width);
        ((usable / self.char_width.max(1.0)).floor() as usize).max(1)
    }

    /// Label width: the longest line, capped at `max_width`.
    pub fn width_for(&self, text: &str) -> f64 {
        let longest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        (longest as f64 * self.char_width + 2.0 * self.padding_x).min(self.max_width)
    }

    /// Height after wrapping `text` inside a label `width` wide (at most `max_width`).
    pub fn height_for(&self, text: &str, width: f64) -> f64 {
        let per_line = self.chars_per_line(width);
        let lines: usize = text
            .lines()
            .map(|line| line.chars().count().div_ceil(per_line).max(1))
            .sum::<usize>()
            .max(1);
        lines as f64 * self.line_height + 2.0 * self.padding_y
    }
}

/// `Mismatch: h1 (Hero) [font-size: expected 32px, actual 30px]` followed by a preview line.
pub fn label_text(overlay: &OverlayBox) -> String {
    let details: Vec<String> = overlay
        .mismatch_details
        .iter()
        .filter(|d| !is_placeholder(&d.expected))
        .map(|d| format!("{}: expected {}, actual {}", d.property, d.expected, d.actual))
        .collect();

    let mut text = format!("Mismatch: {}", overlay.selector);
    if !is_placeholder(&overlay.variant) {
        text.push_str(&format!(" ({})", overlay.variant));
    }
    text.push_str(&format!(" [{}]", details.join(", ")));

    let preview = preview_words(&overlay.text_preview, PREVIEW_WORDS);
    if !preview.is_empty() {
        text.push_str("\nPreview: ");
        text.push_str(&preview);
    }
    text
}

fn preview_words(text: &str, words: usize) -> String {
    text.split_whitespace()
        .take(words)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoundingBox, MismatchDetail, Property};

    fn overlay(variant: &str, text: &str) -> OverlayBox {
        OverlayBox {
            bounds: BoundingBox::new(0.0, 0.0, 100.0, 20.0),
            selector: "h1".into(),
            variant: variant.into(),
            mismatch_details: vec![
                MismatchDetail {
                    property: Property::FontSize,
                    expected: "32px".into(),
                    actual: "30px".into(),
                },
                MismatchDetail {
                    property: Property::FontWeight,
                    expected: "-".into(),
                    actual: "400".into(),
                },
            ],
            text_preview: text.into(),
        }
    }

    #[test]
    fn label_lists_only_specified_properties() {
        let text = label_text(&overlay("Hero", "Hello   world"));
        assert_eq!(
            text,
            "Mismatch: h1 (Hero) [font-size: expected 32px, actual 30px]\nPreview: Hello world"
        );
    }

    #[test]
    fn placeholder_variant_and_empty_preview_are_omitted() {
        let text = label_text(&overlay("-", ""));
        assert_eq!(text, "Mismatch: h1 [font-size: expected 32px, actual 30px]");
    }

    #[test]
    fn preview_keeps_twenty_words() {
        let long: Vec<String> = (0..30).map(|i| format!("w{i}")).collect();
        let text = label_text(&overlay("-", &long.join(" ")));
        assert!(text.ends_with("w19"));
    }

    #[test]
    fn height_grows_with_wrapped_lines() {
        let metrics = LabelMetrics::default();
        let one = metrics.height_for("short", metrics.max_width);
        let many = metrics.height_for(&"x".repeat(200), metrics.max_width);
        assert_eq!(one, 28.0);
        assert_eq!(many, 4.0 * 16.0 + 12.0);
        assert_eq!(metrics.height_for("a\nb", metrics.max_width), 2.0 * 16.0 + 12.0);
    }

    #[test]
    fn narrow_labels_wrap_onto_more_lines() {
        let metrics = LabelMetrics::default();
        let text = "x".repeat(97);
        // 61 characters per line at full width, 48 at a 359px label.
        assert_eq!(metrics.height_for(&text, metrics.max_width), 2.0 * 16.0 + 12.0);
        assert_eq!(metrics.height_for(&text, 359.0), 3.0 * 16.0 + 12.0);
        assert_eq!(metrics.height_for(&text, 900.0), metrics.height_for(&text, 450.0));
    }

    #[test]
    fn width_is_capped() {
        let metrics = LabelMetrics::default();
        assert_eq!(metrics.width_for("abc"), 41.0);
        assert_eq!(metrics.width_for(&"x".repeat(500)), 450.0);
    }
}
