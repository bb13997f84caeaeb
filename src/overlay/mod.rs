//! Annotation overlays for mismatching elements.
//!
//! Every mismatch gets a red outline over its element and a text label nearby. Labels
//! are placed by a [`LabelPlacementStrategy`] before capture so the browser helper only
//! has to draw them.

mod greedy;
mod label;

pub use greedy::{GreedyPlacer, PlacementConfig};
pub use label::{label_text, LabelMetrics, PREVIEW_WORDS};

use serde::{Deserialize, Serialize};

use crate::types::{BoundingBox, ComparisonResult, MismatchDetail};

/// A mismatching element to outline, in page-absolute pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayBox {
    pub bounds: BoundingBox,
    pub selector: String,
    pub variant: String,
    pub mismatch_details: Vec<MismatchDetail>,
    pub text_preview: String,
}

/// A label position chosen for one overlay box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedLabel {
    /// Index of the box in the input slice
    pub box_index: usize,
    pub bounds: BoundingBox,
    pub text: String,
    /// Every candidate collided; committed at the last one tried
    pub overlapping: bool,
}

/// Page geometry labels must fit in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageBounds {
    /// `documentElement.clientWidth`
    pub client_width: f64,
    pub document_height: f64,
}

pub trait LabelPlacementStrategy {
    /// Returns one label per box. Labels are never dropped.
    fn place(&self, boxes: &[OverlayBox], page: PageBounds) -> Vec<PlacedLabel>;
}

/// Overlay boxes for every mismatching result that has element bounds.
pub fn overlay_boxes(results: &[ComparisonResult]) -> Vec<OverlayBox> {
    results
        .iter()
        .filter(|r| r.status.is_mismatch())
        .filter_map(|r| {
            r.bounds.map(|bounds| OverlayBox {
                bounds,
                selector: r.selector.clone(),
                variant: r.variant.clone(),
                mismatch_details: r.mismatch_details.clone(),
                text_preview: r.text_content.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Property, ResultStatus, TypographyValues};

    fn result(status: ResultStatus, bounds: Option<BoundingBox>) -> ComparisonResult {
        ComparisonResult {
            selector: "h1".into(),
            variant: "-".into(),
            viewport: "1920px".into(),
            status,
            expected: TypographyValues::filled("-"),
            actual: TypographyValues::filled("-"),
            text_content: "Hello".into(),
            mismatch_details: Vec::new(),
            bounds,
        }
    }

    #[test]
    fn only_located_mismatches_become_boxes() {
        let bounds = Some(BoundingBox::new(1.0, 2.0, 3.0, 4.0));
        let results = vec![
            result(ResultStatus::Match, bounds),
            result(ResultStatus::Mismatch(vec![Property::FontSize]), bounds),
            result(ResultStatus::Mismatch(vec![Property::FontSize]), None),
            result(ResultStatus::NoLineHeightInGuide, bounds),
        ];
        let boxes = overlay_boxes(&results);
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].text_preview, "Hello");
    }
}
