use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::label::{label_text, LabelMetrics};
use super::{LabelPlacementStrategy, OverlayBox, PageBounds, PlacedLabel};
use crate::types::BoundingBox;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PlacementConfig {
    pub metrics: LabelMetrics,
    /// Horizontal clearance between labels
    pub gap_x: f64,
    /// Vertical clearance between labels
    pub gap_y: f64,
    /// Distance between an element and its label
    pub offset: f64,
    /// Minimum distance from the page's left and right edges
    pub margin: f64,
    /// Downward shift per extra attempt
    pub step: f64,
    /// Extra attempts below the element after the four sides are taken
    pub extra_attempts: usize,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            metrics: LabelMetrics::default(),
            gap_x: 20.0,
            gap_y: 10.0,
            offset: 4.0,
            margin: 8.0,
            step: 100.0,
            extra_attempts: 3,
        }
    }
}

/// First-fit placement around each element, in document order.
#[derive(Debug, Clone, Default)]
pub struct GreedyPlacer {
    config: PlacementConfig,
}

impl GreedyPlacer {
    pub fn new(config: PlacementConfig) -> Self {
        Self { config }
    }

    fn candidates(&self, target: &BoundingBox, width: f64, height: f64) -> Vec<(f64, f64)> {
        let c = &self.config;
        let below = target.bottom() + c.offset;
        let mut out = vec![
            (target.x, below),
            (target.x, target.y - height - c.offset),
            (target.right() + c.gap_x, target.y),
            (target.x - width - c.gap_x, target.y),
        ];
        out.extend((1..=c.extra_attempts).map(|k| (target.x, below + k as f64 * c.step)));
        out
    }

    fn clamp(&self, left: f64, top: f64, width: f64, page: PageBounds) -> (f64, f64) {
        let margin = self.config.margin;
        let max_left = page.client_width - width - margin;
        (left.min(max_left).max(margin), top.max(0.0))
    }
}

impl LabelPlacementStrategy for GreedyPlacer {
    fn place(&self, boxes: &[OverlayBox], page: PageBounds) -> Vec<PlacedLabel> {
        let mut order: Vec<usize> = (0..boxes.len()).collect();
        order.sort_by(|&a, &b| {
            let (a, b) = (&boxes[a].bounds, &boxes[b].bounds);
            a.y.partial_cmp(&b.y)
                .unwrap_or(Ordering::Equal)
                .then(a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
        });

        let metrics = &self.config.metrics;
        let mut placed: Vec<PlacedLabel> = Vec::with_capacity(boxes.len());
        for index in order {
            let overlay = &boxes[index];
            let text = label_text(overlay);
            let width = metrics
                .width_for(&text)
                .min((page.client_width - 2.0 * self.config.margin).max(0.0));
            let height = metrics.height_for(&text, width);

            let mut chosen = None;
            let mut last = BoundingBox::default();
            for (left, top) in self.candidates(&overlay.bounds, width, height) {
                let (left, top) = self.clamp(left, top, width, page);
                let candidate = BoundingBox::new(left, top, width, height);
                last = candidate;
                let free = placed.iter().all(|label| {
                    !label
                        .bounds
                        .expand(self.config.gap_x, self.config.gap_y)
                        .intersects(&candidate)
                });
                if free {
                    chosen = Some(candidate);
                    break;
                }
            }

            let overlapping = chosen.is_none();
            if overlapping {
                log::debug!(
                    "No free label position for '{}'; placing over an existing label",
                    overlay.selector
                );
            }
            placed.push(PlacedLabel {
                box_index: index,
                bounds: chosen.unwrap_or(last),
                text,
                overlapping,
            });
        }
        placed
    }
}
