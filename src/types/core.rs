//! Geometry shared by the sampler, the overlay placer and the capture step.
//!
//! All coordinates are page-absolute CSS pixels (already offset by the scroll position
//! at the time they were measured).

use serde::{Deserialize, Serialize};

/// Rectangle bounds for an element or a label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Grows the box by `dx` on the left/right and `dy` on the top/bottom.
    pub fn expand(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x - dx,
            y: self.y - dy,
            width: self.width + 2.0 * dx,
            height: self.height + 2.0 * dy,
        }
    }

    /// Strict intersection: boxes that only touch along an edge do not intersect.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_touching_do_not_intersect() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(10.0, 0.0, 10.0, 10.0);
        let c = BoundingBox::new(0.0, 10.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn overlapping_boxes_intersect_both_ways() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 5.0, 10.0, 10.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn expand_grows_symmetrically() {
        let a = BoundingBox::new(10.0, 20.0, 30.0, 40.0).expand(2.0, 5.0);
        assert_eq!(a, BoundingBox::new(8.0, 15.0, 34.0, 50.0));
        assert_eq!(a.right(), 42.0);
        assert_eq!(a.bottom(), 65.0);
    }
}
