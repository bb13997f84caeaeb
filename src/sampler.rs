//! Picking the element that represents a selector's typography.
//!
//! A matched element is often a wrapper (`<a class="card"><div><h3>..`); the style that
//! matters is that of the most prominent text inside it. The sampler walks the subtree
//! and keeps the text-bearing node with the largest font size.

use std::collections::HashSet;
use std::hash::Hash;

use crate::normalize::parse_leading_float;
use crate::types::{BoundingBox, ComputedStyle, DomSnapshot};

/// Tags that win a font-size tie against any other tag.
pub const SEMANTIC_TAGS: [&str; 11] = [
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "button", "span", "label", "strong",
];

/// Read access to a rendered element tree.
pub trait RenderTree {
    type NodeId: Copy + Eq + Hash;

    fn tag_name(&self, node: Self::NodeId) -> &str;
    fn children(&self, node: Self::NodeId) -> Vec<Self::NodeId>;
    /// Trimmed direct text children joined by a space.
    fn own_text(&self, node: Self::NodeId) -> &str;
    /// Trimmed full text content.
    fn text_content(&self, node: Self::NodeId) -> &str;
    fn computed_style(&self, node: Self::NodeId) -> &ComputedStyle;
    fn bounds(&self, node: Self::NodeId) -> BoundingBox;
}

/// The style and text chosen for one matched root.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledElement {
    pub style: ComputedStyle,
    pub text_content: String,
    /// Bounds of the matched root
    pub bounds: BoundingBox,
}

pub fn is_semantic_tag(tag: &str) -> bool {
    SEMANTIC_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

/// Picks the representative element of `root`'s subtree (root included).
pub fn select_representative<T: RenderTree>(tree: &T, root: T::NodeId) -> SampledElement {
    let mut best: Option<(T::NodeId, f64)> = None;
    let mut visited = HashSet::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if !visited.insert(node) {
            continue;
        }

        if !tree.own_text(node).trim().is_empty() {
            if let Some(size) = parse_leading_float(&tree.computed_style(node).font_size) {
                let replace = match best {
                    None => true,
                    Some((current, current_size)) => {
                        size > current_size
                            || (size == current_size
                                && is_semantic_tag(tree.tag_name(node))
                                && !is_semantic_tag(tree.tag_name(current)))
                    }
                };
                if replace {
                    best = Some((node, size));
                }
            }
        }

        // Reverse so the first child is visited first.
        let children = tree.children(node);
        stack.extend(children.into_iter().rev());
    }

    let chosen = best.map(|(node, _)| node).unwrap_or(root);
    SampledElement {
        style: tree.computed_style(chosen).clone(),
        text_content: tree.text_content(chosen).trim().to_string(),
        bounds: tree.bounds(root),
    }
}

static EMPTY_STYLE: ComputedStyle = ComputedStyle {
    font_family: String::new(),
    font_size: String::new(),
    font_weight: String::new(),
    line_height: String::new(),
};

impl RenderTree for DomSnapshot {
    type NodeId = usize;

    fn tag_name(&self, node: usize) -> &str {
        self.node(node).map(|n| n.tag.as_str()).unwrap_or_default()
    }

    fn children(&self, node: usize) -> Vec<usize> {
        self.node(node).map(|n| n.children.clone()).unwrap_or_default()
    }

    fn own_text(&self, node: usize) -> &str {
        self.node(node).map(|n| n.own_text.as_str()).unwrap_or_default()
    }

    fn text_content(&self, node: usize) -> &str {
        self.node(node)
            .map(|n| n.text_content.as_str())
            .unwrap_or_default()
    }

    fn computed_style(&self, node: usize) -> &ComputedStyle {
        self.node(node)
            .map(|n| &n.computed_style)
            .unwrap_or(&EMPTY_STYLE)
    }

    fn bounds(&self, node: usize) -> BoundingBox {
        self.node(node)
            .map(|n| n.bounding_box)
            .unwrap_or_default()
    }
}
