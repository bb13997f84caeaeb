//! DOM snapshot types for browser-captured pages.
//!
//! A snapshot only carries the subtrees of elements matched by the audited selectors,
//! which keeps the payload small on large pages. Node ids index into `nodes`.

use serde::{Deserialize, Serialize};

use super::core::BoundingBox;

/// A snapshot of the audited parts of a page at one viewport.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomSnapshot {
    /// The URL the page ended up on
    pub url: Option<String>,
    /// The page title
    pub title: Option<String>,
    /// Full scrollable document height
    #[serde(default)]
    pub document_height: f64,
    /// Inner height of the browser window
    #[serde(default)]
    pub viewport_height: f64,
    /// Document client width (excludes the scrollbar)
    #[serde(default)]
    pub client_width: f64,
    /// Flattened element nodes of every matched subtree
    #[serde(default)]
    pub nodes: Vec<DomNode>,
    /// Root elements matched by each selector, in query order
    #[serde(default)]
    pub matches: Vec<SelectorMatch>,
}

/// Elements matched by one selector.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorMatch {
    pub selector: String,
    #[serde(default)]
    pub roots: Vec<usize>,
    /// Set when the browser rejected the selector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A single element with its rendered typography.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomNode {
    pub id: usize,
    /// Lower-case tag name
    pub tag: String,
    /// Element children, in document order
    #[serde(default)]
    pub children: Vec<usize>,
    /// Trimmed direct text-node children joined by a space
    #[serde(default)]
    pub own_text: String,
    /// Trimmed `textContent`
    #[serde(default)]
    pub text_content: String,
    #[serde(default)]
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub computed_style: ComputedStyle,
}

/// The four computed font properties, as the browser reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedStyle {
    #[serde(default)]
    pub font_family: String,
    #[serde(default)]
    pub font_size: String,
    #[serde(default)]
    pub font_weight: String,
    #[serde(default)]
    pub line_height: String,
}

impl DomSnapshot {
    /// A snapshot in which every selector matched nothing.
    pub fn empty(selectors: &[String]) -> Self {
        Self {
            matches: selectors
                .iter()
                .map(|selector| SelectorMatch {
                    selector: selector.clone(),
                    ..SelectorMatch::default()
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn node(&self, id: usize) -> Option<&DomNode> {
        match self.nodes.get(id) {
            Some(node) if node.id == id => Some(node),
            _ => self.nodes.iter().find(|node| node.id == id),
        }
    }

    /// Roots matched by `selector`; empty when the selector was not queried or matched nothing.
    pub fn roots_for(&self, selector: &str) -> &[usize] {
        self.matches
            .iter()
            .find(|m| m.selector == selector)
            .map(|m| m.roots.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_deserializes_from_camel_case() {
        let json = r#"{
            "url": "https://example.com",
            "title": "Example",
            "documentHeight": 3200,
            "viewportHeight": 900,
            "clientWidth": 1425,
            "nodes": [{
                "id": 0,
                "tag": "h1",
                "ownText": "Hello",
                "textContent": "Hello",
                "boundingBox": {"x": 10, "y": 20, "width": 300, "height": 40},
                "computedStyle": {
                    "fontFamily": "Inter, Arial",
                    "fontSize": "32px",
                    "fontWeight": "700",
                    "lineHeight": "38px"
                }
            }],
            "matches": [{"selector": "h1", "roots": [0]}]
        }"#;

        let snapshot: DomSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.document_height, 3200.0);
        assert_eq!(snapshot.roots_for("h1"), &[0]);
        assert!(snapshot.roots_for("h2").is_empty());
        let node = snapshot.node(0).unwrap();
        assert_eq!(node.computed_style.font_size, "32px");
        assert!(node.children.is_empty());
    }

    #[test]
    fn node_lookup_tolerates_out_of_order_ids() {
        let snapshot = DomSnapshot {
            nodes: vec![
                DomNode {
                    id: 7,
                    tag: "p".into(),
                    ..DomNode::default()
                },
                DomNode {
                    id: 3,
                    tag: "span".into(),
                    ..DomNode::default()
                },
            ],
            ..DomSnapshot::default()
        };
        assert_eq!(snapshot.node(3).map(|n| n.tag.as_str()), Some("span"));
        assert!(snapshot.node(0).is_none());
    }

    #[test]
    fn empty_snapshot_lists_every_selector() {
        let snapshot = DomSnapshot::empty(&["h1".to_string(), "p".to_string()]);
        assert_eq!(snapshot.matches.len(), 2);
        assert!(snapshot.roots_for("p").is_empty());
    }
}
