//! DOM snapshot types and conversion from raw helper output.

use crate::types::{BoundingBox, ComputedStyle, DomNode, DomSnapshot, SelectorMatch};

/// Raw DOM snapshot as returned by the helper's `snapshot` command.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawDomSnapshot {
    pub url: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub document_height: Option<f64>,
    #[serde(default)]
    pub viewport_height: Option<f64>,
    #[serde(default)]
    pub client_width: Option<f64>,
    #[serde(default)]
    pub nodes: Vec<RawDomNode>,
    #[serde(default)]
    pub matches: Vec<RawSelectorMatch>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawDomNode {
    pub id: usize,
    pub tag: String,
    #[serde(default)]
    pub children: Vec<usize>,
    pub own_text: Option<String>,
    pub text_content: Option<String>,
    pub bounding_box: Option<RawBoundingBox>,
    pub computed_style: Option<RawComputedStyle>,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct RawBoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawComputedStyle {
    pub font_family: Option<String>,
    pub font_size: Option<String>,
    pub font_weight: Option<String>,
    pub line_height: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct RawSelectorMatch {
    pub selector: String,
    #[serde(default)]
    pub roots: Vec<usize>,
    pub error: Option<String>,
}

/// Converts the helper's snapshot into a [`DomSnapshot`].
///
/// Child and root references to ids that were never reported are dropped.
pub(crate) fn convert_raw_dom(raw: RawDomSnapshot) -> DomSnapshot {
    let known: std::collections::HashSet<usize> = raw.nodes.iter().map(|n| n.id).collect();

    let nodes = raw
        .nodes
        .into_iter()
        .map(|node| {
            let style = node.computed_style.unwrap_or(RawComputedStyle {
                font_family: None,
                font_size: None,
                font_weight: None,
                line_height: None,
            });
            DomNode {
                id: node.id,
                tag: node.tag.to_ascii_lowercase(),
                children: node
                    .children
                    .into_iter()
                    .filter(|c| known.contains(c))
                    .collect(),
                own_text: node.own_text.unwrap_or_default().trim().to_string(),
                text_content: node.text_content.unwrap_or_default().trim().to_string(),
                bounding_box: node
                    .bounding_box
                    .map(|b| BoundingBox::new(b.x, b.y, b.width, b.height))
                    .unwrap_or_default(),
                computed_style: ComputedStyle {
                    font_family: style.font_family.unwrap_or_default(),
                    font_size: style.font_size.unwrap_or_default(),
                    font_weight: style.font_weight.unwrap_or_default(),
                    line_height: style.line_height.unwrap_or_default(),
                },
            }
        })
        .collect();

    let matches = raw
        .matches
        .into_iter()
        .map(|m| SelectorMatch {
            selector: m.selector,
            roots: m.roots.into_iter().filter(|r| known.contains(r)).collect(),
            error: m.error,
        })
        .collect();

    DomSnapshot {
        url: raw.url,
        title: raw.title,
        document_height: raw.document_height.unwrap_or_default(),
        viewport_height: raw.viewport_height.unwrap_or_default(),
        client_width: raw.client_width.unwrap_or_default(),
        nodes,
        matches,
    }
}
