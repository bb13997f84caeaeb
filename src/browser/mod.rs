//! Browser automation for rendering audited pages.
//!
//! Pages are driven through a long-lived Playwright helper running under Node.js. The
//! audit pipeline only sees the [`PageDriver`] trait, so it can run against a scripted
//! driver in tests.
//!
//! # Module Structure
//!
//! - [`session`] - the helper process and its request/reply protocol
//! - [`playwright`] - the helper script, availability checks and error mapping
//! - [`dom`] - conversion of raw snapshot output
//!
//! # Example
//!
//! ```no_run
//! use fontaudit_lib::{PageDriver, PageSession, SessionOptions, Viewport};
//!
//! # async fn example() -> fontaudit_lib::Result<()> {
//! let mut session = PageSession::launch(SessionOptions::default()).await?;
//! let viewport = Viewport::new("1920px", 1920, 1440);
//! session.open("https://example.com", &viewport).await?;
//! let snapshot = session.snapshot(&["h1".to_string()]).await?;
//! println!("{} nodes", snapshot.nodes.len());
//! session.close().await?;
//! # Ok(())
//! # }
//! ```

mod dom;
mod playwright;
mod session;

pub use session::{
    PageSession, SessionOptions, DEFAULT_BLOCKED_DOMAINS, DEFAULT_CAPTURE_SETTLE,
    DEFAULT_NAVIGATION_TIMEOUT, DEFAULT_PROCESS_TIMEOUT, DEFAULT_SETTLE,
};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::overlay::{OverlayBox, PlacedLabel};
use crate::types::{DomSnapshot, Viewport};
use crate::Result;

/// Parses a snapshot saved from the helper, or one this crate serialized.
pub fn parse_snapshot(json: &str) -> Result<DomSnapshot> {
    let raw: dom::RawDomSnapshot = serde_json::from_str(json)?;
    Ok(dom::convert_raw_dom(raw))
}

/// Reads a saved snapshot from `path`.
pub fn load_snapshot(path: &Path) -> Result<DomSnapshot> {
    if !path.exists() {
        return Err(crate::AuditError::Config(format!(
            "Snapshot file not found: {}",
            path.display()
        )));
    }
    parse_snapshot(&fs::read_to_string(path)?)
}

/// Outcome of navigating to a page. A failed load is not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLoad {
    pub loaded: bool,
    pub error: Option<String>,
    pub final_url: Option<String>,
}

/// What to draw and where to scroll for one capture run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRequest {
    pub overlays: Vec<OverlayBox>,
    pub labels: Vec<PlacedLabel>,
    /// Scroll offsets, top to bottom
    pub positions: Vec<f64>,
    /// Directory the viewport screenshots are written to
    pub dir: PathBuf,
    pub prefix: String,
}

/// One viewport-sized screenshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedShot {
    pub index: usize,
    /// Scroll offset the page actually reached
    pub scroll_y: f64,
    pub path: PathBuf,
}

/// A browser page the auditor can load, inspect and photograph.
///
/// Errors mean the driver itself is unusable; per-page problems are reported in the
/// returned values.
#[allow(async_fn_in_trait)]
pub trait PageDriver {
    /// Resizes to `viewport`, navigates to `url` and lets the page settle.
    async fn open(&mut self, url: &str, viewport: &Viewport) -> Result<PageLoad>;

    /// Captures the subtrees matched by `selectors` on the open page.
    async fn snapshot(&mut self, selectors: &[String]) -> Result<DomSnapshot>;

    /// Draws the overlays and labels, then screenshots each scroll position.
    async fn capture(&mut self, request: &CaptureRequest) -> Result<Vec<CapturedShot>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saved_snapshots_tolerate_missing_fields() {
        let snapshot = parse_snapshot(
            r#"{
                "documentHeight": 2400,
                "nodes": [
                    {"id": 0, "tag": "H1", "children": [7], "textContent": " Hello ",
                     "computedStyle": {"fontSize": "32px"}}
                ],
                "matches": [{"selector": "h1", "roots": [0, 3]}]
            }"#,
        )
        .unwrap();

        assert_eq!(snapshot.document_height, 2400.0);
        assert_eq!(snapshot.nodes[0].tag, "h1");
        assert!(snapshot.nodes[0].children.is_empty());
        assert_eq!(snapshot.nodes[0].text_content, "Hello");
        assert_eq!(snapshot.roots_for("h1"), &[0]);
    }

    #[test]
    fn serialized_snapshots_read_back() {
        let mut original = DomSnapshot::empty(&["p".to_string()]);
        original.client_width = 1905.0;
        let json = serde_json::to_string(&original).unwrap();
        let parsed = parse_snapshot(&json).unwrap();
        assert_eq!(parsed.client_width, 1905.0);
        assert_eq!(parsed.matches.len(), 1);
    }

    #[test]
    fn missing_snapshot_file_is_a_config_error() {
        let err = load_snapshot(Path::new("/no/such/snapshot.json")).unwrap_err();
        assert!(err.to_string().contains("Snapshot file not found"));
    }
}
