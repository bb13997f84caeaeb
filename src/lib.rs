//! fontaudit Library
//!
//! Checks the typography a browser actually renders against a tabular style guide,
//! at every breakpoint the guide defines, and produces workbooks and annotated
//! screenshots of the differences.
//!
//! # Module Overview
//!
//! - [`guide`] - Style guide reading and parsing into a rule set
//! - [`sampler`] - Picks the element that represents a selector's typography
//! - [`evaluator`] - Compares rendered styles against rules
//! - [`overlay`] - Mismatch annotations and label placement
//! - [`capture`] - Scroll-and-stitch screenshots
//! - [`report`] - Result aggregation and workbook output
//! - [`browser`] - Playwright-backed page driver
//! - [`audit`] - The run loop over URLs and viewports
//! - [`config`] - Configuration file support
//! - [`output`] - JSON output schemas
//!
//! # Example
//!
//! ```no_run
//! use fontaudit_lib::{
//!     guide, load_url_list, AuditOptions, Auditor, Config, PageSession, RunContext,
//! };
//! use std::path::Path;
//!
//! # async fn example() -> fontaudit_lib::Result<()> {
//! let config = Config::default();
//! let loaded = guide::load(
//!     Path::new("style-guide.xlsx"),
//!     config.evaluation.policy.line_height,
//!     &config.fallback.guide(),
//! )?;
//! let ctx = RunContext::new(loaded);
//! let targets = load_url_list(Path::new("urls.json"))?;
//!
//! let session = PageSession::launch(config.session_options()).await?;
//! let mut auditor = Auditor::new(session, AuditOptions::default());
//! let report = auditor.run(&ctx, &targets).await?;
//! println!("{} mismatches", report.counts.mismatched);
//! auditor.into_driver().close().await?;
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod browser;
pub mod capture;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod guide;
pub mod normalize;
pub mod output;
pub mod overlay;
pub mod report;
pub mod sampler;
pub mod types;
pub mod urls;
pub mod viewport;

pub use audit::{
    evaluate_snapshot, AuditOptions, AuditReport, Auditor, PageReport, RunContext,
    ViewportEvaluation, ViewportSummary,
};
pub use browser::{
    load_snapshot, parse_snapshot, CaptureRequest, CapturedShot, PageDriver, PageLoad,
    PageSession, SessionOptions, DEFAULT_NAVIGATION_TIMEOUT, DEFAULT_PROCESS_TIMEOUT,
};
pub use capture::{capture_annotated, compute_scroll_positions, stitch, CaptureSettings};
pub use config::{Config, ConfigError};
pub use error::{AuditError, ErrorCategory, ErrorPayload, Result};
pub use evaluator::{evaluate, evaluate_rules, EvaluationPolicy};
pub use guide::{GuideStatus, LineHeightPolicy, RuleSet, StyleGuide, TypographyRule};
pub use output::{AuditOutput, OUTPUT_VERSION};
pub use overlay::{GreedyPlacer, LabelPlacementStrategy, OverlayBox, PlacedLabel, PlacementConfig};
pub use report::{write_workbook, DedupPolicy, ResultAggregator, StatusCounts};
pub use sampler::{select_representative, RenderTree, SampledElement};
pub use types::{BoundingBox, ComparisonResult, DomSnapshot, ResultStatus};
pub use urls::{load_url_list, parse_url_list, PageTarget, UrlListError};
pub use viewport::Viewport;
