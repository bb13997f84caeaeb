//! The audit run: every URL at every viewport, one page at a time.
//!
//! For each (URL, viewport) the page is opened, the audited selectors are snapshotted,
//! the snapshot is evaluated against the rule set, mismatches are annotated and
//! captured, and the rows are collected. Each URL's workbook is written once all of its
//! viewports are done.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::browser::PageDriver;
use crate::capture::{capture_annotated, CaptureSettings};
use crate::evaluator::{evaluate_rules, EvaluationPolicy};
use crate::guide::{GuideStatus, LoadedGuide, RuleSet};
use crate::overlay::{
    overlay_boxes, GreedyPlacer, LabelPlacementStrategy, OverlayBox, PageBounds,
    PlacementConfig,
};
use crate::report::{
    screenshot_path, workbook_path, write_workbook, DedupPolicy, ResultAggregator, StatusCounts,
};
use crate::types::{ComparisonResult, DomSnapshot, Viewport};
use crate::urls::PageTarget;
use crate::{AuditError, Result};

/// Everything a run needs from the style guide. Built once, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub rules: RuleSet,
    /// Breakpoints in guide column order
    pub viewports: Vec<Viewport>,
    pub guide_status: GuideStatus,
}

impl RunContext {
    pub fn new(loaded: LoadedGuide) -> Self {
        Self {
            rules: loaded.guide.rules,
            viewports: loaded.guide.viewports,
            guide_status: loaded.status,
        }
    }

    /// Keeps only the named viewports, in guide order.
    pub fn restrict_viewports(&mut self, names: &[String]) -> Result<()> {
        if names.is_empty() {
            return Ok(());
        }
        for name in names {
            if !self.viewports.iter().any(|v| v.name.eq_ignore_ascii_case(name.trim())) {
                let known: Vec<&str> = self.viewports.iter().map(|v| v.name.as_str()).collect();
                return Err(AuditError::Config(format!(
                    "Unknown viewport '{}' (guide defines: {})",
                    name,
                    known.join(", ")
                )));
            }
        }
        self.viewports
            .retain(|v| names.iter().any(|n| v.name.eq_ignore_ascii_case(n.trim())));
        Ok(())
    }

    pub fn viewport(&self, name: &str) -> Option<&Viewport> {
        self.viewports
            .iter()
            .find(|v| v.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Selectors sent to the browser; skipped ones are left out.
    pub fn selectors(&self, policy: &EvaluationPolicy) -> Vec<String> {
        self.rules
            .selectors()
            .into_iter()
            .filter(|s| !policy.skips(s))
            .collect()
    }
}

/// Results and overlay boxes of one page at one viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportEvaluation {
    pub results: Vec<ComparisonResult>,
    pub overlays: Vec<OverlayBox>,
}

/// Evaluates a snapshot against the run's rules. Pure: no I/O.
pub fn evaluate_snapshot(
    ctx: &RunContext,
    snapshot: &DomSnapshot,
    viewport: &Viewport,
    policy: &EvaluationPolicy,
) -> ViewportEvaluation {
    let results = evaluate_rules(&ctx.rules, snapshot, &viewport.name, policy);
    let overlays = overlay_boxes(&results);
    ViewportEvaluation { results, overlays }
}

/// Where artifacts go and how results are judged.
#[derive(Debug, Clone)]
pub struct AuditOptions {
    pub policy: EvaluationPolicy,
    pub placement: PlacementConfig,
    pub dedup: DedupPolicy,
    pub highlight_placeholder_weight: bool,
    pub results_dir: PathBuf,
    pub screenshots_dir: PathBuf,
    /// `None` disables annotated screenshots
    pub capture: Option<CaptureSettings>,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            policy: EvaluationPolicy::default(),
            placement: PlacementConfig::default(),
            dedup: DedupPolicy::default(),
            highlight_placeholder_weight: false,
            results_dir: PathBuf::from("results"),
            screenshots_dir: PathBuf::from("screenshots"),
            capture: Some(CaptureSettings {
                overlap_ratio: 0.15,
                temp_dir: PathBuf::from("screenshots/.capture"),
            }),
        }
    }
}

/// Outcome of one viewport of one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportSummary {
    pub viewport: Viewport,
    pub loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_error: Option<String>,
    pub counts: StatusCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<PathBuf>,
    /// Labels that could not avoid an earlier label
    pub overlapping_labels: usize,
}

/// Outcome of one URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageReport {
    pub name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workbook: Option<PathBuf>,
    pub counts: StatusCounts,
    pub viewports: Vec<ViewportSummary>,
}

/// Outcome of a whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub guide: GuideStatus,
    pub counts: StatusCounts,
    pub pages: Vec<PageReport>,
}

type Progress = Arc<dyn Fn(&str) + Send + Sync>;

/// Drives a [`PageDriver`] through a run.
pub struct Auditor<D: PageDriver> {
    driver: D,
    options: AuditOptions,
    placer: Box<dyn LabelPlacementStrategy + Send + Sync>,
    progress: Option<Progress>,
}

impl<D: PageDriver> Auditor<D> {
    pub fn new(driver: D, options: AuditOptions) -> Self {
        let placer = Box::new(GreedyPlacer::new(options.placement));
        Self {
            driver,
            options,
            placer,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: Option<Progress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_placer(mut self, placer: Box<dyn LabelPlacementStrategy + Send + Sync>) -> Self {
        self.placer = placer;
        self
    }

    pub fn into_driver(self) -> D {
        self.driver
    }

    fn log_progress(&self, message: &str) {
        if let Some(cb) = &self.progress {
            cb(message);
        }
    }

    /// Audits every target in order.
    pub async fn run(&mut self, ctx: &RunContext, targets: &[PageTarget]) -> Result<AuditReport> {
        let mut pages = Vec::with_capacity(targets.len());
        let mut counts = StatusCounts::default();
        for (idx, target) in targets.iter().enumerate() {
            self.log_progress(&format!(
                "[{}/{}] Auditing {} ({})",
                idx + 1,
                targets.len(),
                target.name,
                target.url
            ));
            let page = self.audit_page(ctx, target).await?;
            counts.merge(&page.counts);
            pages.push(page);
        }
        Ok(AuditReport {
            guide: ctx.guide_status.clone(),
            counts,
            pages,
        })
    }

    /// Audits one URL at every viewport and writes its workbook.
    pub async fn audit_page(&mut self, ctx: &RunContext, target: &PageTarget) -> Result<PageReport> {
        let selectors = ctx.selectors(&self.options.policy);
        let mut aggregator =
            ResultAggregator::new(self.options.dedup, self.options.highlight_placeholder_weight);
        let mut summaries = Vec::with_capacity(ctx.viewports.len());

        for viewport in &ctx.viewports {
            self.log_progress(&format!("  {} at {}", target.name, viewport));
            let load = self.driver.open(&target.url, viewport).await?;
            if !load.loaded {
                log::warn!(
                    "{} did not finish loading at {}: {}",
                    target.url,
                    viewport.name,
                    load.error.as_deref().unwrap_or("unknown error")
                );
            }

            let snapshot = match self.driver.snapshot(&selectors).await {
                Ok(snapshot) => snapshot,
                Err(err) if !load.loaded => {
                    log::warn!("No snapshot of unloaded page {}: {}", target.url, err);
                    DomSnapshot::empty(&selectors)
                }
                Err(err) => return Err(err),
            };

            let evaluation = evaluate_snapshot(ctx, &snapshot, viewport, &self.options.policy);
            let mut viewport_counts = StatusCounts::default();
            evaluation
                .results
                .iter()
                .for_each(|r| viewport_counts.record(&r.status));

            let (screenshot, overlapping_labels) = if load.loaded {
                self.capture(&snapshot, viewport, &evaluation.overlays, &target.name)
                    .await?
            } else {
                (None, 0)
            };

            self.log_progress(&format!(
                "  {}: {} match, {} mismatch, {} not found",
                viewport.name,
                viewport_counts.matched,
                viewport_counts.mismatched,
                viewport_counts.not_found
            ));

            aggregator.add(viewport, evaluation.results);
            summaries.push(ViewportSummary {
                viewport: viewport.clone(),
                loaded: load.loaded,
                load_error: load.error,
                counts: viewport_counts,
                screenshot,
                overlapping_labels,
            });
        }

        let counts = aggregator.counts();
        fs::create_dir_all(&self.options.results_dir)?;
        let path = workbook_path(&self.options.results_dir, &target.name);
        let written = write_workbook(&path, &aggregator.finish())?;
        if written {
            self.log_progress(&format!("  Results written to {}", path.display()));
        }

        Ok(PageReport {
            name: target.name.clone(),
            url: target.url.clone(),
            workbook: written.then_some(path),
            counts,
            viewports: summaries,
        })
    }

    async fn capture(
        &mut self,
        snapshot: &DomSnapshot,
        viewport: &Viewport,
        overlays: &[OverlayBox],
        name: &str,
    ) -> Result<(Option<PathBuf>, usize)> {
        let Some(settings) = self.options.capture.clone() else {
            return Ok((None, 0));
        };

        let page = PageBounds {
            client_width: if snapshot.client_width > 0.0 {
                snapshot.client_width
            } else {
                f64::from(viewport.width)
            },
            document_height: snapshot.document_height,
        };
        let mut page_snapshot = snapshot.clone();
        if page_snapshot.viewport_height <= 0.0 {
            page_snapshot.viewport_height = f64::from(viewport.height);
        }

        let labels = self.placer.place(overlays, page);
        let overlapping = labels.iter().filter(|l| l.overlapping).count();
        if overlapping > 0 {
            log::warn!(
                "{} of {} labels overlap at {}",
                overlapping,
                labels.len(),
                viewport.name
            );
        }

        let output = screenshot_path(&self.options.screenshots_dir, name, &viewport.name);
        let stitched = capture_annotated(
            &mut self.driver,
            &page_snapshot,
            overlays,
            &labels,
            &settings,
            &format!("{}_{}", crate::report::file_stem(name), crate::report::file_stem(&viewport.name)),
            &output,
        )
        .await?;
        Ok((stitched.map(|s| s.path), overlapping))
    }
}
