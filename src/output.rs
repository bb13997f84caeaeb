use crate::audit::{AuditReport, PageReport};
use crate::error::ErrorPayload;
use crate::guide::{GuideStatus, RuleSet};
use crate::report::StatusCounts;
use crate::types::{ComparisonResult, Viewport};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Schema version for output payloads.
pub const OUTPUT_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum AuditOutput {
    Audit(AuditRunOutput),
    Guide(GuideOutput),
    Check(CheckOutput),
    Error(ErrorOutput),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRunOutput {
    pub version: String,
    pub guide: GuideStatus,
    pub viewports: Vec<Viewport>,
    pub counts: StatusCounts,
    pub pages: Vec<PageReport>,
}

impl AuditRunOutput {
    pub fn new(report: AuditReport, viewports: Vec<Viewport>) -> Self {
        Self {
            version: OUTPUT_VERSION.to_string(),
            guide: report.guide,
            viewports,
            counts: report.counts,
            pages: report.pages,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideOutput {
    pub version: String,
    pub path: PathBuf,
    pub status: GuideStatus,
    pub viewports: Vec<Viewport>,
    pub selector_count: usize,
    pub rule_count: usize,
    pub rules: RuleSet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutput {
    pub version: String,
    pub guide: GuideStatus,
    pub viewport: Viewport,
    pub counts: StatusCounts,
    pub results: Vec<ComparisonResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workbook: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub error: ErrorPayload,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use crate::types::{ResultStatus, TypographyValues};

    #[test]
    fn check_output_serializes() {
        let output = AuditOutput::Check(CheckOutput {
            version: OUTPUT_VERSION.to_string(),
            guide: GuideStatus::Parsed,
            viewport: Viewport::new("1920px", 1920, 1440),
            counts: StatusCounts {
                matched: 1,
                ..StatusCounts::default()
            },
            results: vec![ComparisonResult {
                selector: "h1".into(),
                variant: "-".into(),
                viewport: "1920px".into(),
                status: ResultStatus::Match,
                expected: TypographyValues::filled("-"),
                actual: TypographyValues::filled("-"),
                text_content: "Welcome".into(),
                mismatch_details: Vec::new(),
                bounds: None,
            }],
            workbook: None,
        });

        let json = serde_json::to_string(&output).expect("serialize check output");
        assert!(json.contains("\"mode\":\"check\""));
        assert!(json.contains("\"status\":\"Match\""));
        assert!(json.contains("\"guide\":{\"kind\":\"parsed\"}"));
        assert!(!json.contains("workbook"));
    }

    #[test]
    fn error_output_serializes() {
        let output = AuditOutput::Error(ErrorOutput {
            version: OUTPUT_VERSION.to_string(),
            message: Some("boom".into()),
            error: ErrorPayload::new(ErrorCategory::Browser, "boom".into(), "retry"),
        });
        let json = serde_json::to_string(&output).expect("serialize error output");
        assert!(json.contains("\"mode\":\"error\""));
        assert!(json.contains("\"category\":\"browser\""));
    }

    #[test]
    fn guide_output_carries_fallback_reason() {
        let output = AuditOutput::Guide(GuideOutput {
            version: OUTPUT_VERSION.to_string(),
            path: PathBuf::from("guide.xlsx"),
            status: GuideStatus::Fallback {
                reason: "style guide has no rows".into(),
            },
            viewports: vec![],
            selector_count: 0,
            rule_count: 0,
            rules: RuleSet::new(),
        });
        let json = serde_json::to_string(&output).expect("serialize guide output");
        assert!(json.contains("\"kind\":\"fallback\""));
        assert!(json.contains("style guide has no rows"));
    }
}
