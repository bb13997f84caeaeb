use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::ParseError;

use crate::config::ConfigError;
use crate::guide::FormatError;
use crate::urls::UrlListError;
use crate::viewport::ViewportParseError;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] ParseError),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Style guide read error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Workbook write error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    #[error("Style guide format error: {0}")]
    StyleGuide(#[from] FormatError),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl AuditError {
    pub fn browser(message: impl Into<String>) -> Self {
        AuditError::Browser(message.into())
    }

    pub fn to_payload(&self) -> ErrorPayload {
        match self {
            AuditError::Io(e) => ErrorPayload::new(
                ErrorCategory::Io,
                e.to_string(),
                "Check file paths/permissions for the style guide, URL list and output directories.",
            ),
            AuditError::InvalidUrl(e) => ErrorPayload::new(
                ErrorCategory::Input,
                e.to_string(),
                "Verify URL/format (e.g., https://example.com).",
            ),
            AuditError::Image(e) => ErrorPayload::new(
                ErrorCategory::Capture,
                e.to_string(),
                "Check the screenshot temp directory is writable and captures are valid PNGs.",
            ),
            AuditError::Serialization(e) => ErrorPayload::new(
                ErrorCategory::Input,
                e.to_string(),
                "Check JSON inputs (URL list, snapshot, row-based style guide); run with --verbose for details.",
            ),
            AuditError::Yaml(e) => ErrorPayload::new(
                ErrorCategory::Input,
                e.to_string(),
                "Check the YAML URL list syntax.",
            ),
            AuditError::Spreadsheet(e) => ErrorPayload::new(
                ErrorCategory::Input,
                e.to_string(),
                "Verify the style guide is a readable workbook (xlsx, xls, xlsb, ods) and is not open/locked elsewhere.",
            ),
            AuditError::Workbook(e) => ErrorPayload::new(
                ErrorCategory::Io,
                e.to_string(),
                "Check the results directory is writable and the workbook is not open in another program.",
            ),
            AuditError::StyleGuide(e) => ErrorPayload::new(
                ErrorCategory::Input,
                e.to_string(),
                "Ensure row 1 holds headers: selector in column A, resolution columns such as 1920px, and Font Family/Font Weight/Line Height/Variant.",
            ),
            AuditError::Browser(msg) => browser_payload(msg),
            AuditError::Config(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("viewport") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Use a viewport name from the style guide header (e.g., --viewport 1920px).",
                    )
                } else if lower.contains("file not found") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Verify the file exists; use an absolute path or run from the working directory.",
                    )
                } else {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Check flags/paths and the config file (--config).",
                    )
                }
            }
            AuditError::Unknown(msg) => ErrorPayload::new(
                ErrorCategory::Unknown,
                msg.to_string(),
                "Re-run with --verbose; file an issue if persistent.",
            ),
        }
    }
}

fn browser_payload(msg: &str) -> ErrorPayload {
    let lower = msg.to_ascii_lowercase();
    let remediation = if lower.contains("playwright npm package is missing") {
        "Install Playwright (e.g., `npm install playwright` and `npx playwright install chromium`)."
    } else if lower.contains("chromium executable") || lower.contains("executable doesn't exist") {
        "Run `npx playwright install chromium` (or `playwright install chromium`) to download the browser."
    } else if lower.contains("spawn playwright helper")
        || lower.contains("node command")
        || lower.contains("not found on path")
    {
        "Install Node.js and ensure the node binary is on PATH; rerun after installing Playwright if needed."
    } else if lower.contains("timeout") || lower.contains("timed out") {
        "Try increasing --nav-timeout or [timeouts] process in the config, and ensure the page finishes loading."
    } else {
        "Re-run with --verbose to see the browser helper output."
    };
    ErrorPayload::new(ErrorCategory::Browser, msg.to_string(), remediation)
}

impl From<ConfigError> for AuditError {
    fn from(err: ConfigError) -> Self {
        AuditError::Config(err.to_string())
    }
}

impl From<UrlListError> for AuditError {
    fn from(err: UrlListError) -> Self {
        match err {
            UrlListError::Io(e) => AuditError::Io(e),
            other => AuditError::Config(other.to_string()),
        }
    }
}

impl From<ViewportParseError> for AuditError {
    fn from(err: ViewportParseError) -> Self {
        AuditError::Config(format!("Invalid viewport: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, AuditError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Config,
    Input,
    Io,
    Browser,
    Capture,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl ErrorPayload {
    pub fn new(category: ErrorCategory, message: String, remediation: impl Into<String>) -> Self {
        Self {
            category,
            message,
            remediation: Some(remediation.into()),
        }
    }
}
