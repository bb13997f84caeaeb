//! Result aggregation and workbook output.

mod aggregator;
mod workbook;

pub use aggregator::{
    highlight_columns, DedupPolicy, Highlight, ReportRow, ResultAggregator, Sheet, StatusCounts,
    COLUMNS,
};
pub use workbook::write_workbook;

use std::path::{Path, PathBuf};

/// `<dir>/<name>-font-styles.xlsx`
pub fn workbook_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}-font-styles.xlsx", file_stem(name)))
}

/// `<dir>/<name>_<viewport>.png`
pub fn screenshot_path(dir: &Path, name: &str, viewport: &str) -> PathBuf {
    dir.join(format!("{}_{}.png", file_stem(name), file_stem(viewport)))
}

/// Replaces path separators and other characters most filesystems reject.
pub fn file_stem(raw: &str) -> String {
    let stem: String = raw
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if stem.is_empty() {
        "page".to_string()
    } else {
        stem
    }
}
