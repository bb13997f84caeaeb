use rust_xlsxwriter::{Color, Format, Workbook};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use super::aggregator::{highlight_columns, Highlight, Sheet, COLUMNS};
use crate::types::ResultStatus;
use crate::Result;

const MISMATCH_FILL: u32 = 0xFFC7CE;
const INFORMATIONAL_FILL: u32 = 0xFFEB9C;
const UNVERIFIED_FILL: u32 = 0xDDEBF7;
const NOT_FOUND_FILL: u32 = 0xD9D9D9;
const MAX_SHEET_NAME: usize = 31;

struct Styles {
    header: Format,
    mismatch: Format,
    informational: Format,
    unverified: Format,
    not_found: Format,
}

impl Styles {
    fn new() -> Self {
        Self {
            header: Format::new().set_bold(),
            mismatch: Format::new().set_background_color(Color::RGB(MISMATCH_FILL)),
            informational: Format::new().set_background_color(Color::RGB(INFORMATIONAL_FILL)),
            unverified: Format::new().set_background_color(Color::RGB(UNVERIFIED_FILL)),
            not_found: Format::new().set_background_color(Color::RGB(NOT_FOUND_FILL)),
        }
    }

    fn for_highlight(&self, highlight: Highlight) -> &Format {
        match highlight {
            Highlight::Mismatch => &self.mismatch,
            Highlight::Informational => &self.informational,
            Highlight::Unverified => &self.unverified,
        }
    }
}

/// Writes `sheets` to an xlsx file, one worksheet each, in the given order.
///
/// Sheets without rows are left out. Returns false (and writes nothing) when every
/// sheet is empty.
pub fn write_workbook(path: &Path, sheets: &[Sheet]) -> Result<bool> {
    let styles = Styles::new();
    let mut workbook = Workbook::new();
    let mut used_names = HashSet::new();
    let mut written = 0;

    for sheet in sheets.iter().filter(|s| !s.rows.is_empty()) {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(unique_sheet_name(&sheet.viewport.name, &mut used_names))?;

        for (col, title) in COLUMNS.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *title, &styles.header)?;
        }

        for (idx, row) in sheet.rows.iter().enumerate() {
            let row_num = idx as u32 + 1;
            let mut fills: Vec<Option<&Format>> = vec![None; row.cells.len()];
            if row.status == ResultStatus::SelectorNotFound {
                fills.iter_mut().for_each(|f| *f = Some(&styles.not_found));
            }
            for (property, highlight) in &row.highlights {
                let (expected, actual) = highlight_columns(*property);
                for col in [expected, actual] {
                    if let Some(fill) = fills.get_mut(col as usize) {
                        *fill = Some(styles.for_highlight(*highlight));
                    }
                }
            }

            for (col, (text, fill)) in row.cells.iter().zip(fills).enumerate() {
                match fill {
                    Some(format) => {
                        worksheet.write_string_with_format(row_num, col as u16, text, format)?
                    }
                    None => worksheet.write_string(row_num, col as u16, text)?,
                };
            }
        }

        worksheet.set_column_width(0, 28)?;
        worksheet.set_column_width(2, 36)?;
        worksheet.set_column_width(COLUMNS.len() as u16 - 1, 60)?;
        written += 1;
    }

    if written == 0 {
        log::warn!("No results to write; skipping {}", path.display());
        return Ok(false);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    workbook.save(path)?;
    Ok(true)
}

/// Excel sheet names: at most 31 characters, none of `[]:*?/\`, unique per workbook.
fn unique_sheet_name(raw: &str, used: &mut HashSet<String>) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if "[]:*?/\\".contains(c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches('\'').trim();
    let base: String = if cleaned.is_empty() {
        "Sheet".to_string()
    } else {
        cleaned.chars().take(MAX_SHEET_NAME).collect()
    };

    let mut candidate = base.clone();
    let mut n = 2;
    while !used.insert(candidate.to_lowercase()) {
        let suffix = format!(" ({n})");
        let keep = MAX_SHEET_NAME.saturating_sub(suffix.chars().count());
        candidate = format!("{}{}", base.chars().take(keep).collect::<String>(), suffix);
        n += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{DedupPolicy, ResultAggregator};
    use crate::types::{ComparisonResult, Property, TypographyValues, Viewport, NOT_FOUND};
    use calamine::{open_workbook, Data, Reader, Xlsx};
    use tempfile::TempDir;

    fn result(status: ResultStatus) -> ComparisonResult {
        let not_found = status == ResultStatus::SelectorNotFound;
        ComparisonResult {
            selector: "h1".into(),
            variant: "-".into(),
            viewport: String::new(),
            status,
            expected: TypographyValues {
                font_family: "Inter".into(),
                font_size: "32px".into(),
                font_weight: "700".into(),
                line_height: "38px".into(),
            },
            actual: if not_found {
                TypographyValues::filled(NOT_FOUND)
            } else {
                TypographyValues {
                    font_family: "Inter".into(),
                    font_size: "32px".into(),
                    font_weight: "400".into(),
                    line_height: "38px".into(),
                }
            },
            text_content: "Hello".into(),
            mismatch_details: Vec::new(),
            bounds: None,
        }
    }

    #[test]
    fn sheet_names_are_sanitized_and_unique() {
        let mut used = HashSet::new();
        assert_eq!(unique_sheet_name("1920px", &mut used), "1920px");
        assert_eq!(unique_sheet_name("1920px", &mut used), "1920px (2)");
        assert_eq!(unique_sheet_name("a/b:c", &mut used), "a_b_c");
        let long = unique_sheet_name(&"x".repeat(40), &mut used);
        assert_eq!(long.chars().count(), MAX_SHEET_NAME);
    }

    #[test]
    fn workbook_has_one_sheet_per_viewport_widest_first() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("out").join("home-font-styles.xlsx");

        let mut agg = ResultAggregator::new(DedupPolicy::None, false);
        agg.add(
            &Viewport::new("375px", 375, 281),
            vec![result(ResultStatus::SelectorNotFound)],
        );
        agg.add(
            &Viewport::new("1920px", 1920, 1440),
            vec![result(ResultStatus::Mismatch(vec![Property::FontWeight]))],
        );
        agg.add(&Viewport::new("768px", 768, 576), Vec::new());

        assert!(write_workbook(&path, &agg.finish()).expect("write workbook"));

        let mut workbook: Xlsx<_> = open_workbook(&path).expect("open workbook");
        assert_eq!(workbook.sheet_names(), vec!["1920px", "375px"]);

        let range = workbook.worksheet_range("1920px").expect("sheet");
        assert_eq!(range.get_value((0, 0)), Some(&Data::String("Selector".into())));
        assert_eq!(
            range.get_value((1, 2)),
            Some(&Data::String("Mismatch: font-weight".into()))
        );
        assert_eq!(range.get_value((1, 10)), Some(&Data::String("400".into())));

        let missing = workbook.worksheet_range("375px").expect("sheet");
        assert_eq!(missing.get_value((1, 4)), Some(&Data::String(NOT_FOUND.into())));
    }

    #[test]
    fn nothing_is_written_without_rows() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("empty.xlsx");
        let mut agg = ResultAggregator::default();
        agg.add(&Viewport::new("1920px", 1920, 1440), Vec::new());
        assert!(!write_workbook(&path, &agg.finish()).expect("write"));
        assert!(!path.exists());
    }
}
