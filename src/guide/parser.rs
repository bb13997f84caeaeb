use thiserror::Error;

use super::rules::{LineHeightPolicy, RuleSet, TypographyRule, ViewportExpectation};
use super::source::Cell;
use crate::normalize::{calculate_line_height, is_placeholder, PLACEHOLDER};
use crate::viewport::Viewport;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("style guide sheet is empty")]
    Empty,
    #[error("header row has no selector column (column A is blank or a resolution)")]
    MissingSelectorColumn,
    #[error("header row has no resolution columns (e.g., 1920px)")]
    NoViewportColumns,
}

/// A parsed style guide: rules plus the breakpoints in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleGuide {
    pub rules: RuleSet,
    pub viewports: Vec<Viewport>,
}

#[derive(Debug, Default)]
struct Columns {
    viewports: Vec<(usize, Viewport)>,
    family: Option<usize>,
    weight: Option<usize>,
    line_height: Option<usize>,
    variant: Option<usize>,
}

impl Columns {
    fn locate(header: &[Cell]) -> Self {
        let mut columns = Columns::default();
        for (idx, cell) in header.iter().enumerate().skip(1) {
            let text = cell.text();
            if let Some(viewport) = Viewport::from_label(&text) {
                columns.viewports.push((idx, viewport));
            }
        }

        let find = |needle: &str| {
            header
                .iter()
                .enumerate()
                .skip(1)
                .find(|(_, cell)| cell.text().to_lowercase().contains(needle))
                .map(|(idx, _)| idx)
        };
        columns.family = find("family");
        columns.weight = find("weight");
        columns.line_height = find("height");
        columns.variant = find("variant");
        columns
    }
}

/// Parses header-less rows with the default line-height policy.
pub fn parse(rows: &[Vec<Cell>]) -> Result<StyleGuide, FormatError> {
    parse_with_policy(rows, LineHeightPolicy::default())
}

/// Parses rows into a [`StyleGuide`]. Row 0 is the header; column 0 holds selectors.
pub fn parse_with_policy(
    rows: &[Vec<Cell>],
    policy: LineHeightPolicy,
) -> Result<StyleGuide, FormatError> {
    let header = rows
        .first()
        .filter(|row| row.iter().any(|cell| cell.trimmed().is_some()))
        .ok_or(FormatError::Empty)?;

    match header.first().and_then(Cell::trimmed) {
        Some(label) if Viewport::from_label(&label).is_none() => {}
        _ => return Err(FormatError::MissingSelectorColumn),
    }

    let columns = Columns::locate(header);
    if columns.viewports.is_empty() {
        return Err(FormatError::NoViewportColumns);
    }

    let mut rules = RuleSet::new();
    for row in rows.iter().skip(1) {
        let Some(selector) = row.first().and_then(Cell::trimmed) else {
            continue;
        };
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .and_then(Cell::trimmed)
                .unwrap_or_else(|| PLACEHOLDER.to_string())
        };

        let mut rule = TypographyRule::unspecified(selector.to_lowercase(), cell(columns.variant));
        rule.font_family = cell(columns.family);
        rule.font_weight = cell(columns.weight);
        rule.line_height = cell(columns.line_height);

        for (idx, viewport) in &columns.viewports {
            let font_size = font_size_from_cell(row.get(*idx));
            let line_height = match policy {
                LineHeightPolicy::ParseTime if !is_placeholder(&font_size) => {
                    calculate_line_height(&rule.line_height, &font_size)
                }
                _ => rule.line_height.clone(),
            };
            rule.per_viewport.insert(
                viewport.name.clone(),
                ViewportExpectation {
                    font_size,
                    line_height,
                },
            );
        }

        rules.push(rule);
    }

    Ok(StyleGuide {
        rules,
        viewports: columns.viewports.into_iter().map(|(_, vp)| vp).collect(),
    })
}

/// `18px/24px` shorthand keeps the part before the slash.
fn font_size_from_cell(cell: Option<&Cell>) -> String {
    let text = cell.map(Cell::text).unwrap_or_default();
    let size = text.split('/').next().unwrap_or_default().trim();
    if size.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        size.to_string()
    }
}
