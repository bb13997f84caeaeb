use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::normalize::strip_px;

/// Tallest viewport derived from a bare width label.
pub const MAX_DERIVED_HEIGHT: u32 = 1440;

/// A named breakpoint. The name is the literal style-guide column label (e.g. `1920px`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
        }
    }

    /// Builds a viewport from a resolution label such as `1920px` or `768`.
    ///
    /// The height is derived as `min(round(width * 0.75), 1440)`.
    pub fn from_label(label: &str) -> Option<Self> {
        let width = parse_resolution(label)?;
        Some(Self {
            name: label.trim().to_string(),
            width,
            height: derived_height(width),
        })
    }
}

/// Height used when a breakpoint only names its width.
pub fn derived_height(width: u32) -> u32 {
    let height = (f64::from(width) * 0.75).round() as u32;
    height.min(MAX_DERIVED_HEIGHT)
}

/// Parses a resolution label by its leading width, ignoring any `px` (any case).
///
/// `1920px`, `768` and `1440px Desktop` all name a width; `Font Family` and `0px` do not.
pub fn parse_resolution(label: &str) -> Option<u32> {
    let stripped = strip_px(label);
    let rest = stripped.trim_start();
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    match rest[..end].parse::<u32>() {
        Ok(width) if width > 0 => Some(width),
        _ => None,
    }
}

/// Sorts viewports widest first; equal widths keep their relative order.
pub fn sort_by_width_desc(viewports: &mut [Viewport]) {
    viewports.sort_by(|a, b| b.width.cmp(&a.width));
}

#[derive(Debug, Error)]
pub enum ViewportParseError {
    #[error("Invalid viewport format: expected a resolution label (e.g., 1920px) or WIDTHxHEIGHT (e.g., 1440x900)")]
    InvalidFormat,
    #[error("Invalid width: {0}")]
    InvalidWidth(String),
    #[error("Invalid height: {0}")]
    InvalidHeight(String),
    #[error("Width must be positive")]
    ZeroWidth,
    #[error("Height must be positive")]
    ZeroHeight,
}

impl FromStr for Viewport {
    type Err = ViewportParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let dims = strip_px(s);
        if !dims.contains('x') {
            return Viewport::from_label(s).ok_or(ViewportParseError::InvalidFormat);
        }

        let parts: Vec<&str> = dims.split('x').collect();
        if parts.len() != 2 {
            return Err(ViewportParseError::InvalidFormat);
        }

        let width: u32 = parts[0]
            .trim()
            .parse()
            .map_err(|_| ViewportParseError::InvalidWidth(parts[0].to_string()))?;

        let height: u32 = parts[1]
            .trim()
            .parse()
            .map_err(|_| ViewportParseError::InvalidHeight(parts[1].to_string()))?;

        if width == 0 {
            return Err(ViewportParseError::ZeroWidth);
        }
        if height == 0 {
            return Err(ViewportParseError::ZeroHeight);
        }

        Ok(Viewport {
            name: format!("{width}px"),
            width,
            height,
        })
    }
}

impl std::fmt::Display for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}x{})", self.name, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_with_px_suffix() {
        let vp = Viewport::from_label(" 1920px ").unwrap();
        assert_eq!(vp.name, "1920px");
        assert_eq!(vp.width, 1920);
        assert_eq!(vp.height, 1440);
    }

    #[test]
    fn derived_height_is_three_quarters_of_width() {
        assert_eq!(derived_height(1024), 768);
        assert_eq!(derived_height(375), 281);
        assert_eq!(derived_height(1366), 1025);
    }

    #[test]
    fn derived_height_is_capped() {
        assert_eq!(derived_height(2560), MAX_DERIVED_HEIGHT);
    }

    #[test]
    fn bare_numbers_and_upper_case_suffix_are_resolutions() {
        assert_eq!(parse_resolution("768"), Some(768));
        assert_eq!(parse_resolution("1440PX"), Some(1440));
        assert_eq!(parse_resolution("1440 px"), Some(1440));
    }

    #[test]
    fn descriptive_headers_use_their_leading_width() {
        assert_eq!(parse_resolution("1440px Desktop"), Some(1440));
        assert_eq!(parse_resolution("1920 (wide)"), Some(1920));
        let vp = Viewport::from_label("375px Mobile").unwrap();
        assert_eq!(vp.name, "375px Mobile");
        assert_eq!(vp.width, 375);
        assert_eq!(vp.height, 281);
    }

    #[test]
    fn non_resolutions_are_rejected() {
        assert_eq!(parse_resolution("Font Family"), None);
        assert_eq!(parse_resolution("0px"), None);
        assert_eq!(parse_resolution("-20px"), None);
        assert_eq!(parse_resolution("px"), None);
        assert_eq!(parse_resolution(""), None);
    }

    #[test]
    fn parse_explicit_dimensions() {
        let vp: Viewport = " 1920 x 1080 ".parse().unwrap();
        assert_eq!(vp.name, "1920px");
        assert_eq!(vp.width, 1920);
        assert_eq!(vp.height, 1080);
    }

    #[test]
    fn parse_label_form() {
        let vp: Viewport = "768px".parse().unwrap();
        assert_eq!(vp.height, 576);
    }

    #[test]
    fn parse_invalid_format() {
        assert!("1440x900x600".parse::<Viewport>().is_err());
        assert!("x900".parse::<Viewport>().is_err());
        assert!("1440x".parse::<Viewport>().is_err());
        assert!("wide".parse::<Viewport>().is_err());
        assert!("0x900".parse::<Viewport>().is_err());
        assert!("1440x0".parse::<Viewport>().is_err());
    }

    #[test]
    fn sort_is_descending_and_stable() {
        let mut vps = vec![
            Viewport::new("375px", 375, 281),
            Viewport::new("1920px", 1920, 1440),
            Viewport::new("desktop", 1920, 1080),
            Viewport::new("768px", 768, 576),
        ];
        sort_by_width_desc(&mut vps);
        let names: Vec<&str> = vps.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["1920px", "desktop", "768px", "375px"]);
    }

    #[test]
    fn display_includes_name_and_dimensions() {
        let vp = Viewport::new("1920px", 1920, 1440);
        assert_eq!(format!("{}", vp), "1920px (1920x1440)");
    }
}
