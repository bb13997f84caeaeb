//! Comparison results produced by the evaluator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::core::BoundingBox;

/// Sentinel recorded for every actual value when a selector matched nothing.
pub const NOT_FOUND: &str = "Not found";

/// One of the four audited typography properties, in check order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Property {
    FontSize,
    FontWeight,
    FontFamily,
    LineHeight,
}

impl Property {
    pub const fn all() -> [Property; 4] {
        [
            Property::FontSize,
            Property::FontWeight,
            Property::FontFamily,
            Property::LineHeight,
        ]
    }

    /// CSS property name, used in statuses and labels.
    pub const fn css_name(self) -> &'static str {
        match self {
            Property::FontSize => "font-size",
            Property::FontWeight => "font-weight",
            Property::FontFamily => "font-family",
            Property::LineHeight => "line-height",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_name())
    }
}

impl FromStr for Property {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Property::all()
            .into_iter()
            .find(|p| p.css_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown typography property: {}", s))
    }
}

/// A failing property with the values that were compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MismatchDetail {
    pub property: Property,
    pub expected: String,
    pub actual: String,
}

/// Expected or actual values of the four properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypographyValues {
    pub font_family: String,
    pub font_size: String,
    pub font_weight: String,
    pub line_height: String,
}

impl TypographyValues {
    pub fn filled(value: &str) -> Self {
        Self {
            font_family: value.to_string(),
            font_size: value.to_string(),
            font_weight: value.to_string(),
            line_height: value.to_string(),
        }
    }

    pub fn get(&self, property: Property) -> &str {
        match property {
            Property::FontSize => &self.font_size,
            Property::FontWeight => &self.font_weight,
            Property::FontFamily => &self.font_family,
            Property::LineHeight => &self.line_height,
        }
    }
}

/// Outcome of one (element, rule) comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ResultStatus {
    Match,
    /// Failing properties in check order
    Mismatch(Vec<Property>),
    SelectorNotFound,
    /// Informational: the guide has no line height for this rule
    NoLineHeightInGuide,
    /// Informational: the run fell back to default selectors
    NoStyleGuide,
}

impl ResultStatus {
    pub fn is_mismatch(&self) -> bool {
        matches!(self, ResultStatus::Mismatch(_))
    }

    pub fn is_informational(&self) -> bool {
        matches!(
            self,
            ResultStatus::NoLineHeightInGuide | ResultStatus::NoStyleGuide
        )
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultStatus::Match => f.write_str("Match"),
            ResultStatus::Mismatch(props) => {
                let names: Vec<&str> = props.iter().map(|p| p.css_name()).collect();
                write!(f, "Mismatch: {}", names.join(", "))
            }
            ResultStatus::SelectorNotFound => f.write_str("Selector not found"),
            ResultStatus::NoLineHeightInGuide => f.write_str("No Line Height in Guide"),
            ResultStatus::NoStyleGuide => f.write_str("No Style Guide"),
        }
    }
}

impl FromStr for ResultStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Match" => Ok(ResultStatus::Match),
            "Selector not found" => Ok(ResultStatus::SelectorNotFound),
            "No Line Height in Guide" => Ok(ResultStatus::NoLineHeightInGuide),
            "No Style Guide" => Ok(ResultStatus::NoStyleGuide),
            other => {
                let list = other
                    .strip_prefix("Mismatch:")
                    .ok_or_else(|| format!("Unknown status: {}", other))?;
                let props = list
                    .split(',')
                    .map(str::parse)
                    .collect::<Result<Vec<Property>, _>>()?;
                Ok(ResultStatus::Mismatch(props))
            }
        }
    }
}

impl From<ResultStatus> for String {
    fn from(status: ResultStatus) -> Self {
        status.to_string()
    }
}

impl TryFrom<String> for ResultStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One row of evidence: a rule checked against one sampled element at one viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub selector: String,
    pub variant: String,
    pub viewport: String,
    pub status: ResultStatus,
    pub expected: TypographyValues,
    pub actual: TypographyValues,
    /// Preview of the representative element's text
    pub text_content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mismatch_details: Vec<MismatchDetail>,
    /// Page-absolute bounds of the matched element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<BoundingBox>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_status_lists_properties_in_order() {
        let status = ResultStatus::Mismatch(vec![Property::FontSize, Property::LineHeight]);
        assert_eq!(status.to_string(), "Mismatch: font-size, line-height");
    }

    #[test]
    fn status_strings_parse_back() {
        for status in [
            ResultStatus::Match,
            ResultStatus::SelectorNotFound,
            ResultStatus::NoLineHeightInGuide,
            ResultStatus::NoStyleGuide,
            ResultStatus::Mismatch(vec![Property::FontWeight]),
            ResultStatus::Mismatch(vec![Property::FontFamily, Property::LineHeight]),
        ] {
            let parsed: ResultStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("Ignored".parse::<ResultStatus>().is_err());
        assert!("Mismatch: letter-spacing".parse::<ResultStatus>().is_err());
    }

    #[test]
    fn status_serializes_as_plain_string() {
        let json = serde_json::to_string(&ResultStatus::Mismatch(vec![Property::FontWeight]))
            .unwrap();
        assert_eq!(json, "\"Mismatch: font-weight\"");
    }

    #[test]
    fn informational_statuses() {
        assert!(ResultStatus::NoLineHeightInGuide.is_informational());
        assert!(ResultStatus::NoStyleGuide.is_informational());
        assert!(!ResultStatus::Match.is_informational());
        assert!(!ResultStatus::SelectorNotFound.is_mismatch());
    }
}
