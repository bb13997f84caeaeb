//! Normalization of raw typography values into comparable strings.
//!
//! Every function here is pure. The `-` placeholder means "not specified" and passes
//! through untouched so callers can tell an absent expectation from a bad one.

/// Placeholder for a value the style guide (or the page) did not provide.
pub const PLACEHOLDER: &str = "-";

/// Returns true for blank input or the `-` placeholder.
pub fn is_placeholder(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed == PLACEHOLDER
}

/// Parses the longest leading decimal number, the way `parseFloat` does.
///
/// Leading whitespace is skipped; trailing garbage (`px`, `rem`, `/24px`) is ignored.
pub fn parse_leading_float(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Normalizes a font size to `<number>px`, or `-` when no number can be read.
///
/// Idempotent: `normalize_font_size(&normalize_font_size(x)) == normalize_font_size(x)`.
pub fn normalize_font_size(raw: &str) -> String {
    match parse_leading_float(raw) {
        Some(value) => format!("{}px", value),
        None => PLACEHOLDER.to_string(),
    }
}

/// Maps the `normal`/`bold` keywords onto their numeric weights.
///
/// Any other token (`600`, `lighter`) passes through unchanged.
pub fn normalize_font_weight(raw: &str) -> String {
    if is_placeholder(raw) {
        return PLACEHOLDER.to_string();
    }
    match raw.trim().to_ascii_lowercase().as_str() {
        "normal" => "400".to_string(),
        "bold" => "700".to_string(),
        _ => raw.to_string(),
    }
}

/// Resolves a line height to pixels.
///
/// Pixel values are re-suffixed as-is. Unitless values are treated as a multiplier of
/// `font_size_px` and rounded to a whole pixel. When either side cannot be parsed the raw
/// value comes back unchanged (e.g. the computed value `normal`), which callers compare
/// verbatim.
pub fn calculate_line_height(raw: &str, font_size_px: &str) -> String {
    if is_placeholder(raw) {
        return PLACEHOLDER.to_string();
    }
    if raw.to_ascii_lowercase().contains("px") {
        return format!("{}px", strip_px(raw).trim());
    }
    match (parse_leading_float(raw), parse_leading_float(&strip_px(font_size_px))) {
        (Some(multiplier), Some(base)) => format!("{}px", (multiplier * base).round() as i64),
        _ => raw.to_string(),
    }
}

/// Removes every `px` (any case), the way `replace(/px/gi, '')` does.
pub(crate) fn strip_px(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        if c.eq_ignore_ascii_case(&'p') && chars.peek().is_some_and(|n| n.eq_ignore_ascii_case(&'x')) {
            chars.next();
            continue;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_size_strips_units_and_whitespace() {
        assert_eq!(normalize_font_size("16px "), "16px");
        assert_eq!(normalize_font_size("32"), "32px");
        assert_eq!(normalize_font_size(" 18.5px"), "18.5px");
        assert_eq!(normalize_font_size("18px/24px"), "18px");
        assert_eq!(normalize_font_size("1.125rem"), "1.125px");
    }

    #[test]
    fn font_size_rejects_non_numeric() {
        assert_eq!(normalize_font_size("abc"), "-");
        assert_eq!(normalize_font_size("-"), "-");
        assert_eq!(normalize_font_size(""), "-");
        assert_eq!(normalize_font_size("px"), "-");
    }

    #[test]
    fn font_size_is_idempotent() {
        for raw in ["16px ", "abc", "-", "18.25", "0.5em", "1e1px", "  7"] {
            let once = normalize_font_size(raw);
            assert_eq!(normalize_font_size(&once), once, "input {raw:?}");
        }
    }

    #[test]
    fn leading_float_follows_parse_float() {
        assert_eq!(parse_leading_float("  12.5abc"), Some(12.5));
        assert_eq!(parse_leading_float(".5"), Some(0.5));
        assert_eq!(parse_leading_float("5."), Some(5.0));
        assert_eq!(parse_leading_float("-3px"), Some(-3.0));
        assert_eq!(parse_leading_float("1e2px"), Some(100.0));
        assert_eq!(parse_leading_float("2em"), Some(2.0));
        assert_eq!(parse_leading_float("."), None);
        assert_eq!(parse_leading_float("normal"), None);
    }

    #[test]
    fn font_weight_keywords_map_to_numbers() {
        assert_eq!(normalize_font_weight("Bold"), "700");
        assert_eq!(normalize_font_weight(" normal "), "400");
        assert_eq!(normalize_font_weight("900"), "900");
        assert_eq!(normalize_font_weight("-"), "-");
        assert_eq!(normalize_font_weight(""), "-");
        assert_eq!(normalize_font_weight("semibold"), "semibold");
    }

    #[test]
    fn line_height_pixels_pass_through() {
        assert_eq!(calculate_line_height("24px", "16px"), "24px");
        assert_eq!(calculate_line_height("24 PX", "16px"), "24px");
        assert_eq!(calculate_line_height("1.5px", "20px"), "1.5px");
    }

    #[test]
    fn line_height_multiplier_resolves_against_font_size() {
        assert_eq!(calculate_line_height("1.5", "16px"), "24px");
        assert_eq!(calculate_line_height("1.2", "32px"), "38px");
        assert_eq!(calculate_line_height("1.2", "32"), "38px");
    }

    #[test]
    fn line_height_placeholder_and_fallback() {
        assert_eq!(calculate_line_height("-", "16px"), "-");
        assert_eq!(calculate_line_height("", "16px"), "-");
        assert_eq!(calculate_line_height("normal", "16px"), "normal");
        assert_eq!(calculate_line_height("1.5", "-"), "1.5");
    }
}
