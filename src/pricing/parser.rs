//! Locale-tolerant price text parsing.
//!
//! Marketplaces render prices with either US (`1,234.56`) or European
//! (`1.234,56`) digit grouping, and sometimes with a single separator whose
//! role has to be guessed. Every adapter funnels its raw price text through
//! [`parse_price`] so there is exactly one place where this is decided.

/// Parses raw price text into a numeric value.
///
/// Currency symbols, words and whitespace are ignored. Returns `None` when the
/// text has no digits or cannot be resolved to a finite number.
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String =
        raw.chars().filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',').collect();

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let normalized = normalize_separators(&cleaned);
    let value: f64 = normalized.parse().ok()?;

    value.is_finite().then_some(value)
}

/// Rewrites `cleaned` (digits, `.` and `,` only) into plain `1234.56` form.
fn normalize_separators(cleaned: &str) -> String {
    match (cleaned.rfind('.'), cleaned.rfind(',')) {
        // Both present: whichever comes last is the decimal separator.
        (Some(dot), Some(comma)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),

        // Comma only: "19,99" is a decimal, "1,999" and "1,234,567" are grouping.
        (None, Some(comma)) => {
            let trailing = cleaned.len() - comma - 1;
            if cleaned.matches(',').count() == 1 && trailing <= 2 {
                cleaned.replace(',', ".")
            } else {
                cleaned.replace(',', "")
            }
        }

        _ => cleaned.to_string(),
    }
}
