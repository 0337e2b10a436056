//! Free-text input handling: sanitizing edits, coercing numeric text, and
//! splitting identifier lists.

use promo_core::{PromoError, PromoResult};
use serde_json::Number;

/// Upper bound on identifiers kept from a static audience list.
pub const MAX_STATIC_UIDS: usize = 10_000;

/// Largest magnitude at which every integer is exactly representable in f64.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Keep only ASCII digits.
pub fn sanitize_digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Keep only ASCII digits and `.`.
pub fn sanitize_decimal(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect()
}

/// Uppercase and truncate to a three-letter currency code.
pub fn sanitize_currency(raw: &str) -> String {
    raw.to_uppercase().chars().take(3).collect()
}

/// Fail with [`PromoError::InvalidCell`] unless `value` is already in the
/// form `sanitize` would leave it in.
pub fn ensure_sanitized(
    cell: &str,
    value: &str,
    sanitize: fn(&str) -> String,
) -> PromoResult<()> {
    if sanitize(value) == value {
        Ok(())
    } else {
        Err(PromoError::InvalidCell {
            cell: cell.to_string(),
            value: value.to_string(),
        })
    }
}

/// Parse the longest leading decimal number in `raw`, skipping leading
/// whitespace. Returns `None` when no digits lead the text.
pub fn parse_leading_number(raw: &str) -> Option<f64> {
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

    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
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

    s[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Coerce numeric text, falling back when it does not parse.
pub fn number_or(raw: &str, fallback: f64) -> f64 {
    parse_leading_number(raw).unwrap_or(fallback)
}

/// Render a coerced value as a JSON number: integral values become JSON
/// integers, everything else stays a float.
pub fn json_number(value: f64) -> Number {
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        Number::from(value as i64)
    } else {
        Number::from_f64(value).unwrap_or_else(|| Number::from(0))
    }
}

/// Coerce numeric text straight to a JSON number, defaulting to 0.
pub fn coerce_json_number(raw: &str) -> Number {
    json_number(number_or(raw, 0.0))
}

/// Split identifier text on whitespace, commas and semicolons, dropping
/// empty tokens and keeping at most [`MAX_STATIC_UIDS`] in input order.
pub fn split_uids(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .filter(|token| !token.is_empty())
        .take(MAX_STATIC_UIDS)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_sanitized() {
        assert!(ensure_sanitized("multiplier", "12", sanitize_digits).is_ok());
        assert!(ensure_sanitized("multiplier", "", sanitize_digits).is_ok());
        let err = ensure_sanitized("multiplier", "2x", sanitize_digits).unwrap_err();
        assert!(matches!(err, PromoError::InvalidCell { ref cell, ref value }
            if cell == "multiplier" && value == "2x"));
    }

    #[test]
    fn test_sanitizers() {
        assert_eq!(sanitize_digits("1a2.3 "), "123");
        assert_eq!(sanitize_decimal("$1,000.50"), "1000.50");
        assert_eq!(sanitize_currency("eur"), "EUR");
        assert_eq!(sanitize_currency("usdt"), "USD");
        assert_eq!(sanitize_currency(""), "");
    }

    #[test]
    fn test_leading_number_prefix_semantics() {
        assert_eq!(parse_leading_number("100"), Some(100.0));
        assert_eq!(parse_leading_number("  2.5"), Some(2.5));
        assert_eq!(parse_leading_number("1.2.3"), Some(1.2));
        assert_eq!(parse_leading_number("12abc"), Some(12.0));
        assert_eq!(parse_leading_number(".5"), Some(0.5));
        assert_eq!(parse_leading_number("5."), Some(5.0));
        assert_eq!(parse_leading_number("-3"), Some(-3.0));
        assert_eq!(parse_leading_number("1e3"), Some(1000.0));
        assert_eq!(parse_leading_number("1e"), Some(1.0));
    }

    #[test]
    fn test_unparsable_text() {
        assert_eq!(parse_leading_number(""), None);
        assert_eq!(parse_leading_number("."), None);
        assert_eq!(parse_leading_number("abc"), None);
        assert_eq!(parse_leading_number("-"), None);
        assert_eq!(parse_leading_number("1e999"), None);
        assert_eq!(number_or("abc", 0.0), 0.0);
    }

    #[test]
    fn test_json_number_shape() {
        assert_eq!(json_number(100.0).to_string(), "100");
        assert_eq!(json_number(1.5).to_string(), "1.5");
        assert_eq!(coerce_json_number("1.00").to_string(), "1");
        assert_eq!(coerce_json_number("").to_string(), "0");
        assert_eq!(coerce_json_number("oops").to_string(), "0");
    }

    #[test]
    fn test_split_uids_separators() {
        let uids = split_uids("a, b;c\nd\t e,,;");
        assert_eq!(uids, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_split_uids_keeps_duplicates_in_order() {
        assert_eq!(split_uids("x y x"), vec!["x", "y", "x"]);
    }

    #[test]
    fn test_split_uids_truncates() {
        let text: String = (0..MAX_STATIC_UIDS + 25)
            .map(|i| format!("u{i}"))
            .collect::<Vec<_>>()
            .join(",");
        let uids = split_uids(&text);
        assert_eq!(uids.len(), MAX_STATIC_UIDS);
        assert_eq!(uids[0], "u0");
        assert_eq!(uids[MAX_STATIC_UIDS - 1], format!("u{}", MAX_STATIC_UIDS - 1));
    }
}
