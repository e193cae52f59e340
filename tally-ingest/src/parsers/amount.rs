//! Currency token normalization.
//!
//! Accepted shapes: `1,234.50`, `$12.00`, `(45.00)`, `45.00-`, `-7.1`.
//! Anything ambiguous is rejected rather than guessed.

use regex::Regex;
use std::sync::OnceLock;

/// Magnitudes above this are treated as noise, not money
pub const AMOUNT_CUTOFF: f64 = 1_000_000_000.0;

/// Bare integers longer than this look like reference numbers
const MAX_BARE_INTEGER_DIGITS: usize = 7;

fn core_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+(?:\.\d+)?$").expect("core number regex"))
}

/// Shape of a token that may sit in the amount/balance columns at the end of a line.
pub(crate) fn amount_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"^(?:",
            r"\(\$?(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d{2})?\)",
            r"|",
            r"-?\$?(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d{2})?-?",
            r")$"
        ))
        .expect("amount token regex")
    })
}

/// True if `token` has the shape of a currency column value
pub fn looks_like_amount_token(token: &str) -> bool {
    amount_token_re().is_match(token)
}

/// Parse a currency-like token into a signed value, or `None` if it is not an amount.
pub fn normalize_amount(raw: &str) -> Option<f64> {
    let mut token = raw.trim();
    if token.is_empty() {
        return None;
    }
    let mut negative = false;

    if token.ends_with('-') && token.matches('-').count() == 1 {
        negative = true;
        token = &token[..token.len() - 1];
    }
    if token.len() >= 2 && token.starts_with('(') && token.ends_with(')') {
        negative = true;
        token = &token[1..token.len() - 1];
    }

    let grouped = token.contains(',');
    let stripped = token.replace(['$', ','], "");
    let core = match stripped.strip_prefix('-') {
        Some(rest) => {
            negative = true;
            rest
        }
        None => stripped.as_str(),
    };

    if !core_number_re().is_match(core) {
        return None;
    }

    let value: f64 = match core.split_once('.') {
        None => {
            if core.len() > MAX_BARE_INTEGER_DIGITS && !grouped {
                return None;
            }
            core.parse().ok()?
        }
        Some((int_part, frac)) => match frac.len() {
            1 => format!("{int_part}.{frac}0").parse().ok()?,
            2 => core.parse().ok()?,
            _ => return None,
        },
    };

    if value > AMOUNT_CUTOFF {
        return None;
    }
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_and_grouped() {
        assert_eq!(normalize_amount("$1,234.50"), Some(1234.50));
        assert_eq!(normalize_amount("95.50"), Some(95.50));
        assert_eq!(normalize_amount("1000"), Some(1000.0));
    }

    #[test]
    fn test_single_decimal_is_padded() {
        assert_eq!(normalize_amount("1234.5"), Some(1234.50));
    }

    #[test]
    fn test_negative_forms() {
        assert_eq!(normalize_amount("(45.00)"), Some(-45.00));
        assert_eq!(normalize_amount("45.00-"), Some(-45.00));
        assert_eq!(normalize_amount("-45.00"), Some(-45.00));
        assert_eq!(normalize_amount("-$1,000.00"), Some(-1000.00));
    }

    #[test]
    fn test_rejects_reference_like_integers() {
        assert_eq!(normalize_amount("12345678"), None);
        assert_eq!(normalize_amount("1234567"), Some(1234567.0));
        // Grouping makes a long integer plausible as money.
        assert_eq!(normalize_amount("12,345,678"), Some(12345678.0));
    }

    #[test]
    fn test_rejects_noise() {
        assert_eq!(normalize_amount("1500000000.00"), None);
        assert_eq!(normalize_amount("12.345"), None);
        assert_eq!(normalize_amount("1-2"), None);
        assert_eq!(normalize_amount("abc"), None);
        assert_eq!(normalize_amount(""), None);
        assert_eq!(normalize_amount("--5.00"), None);
    }

    #[test]
    fn test_amount_token_shape() {
        for tok in ["4.50-", "1,095.50", "(12.00)", "$5.82", "-15.00", "2100002"] {
            assert!(looks_like_amount_token(tok), "{tok}");
        }
        for tok in ["1234.5", "Shop", "07/01", "12.345", "1,23.00"] {
            assert!(!looks_like_amount_token(tok), "{tok}");
        }
    }
}
