//! Date token resolution for `MM-DD`, `MM/DD/YY`, `DD/MM/YYYY` and friends.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tally_core::TxnDate;

/// Preferred ordering when a two-part date is ambiguous
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DateOrder {
    /// "MD": 05-06 is May 6th
    #[serde(rename = "MD")]
    #[default]
    MonthFirst,
    /// "DM": 05-06 is June 5th
    #[serde(rename = "DM")]
    DayFirst,
}

impl FromStr for DateOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MD" => Ok(DateOrder::MonthFirst),
            "DM" => Ok(DateOrder::DayFirst),
            other => Err(format!("invalid date order: {other} (expected MD or DM)")),
        }
    }
}

/// Two-digit years below this pivot land in the 2000s, the rest in the 1900s.
fn expand_two_digit_year(yy: i32) -> i32 {
    if yy < 69 { 2000 + yy } else { 1900 + yy }
}

fn parse_day_or_month(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn resolve_two_part(a: &str, b: &str, year: i32, order: DateOrder) -> Option<NaiveDate> {
    let a: u32 = a.parse().ok()?;
    let b: u32 = b.parse().ok()?;
    let (month, day) = if a > 12 && b <= 12 {
        (b, a)
    } else if b > 12 && a <= 12 {
        (a, b)
    } else {
        match order {
            DateOrder::DayFirst => (b, a),
            DateOrder::MonthFirst => (a, b),
        }
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Full dates: month-first then day-first, with a 4- or 2-digit year and one separator kind.
fn resolve_three_part(raw: &str) -> Option<NaiveDate> {
    let sep = if raw.contains('/') { '/' } else { '-' };
    let parts: Vec<&str> = raw.split(sep).collect();
    if parts.len() != 3 {
        return None;
    }
    let year_part = parts[2];
    if !year_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = match year_part.len() {
        4 => year_part.parse().ok()?,
        2 => expand_two_digit_year(year_part.parse().ok()?),
        _ => return None,
    };
    let first = parse_day_or_month(parts[0])?;
    let second = parse_day_or_month(parts[1])?;

    NaiveDate::from_ymd_opt(year, first, second).or_else(|| NaiveDate::from_ymd_opt(year, second, first))
}

/// Resolve a date token, falling back to the raw token when it cannot be resolved.
///
/// Two-part tokens need `year`; a part above 12 pins the day, otherwise `order` decides.
pub fn resolve_date(raw: &str, year: Option<i32>, order: DateOrder) -> TxnDate {
    let parts: Vec<&str> = raw.split(['/', '-']).collect();
    let resolved = match (parts.as_slice(), year) {
        ([a, b], Some(y)) => resolve_two_part(a, b, y, order),
        _ => resolve_three_part(raw),
    };
    match resolved {
        Some(d) => TxnDate::Resolved(d),
        None => TxnDate::Unresolved(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> TxnDate {
        TxnDate::Resolved(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_day_above_twelve_is_unambiguous() {
        assert_eq!(resolve_date("13-05", Some(2025), DateOrder::MonthFirst), ymd(2025, 5, 13));
        assert_eq!(resolve_date("05/13", Some(2025), DateOrder::DayFirst), ymd(2025, 5, 13));
    }

    #[test]
    fn test_ambiguous_uses_order() {
        assert_eq!(resolve_date("05-06", Some(2025), DateOrder::DayFirst), ymd(2025, 6, 5));
        assert_eq!(resolve_date("05-06", Some(2025), DateOrder::MonthFirst), ymd(2025, 5, 6));
    }

    #[test]
    fn test_two_part_without_year_is_unresolved() {
        assert_eq!(
            resolve_date("07-01", None, DateOrder::MonthFirst),
            TxnDate::Unresolved("07-01".to_string())
        );
    }

    #[test]
    fn test_invalid_calendar_day_is_unresolved() {
        assert_eq!(
            resolve_date("02/30", Some(2025), DateOrder::MonthFirst),
            TxnDate::Unresolved("02/30".to_string())
        );
    }

    #[test]
    fn test_full_dates() {
        assert_eq!(resolve_date("07/23/25", None, DateOrder::MonthFirst), ymd(2025, 7, 23));
        assert_eq!(resolve_date("23/07/2025", None, DateOrder::MonthFirst), ymd(2025, 7, 23));
        assert_eq!(resolve_date("07-01-2024", Some(2030), DateOrder::MonthFirst), ymd(2024, 7, 1));
        // Month-first wins when both readings are valid.
        assert_eq!(resolve_date("03/04/2024", None, DateOrder::DayFirst), ymd(2024, 3, 4));
    }

    #[test]
    fn test_malformed_full_dates() {
        for raw in ["07/01-25", "07/01/202", "13/13/2025"] {
            assert_eq!(resolve_date(raw, None, DateOrder::MonthFirst), TxnDate::Unresolved(raw.to_string()));
        }
    }

    #[test]
    fn test_date_order_from_str() {
        assert_eq!("dm".parse::<DateOrder>().unwrap(), DateOrder::DayFirst);
        assert_eq!("MD".parse::<DateOrder>().unwrap(), DateOrder::MonthFirst);
        assert!("YMD".parse::<DateOrder>().is_err());
    }
}
