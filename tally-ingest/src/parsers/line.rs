//! Single-line transaction parser.
//!
//! A transaction line starts with a date and ends with up to three currency-shaped
//! tokens. Typical shapes:
//!   07-01 Coffee Shop 4.50- 95.50               (amount, balance)
//!   07/02 Check 2100002 120.47-                 (reference, amount)
//!   07/03 Transfer (25.00) 100.00 1,195.50      (debit, credit, balance)

use regex::Regex;
use std::sync::OnceLock;
use tally_core::{AccountContext, LineType, Transaction};

use super::amount::{looks_like_amount_token, normalize_amount};
use super::date::{DateOrder, resolve_date};

/// Descriptions that label balance rows rather than money movement
pub const BALANCE_MARKER_LABELS: &[&str] = &["Beginning Balance", "Ending Balance"];

const MAX_TRAILING_TOKENS: usize = 3;

fn date_start_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2}[/-]\d{1,2}(?:[/-]\d{2,4})?)\b").expect("date start regex"))
}

fn range_dash_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*-\s*\d{1,2}[/-]\d{1,2}").expect("range dash regex"))
}

fn date_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{1,2}[/-]\d{1,2}\b").expect("date prefix regex"))
}

/// True if the line begins with something date-shaped (`07-01`, `7/1/25`, ...)
pub fn has_date_prefix(line: &str) -> bool {
    date_prefix_re().is_match(line)
}

/// Split the leading date token off a line. Ranges like `12/15/24 - 01/14/25` are not dates.
fn split_leading_date(line: &str) -> Option<(&str, &str)> {
    let m = date_start_re().find(line)?;
    let rest = &line[m.end()..];
    if range_dash_re().is_match(rest) {
        return None;
    }
    Some((m.as_str(), rest.trim()))
}

// Trailing-token rules. Each is a named predicate so the priority order below stays readable.

/// Rule: a digit-only token of 5+ characters may be a check or reference number
pub fn is_reference_candidate(token: &str) -> bool {
    token.len() >= 5 && token.bytes().all(|b| b.is_ascii_digit())
}

/// Rule: decimal point, parenthesis or minus sign marks a token as money
pub fn looks_monetary(token: &str) -> bool {
    token.contains(['(', ')', '.', '-'])
}

/// Rule: a digit-only token longer than 8 characters is never a lone amount
pub fn is_long_digit_run(token: &str) -> bool {
    token.len() > 8 && token.bytes().all(|b| b.is_ascii_digit())
}

/// Rule: a reference number leads the trailing group when money follows it
fn leads_with_reference(trailing: &[&str]) -> bool {
    trailing.len() >= 2 && is_reference_candidate(trailing[0]) && trailing[1..].iter().any(|t| looks_monetary(t))
}

/// Numeric fields read off the trailing tokens
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Figures {
    amount: Option<f64>,
    debit: Option<f64>,
    credit: Option<f64>,
    balance: Option<f64>,
}

/// Three tokens: debit/credit pair plus balance when the first two have opposite signs,
/// otherwise amount and balance with the middle token ignored.
fn read_three(first: &str, middle: &str, last: &str) -> Figures {
    let (a1, a2, b) = (normalize_amount(first), normalize_amount(middle), normalize_amount(last));
    match (a1, a2, b) {
        (Some(x), Some(y), Some(bal)) if (x < 0.0 && y > 0.0) || (y < 0.0 && x > 0.0) => {
            let (debit, credit) = if x < 0.0 { (-x, y) } else { (-y, x) };
            Figures {
                amount: Some(credit - debit),
                debit: Some(debit),
                credit: Some(credit),
                balance: Some(bal),
            }
        }
        (Some(x), _, Some(bal)) => Figures {
            amount: Some(x),
            balance: Some(bal),
            ..Figures::default()
        },
        _ => Figures::default(),
    }
}

/// Two tokens: amount then balance when the second is at least as large or is comma-grouped
/// while the first is not. A large amount that drains a small balance reads as amount only.
fn read_two(first: &str, second: &str) -> Figures {
    match (normalize_amount(first), normalize_amount(second)) {
        (Some(a), Some(b)) => {
            let balance_like = b.abs() >= a.abs() || (second.contains(',') && !first.contains(','));
            Figures {
                amount: Some(a),
                balance: balance_like.then_some(b),
                ..Figures::default()
            }
        }
        (Some(a), None) | (None, Some(a)) => Figures {
            amount: Some(a),
            ..Figures::default()
        },
        (None, None) => Figures::default(),
    }
}

/// One token: an amount, unless it is a long digit run
fn read_one(token: &str) -> Option<f64> {
    if is_long_digit_run(token) {
        return None;
    }
    normalize_amount(token)
}

/// Peel up to three currency-shaped tokens off the right, returned in left-to-right order.
fn peel_trailing<'a>(tokens: &mut Vec<&'a str>) -> Vec<&'a str> {
    let mut trailing = Vec::with_capacity(MAX_TRAILING_TOKENS);
    while trailing.len() < MAX_TRAILING_TOKENS {
        match tokens.last() {
            Some(tok) if looks_like_amount_token(tok) => {
                trailing.push(*tok);
                tokens.pop();
            }
            _ => break,
        }
    }
    trailing.reverse();
    trailing
}

/// Parse one statement line into a transaction, or `None` if it is not one.
///
/// Account fields are stamped from `account` as it stands when the line is parsed.
pub fn parse_line(
    line: &str,
    year: Option<i32>,
    account: Option<&AccountContext>,
    order: DateOrder,
) -> Option<Transaction> {
    let (date_raw, rest) = split_leading_date(line)?;
    let mut tokens: Vec<&str> = rest.split_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }

    let mut trailing = peel_trailing(&mut tokens);
    if tokens.is_empty() {
        return None;
    }
    let head = tokens.join(" ");
    if BALANCE_MARKER_LABELS.contains(&head.as_str()) {
        return None;
    }

    while leads_with_reference(&trailing) {
        tokens.push(trailing.remove(0));
    }

    let mut figures = match trailing.as_slice() {
        [first, middle, last] => read_three(first, middle, last),
        [first, second] => read_two(first, second),
        [only] => match read_one(only) {
            Some(a) => Figures {
                amount: Some(a),
                ..Figures::default()
            },
            None => {
                tokens.push(*only);
                Figures::default()
            }
        },
        _ => Figures::default(),
    };

    if figures.debit.is_none() && figures.credit.is_none() {
        match figures.amount {
            Some(a) if a < 0.0 => figures.debit = Some(-a),
            Some(a) if a > 0.0 => figures.credit = Some(a),
            _ => {}
        }
    }

    if figures == Figures::default() {
        log::debug!("no figures on date line: {line}");
        return None;
    }

    Some(Transaction {
        date: resolve_date(date_raw, year, order),
        date_raw: date_raw.to_string(),
        description: tokens.join(" "),
        amount: figures.amount,
        debit: figures.debit,
        credit: figures.credit,
        balance: figures.balance,
        account_name: account.map(|a| a.name.clone()),
        account_number: account.map(|a| a.number.clone()),
        account_type: account.map(|a| a.account_type),
        line_type: LineType::Transaction,
        raw_line: line.to_string(),
    })
}
