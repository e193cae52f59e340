//! Whole-document pass: lines -> year -> per-line parse with account tracking -> sorted table.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tally_core::{AccountType, RawLine, StatementResult, Transaction};

use crate::lines::{ExtractOptions, extract_raw_lines};
use crate::parsers::{AccountTracker, DateOrder, has_date_prefix, infer_year, parse_line};
use crate::source::TextSource;

/// Amounts above `median * DEFAULT_OUTLIER_MULTIPLIER` are treated as mis-parses
pub const DEFAULT_OUTLIER_MULTIPLIER: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    pub extract: ExtractOptions,
    pub date_order: DateOrder,
    pub outlier_multiplier: f64,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            extract: ExtractOptions::default(),
            date_order: DateOrder::default(),
            outlier_multiplier: DEFAULT_OUTLIER_MULTIPLIER,
        }
    }
}

/// Parse a statement with default options
pub fn parse_bank_statement(source: &dyn TextSource) -> StatementResult {
    parse_bank_statement_with(source, &ParseOptions::default())
}

/// Parse a statement. Never fails: problems show up as missing rows and in `unparsed`.
pub fn parse_bank_statement_with(source: &dyn TextSource, opts: &ParseOptions) -> StatementResult {
    let raw_lines = extract_raw_lines(source, &opts.extract);
    let mut result = parse_lines(&raw_lines, opts);
    result.raw_lines = raw_lines;
    result
}

/// Run the parse over lines that were already extracted.
pub fn parse_lines(raw_lines: &[RawLine], opts: &ParseOptions) -> StatementResult {
    let texts: Vec<&str> = raw_lines.iter().map(|l| l.text.as_str()).collect();
    let year = infer_year(texts.as_slice());
    log::debug!("inferred statement year: {year:?}");

    let mut tracker = AccountTracker::new();
    let mut transactions = Vec::new();
    let mut unparsed = Vec::new();

    for line in raw_lines {
        let account = tracker.observe(&line.text);
        match parse_line(&line.text, year, account, opts.date_order) {
            Some(txn) => transactions.push(txn),
            None if has_date_prefix(&line.text) => unparsed.push(format!("[p{}] {}", line.page, line.text)),
            None => {}
        }
    }

    sort_transactions(&mut transactions);
    suppress_outliers(&mut transactions, opts.outlier_multiplier);
    transactions.retain(Transaction::has_numeric_field);

    log::info!(
        "parsed {} transactions from {} lines ({} unparsed)",
        transactions.len(),
        raw_lines.len(),
        unparsed.len()
    );

    StatementResult {
        transactions,
        unparsed,
        raw_lines: Vec::new(),
    }
}

/// Absent values sort after present ones.
fn cmp_present_first<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Classified account type, if any. An unclassified account sorts like a missing one.
fn sort_type(txn: &Transaction) -> Option<AccountType> {
    txn.account_type.filter(|t| *t != AccountType::Unknown)
}

/// Canonical order: account type, account number, resolved date. Stable, so rows with
/// unresolved dates keep their document order at the end of their account.
///
/// `AccountType::Unknown` and a missing account type share the last type slot; within it
/// rows still order by account number (missing last), then date.
pub fn sort_transactions(txns: &mut [Transaction]) {
    txns.sort_by(|a, b| {
        cmp_present_first(sort_type(a), sort_type(b))
            .then_with(|| cmp_present_first(a.account_number.as_deref(), b.account_number.as_deref()))
            .then_with(|| cmp_present_first(a.date.resolved(), b.date.resolved()))
    });
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    })
}

/// Null amount/debit/credit on rows whose absolute amount exceeds `multiplier` times the
/// median absolute amount. Balances are left alone.
pub fn suppress_outliers(txns: &mut [Transaction], multiplier: f64) {
    let mut magnitudes: Vec<f64> = txns.iter().filter_map(|t| t.amount).map(f64::abs).collect();
    let Some(med) = median(&mut magnitudes) else {
        return;
    };
    if med <= 0.0 {
        return;
    }
    let cutoff = med * multiplier;
    for t in txns.iter_mut() {
        if t.amount.is_some_and(|a| a.abs() > cutoff) {
            log::debug!("suppressing outlier amount {:?} on '{}'", t.amount, t.description);
            t.clear_flow();
        }
    }
}
