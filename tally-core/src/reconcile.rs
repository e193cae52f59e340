//! Running-balance audit: prior balance + amount should equal the printed balance.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::transaction::{LineType, Transaction, TxnDate};

/// Default absolute tolerance, in currency units
pub const DEFAULT_TOLERANCE: f64 = 0.01;

/// A row whose printed balance disagrees with the recomputed one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mismatch {
    /// Index of the offending row in the audited table
    pub row_index: usize,
    pub account_number: Option<String>,
    pub date: TxnDate,
    pub description: String,
    pub amount: f64,
    pub prev_balance: f64,
    pub expected_balance: f64,
    pub provided_balance: f64,
    /// provided - expected
    pub delta: f64,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Absent account numbers form their own group, ordered after all others.
fn cmp_account(a: &Option<String>, b: &Option<String>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Recompute running balances per account and report rows off by more than `tolerance`.
///
/// Rows are visited in `(account_number, date_raw)` order. The first balance-bearing row of
/// each account only seeds the running balance; it is never reported.
pub fn compute_balance_mismatches(txns: &[Transaction], tolerance: f64) -> Vec<Mismatch> {
    let mut order: Vec<usize> = (0..txns.len()).collect();
    order.sort_by(|&a, &b| {
        cmp_account(&txns[a].account_number, &txns[b].account_number)
            .then_with(|| txns[a].date_raw.cmp(&txns[b].date_raw))
    });

    let mut mismatches = Vec::new();
    let mut current_account: Option<&Option<String>> = None;
    let mut last_balance: Option<f64> = None;

    for idx in order {
        let row = &txns[idx];
        if current_account != Some(&row.account_number) {
            current_account = Some(&row.account_number);
            last_balance = None;
        }

        if row.line_type == LineType::Marker {
            if row.balance.is_some() {
                last_balance = row.balance;
            }
            continue;
        }

        if let (Some(amount), Some(balance), Some(prev)) = (row.amount, row.balance, last_balance) {
            let expected = round2(prev + amount);
            let provided = round2(balance);
            if (expected - provided).abs() > tolerance {
                log::debug!(
                    "balance mismatch in {:?} on {}: expected {expected:.2}, got {provided:.2}",
                    row.account_number,
                    row.date
                );
                mismatches.push(Mismatch {
                    row_index: idx,
                    account_number: row.account_number.clone(),
                    date: row.date.clone(),
                    description: row.description.clone(),
                    amount,
                    prev_balance: prev,
                    expected_balance: expected,
                    provided_balance: provided,
                    delta: round2(provided - expected),
                });
            }
        }

        if row.balance.is_some() {
            last_balance = row.balance;
        }
    }

    mismatches
}
