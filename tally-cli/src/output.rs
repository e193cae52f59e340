//! Plain-text rendering for the terminal.

use tally_core::{Mismatch, StatementSummary, Transaction};

const DESCRIPTION_WIDTH: usize = 40;

fn money(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.2}")).unwrap_or_default()
}

fn clip(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width - 1).collect();
    out.push('~');
    out
}

pub fn summary_line(s: &StatementSummary) -> String {
    let types: Vec<&str> = s.account_types.iter().map(|t| t.as_str()).collect();
    format!(
        "Transactions: {} | Accounts: {} | Net amount: {:.2} | Types: {}",
        s.transaction_count,
        s.account_count,
        s.net_amount,
        if types.is_empty() { "-".to_string() } else { types.join(", ") }
    )
}

/// Fixed-width table; `full` adds the debit/credit columns.
pub fn transaction_table(txns: &[&Transaction], full: bool) -> String {
    let mut out = String::new();
    let mut header = format!(
        "{:<10}  {:<20}  {:<10}  {:<w$}  {:>12}",
        "DATE",
        "TYPE",
        "ACCOUNT",
        "DESCRIPTION",
        "AMOUNT",
        w = DESCRIPTION_WIDTH
    );
    if full {
        header.push_str(&format!("  {:>12}  {:>12}", "DEBIT", "CREDIT"));
    }
    header.push_str(&format!("  {:>12}\n", "BALANCE"));
    out.push_str(&header);

    for t in txns {
        let mut row = format!(
            "{:<10}  {:<20}  {:<10}  {:<w$}  {:>12}",
            clip(&t.date.to_string(), 10),
            t.account_type.map(|a| a.as_str()).unwrap_or("-"),
            t.account_number.as_deref().unwrap_or("-"),
            clip(&t.description, DESCRIPTION_WIDTH),
            money(t.amount),
            w = DESCRIPTION_WIDTH
        );
        if full {
            row.push_str(&format!("  {:>12}  {:>12}", money(t.debit), money(t.credit)));
        }
        row.push_str(&format!("  {:>12}\n", money(t.balance)));
        out.push_str(&row);
    }
    out
}

pub fn mismatch_table(mismatches: &[Mismatch]) -> String {
    let mut out = format!(
        "{:<10}  {:<10}  {:<30}  {:>10}  {:>12}  {:>12}  {:>12}  {:>8}\n",
        "ACCOUNT", "DATE", "DESCRIPTION", "AMOUNT", "PREV", "EXPECTED", "PROVIDED", "DELTA"
    );
    for m in mismatches {
        out.push_str(&format!(
            "{:<10}  {:<10}  {:<30}  {:>10.2}  {:>12.2}  {:>12.2}  {:>12.2}  {:>8.2}\n",
            m.account_number.as_deref().unwrap_or("-"),
            clip(&m.date.to_string(), 10),
            clip(&m.description, 30),
            m.amount,
            m.prev_balance,
            m.expected_balance,
            m.provided_balance,
            m.delta
        ));
    }
    out
}
