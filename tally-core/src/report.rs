//! Views over a parsed statement: filtering, summary metrics, JSON envelope and CSV rows.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::Write;

use crate::transaction::{AccountType, RawLine, StatementResult, Transaction};

/// How many unparsed lines the JSON envelope carries
pub const UNPARSED_SAMPLE_LIMIT: usize = 50;

/// Account-type multi-select plus a case-insensitive description search.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Empty = every type, including rows with no account
    pub account_types: Vec<AccountType>,
    pub description_contains: Option<String>,
}

impl TransactionFilter {
    pub fn matches(&self, txn: &Transaction) -> bool {
        if !self.account_types.is_empty() {
            match txn.account_type {
                Some(t) if self.account_types.contains(&t) => {}
                _ => return false,
            }
        }
        match &self.description_contains {
            Some(q) if !q.is_empty() => txn.description.to_lowercase().contains(&q.to_lowercase()),
            _ => true,
        }
    }

    pub fn apply<'a>(&self, txns: &'a [Transaction]) -> Vec<&'a Transaction> {
        txns.iter().filter(|t| self.matches(t)).collect()
    }
}

/// Headline numbers for a parsed statement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementSummary {
    pub transaction_count: usize,
    pub account_count: usize,
    pub net_amount: f64,
    pub account_types: Vec<AccountType>,
}

impl StatementSummary {
    pub fn from_transactions(txns: &[Transaction]) -> Self {
        let accounts: BTreeSet<&str> = txns.iter().filter_map(|t| t.account_number.as_deref()).collect();
        let types: BTreeSet<AccountType> = txns.iter().filter_map(|t| t.account_type).collect();
        Self {
            transaction_count: txns.len(),
            account_count: accounts.len(),
            net_amount: txns.iter().filter_map(|t| t.amount).sum(),
            account_types: types.into_iter().collect(),
        }
    }
}

/// JSON response shape served to API consumers
#[derive(Debug, Clone, Serialize)]
pub struct ParseResponse<'a> {
    pub transactions: Vec<&'a Transaction>,
    pub transaction_count: usize,
    /// Sorted distinct (account_number, account_type) pairs
    pub accounts: Vec<(Option<&'a str>, Option<AccountType>)>,
    pub unparsed_sample: &'a [String],
    pub total_unparsed: usize,
}

impl<'a> ParseResponse<'a> {
    pub fn new(result: &'a StatementResult) -> Self {
        Self::with_transactions(result, result.transactions.iter().collect())
    }

    /// Envelope over the rows `filter` keeps; the unparsed sample is unaffected.
    pub fn filtered(result: &'a StatementResult, filter: &TransactionFilter) -> Self {
        Self::with_transactions(result, filter.apply(&result.transactions))
    }

    fn with_transactions(result: &'a StatementResult, transactions: Vec<&'a Transaction>) -> Self {
        let accounts: BTreeSet<(Option<&str>, Option<AccountType>)> = transactions
            .iter()
            .map(|t| (t.account_number.as_deref(), t.account_type))
            .collect();
        let sample_len = result.unparsed.len().min(UNPARSED_SAMPLE_LIMIT);
        Self {
            transaction_count: transactions.len(),
            transactions,
            accounts: accounts.into_iter().collect(),
            unparsed_sample: &result.unparsed[..sample_len],
            total_unparsed: result.unparsed.len(),
        }
    }
}

/// Export row. Debit/credit columns are only emitted for the full column set.
#[derive(Debug, Clone, Serialize)]
pub struct CsvRow<'a> {
    pub date: String,
    pub account_type: Option<AccountType>,
    pub account_name: Option<&'a str>,
    pub account_number: Option<&'a str>,
    pub description: &'a str,
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debit: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit: Option<Option<f64>>,
    pub balance: Option<f64>,
}

impl<'a> CsvRow<'a> {
    pub fn new(txn: &'a Transaction, full: bool) -> Self {
        Self {
            date: txn.date.to_string(),
            account_type: txn.account_type,
            account_name: txn.account_name.as_deref(),
            account_number: txn.account_number.as_deref(),
            description: &txn.description,
            amount: txn.amount,
            debit: full.then_some(txn.debit),
            credit: full.then_some(txn.credit),
            balance: txn.balance,
        }
    }
}

/// Write transactions as CSV with a header row
pub fn write_csv<'a, W: Write>(
    out: W,
    txns: impl IntoIterator<Item = &'a Transaction>,
    full: bool,
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    for txn in txns {
        wtr.serialize(CsvRow::new(txn, full)).context("write csv row")?;
    }
    wtr.flush().context("flush csv")?;
    Ok(())
}

/// Numbered listing of the first `limit` raw lines, e.g. `0001: Checking - 100200`
pub fn raw_line_sample(lines: &[RawLine], limit: usize) -> Vec<String> {
    lines
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, l)| format!("{:04}: {}", i + 1, l.text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{LineType, TxnDate};
    use chrono::NaiveDate;

    fn txn(desc: &str, account: Option<(&str, AccountType)>, amount: Option<f64>) -> Transaction {
        Transaction {
            date: TxnDate::Resolved(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()),
            date_raw: "07-01".to_string(),
            description: desc.to_string(),
            amount,
            debit: amount.filter(|a| *a < 0.0).map(f64::abs),
            credit: amount.filter(|a| *a > 0.0),
            balance: Some(100.0),
            account_name: account.map(|_| "Acct".to_string()),
            account_number: account.map(|(n, _)| n.to_string()),
            account_type: account.map(|(_, t)| t),
            line_type: LineType::Transaction,
            raw_line: String::new(),
        }
    }

    #[test]
    fn test_filter_by_type_and_description() {
        let txns = vec![
            txn("AMAZON MKTPL", Some(("100200", AccountType::Checking)), Some(-20.0)),
            txn("Interest", Some(("300400", AccountType::Savings)), Some(0.5)),
            txn("amazon refund", None, Some(5.0)),
        ];

        let by_type = TransactionFilter {
            account_types: vec![AccountType::Checking],
            description_contains: None,
        };
        assert_eq!(by_type.apply(&txns).len(), 1);

        let by_desc = TransactionFilter {
            account_types: vec![],
            description_contains: Some("Amazon".to_string()),
        };
        let hits = by_desc.apply(&txns);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[1].description, "amazon refund");
    }

    #[test]
    fn test_summary() {
        let txns = vec![
            txn("a", Some(("100200", AccountType::Checking)), Some(-20.0)),
            txn("b", Some(("100200", AccountType::Checking)), Some(50.0)),
            txn("c", Some(("300400", AccountType::Savings)), None),
        ];
        let s = StatementSummary::from_transactions(&txns);
        assert_eq!(s.transaction_count, 3);
        assert_eq!(s.account_count, 2);
        assert_eq!(s.net_amount, 30.0);
        assert_eq!(s.account_types, vec![AccountType::Checking, AccountType::Savings]);
    }

    #[test]
    fn test_parse_response_envelope() {
        let result = StatementResult {
            transactions: vec![
                txn("b", Some(("300400", AccountType::Savings)), Some(1.0)),
                txn("a", Some(("100200", AccountType::Checking)), Some(2.0)),
                txn("c", Some(("100200", AccountType::Checking)), Some(3.0)),
            ],
            unparsed: (0..60).map(|i| format!("[p1] 07-{i:02} ???")).collect(),
            raw_lines: vec![],
        };
        let resp = ParseResponse::new(&result);
        assert_eq!(resp.transaction_count, 3);
        assert_eq!(resp.unparsed_sample.len(), UNPARSED_SAMPLE_LIMIT);
        assert_eq!(resp.total_unparsed, 60);
        assert_eq!(
            resp.accounts,
            vec![
                (Some("100200"), Some(AccountType::Checking)),
                (Some("300400"), Some(AccountType::Savings)),
            ]
        );

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["transactions"][0]["date"], "2025-07-01");
        assert_eq!(json["accounts"][0][0], "100200");
    }

    #[test]
    fn test_filtered_envelope_only_carries_matching_rows() {
        let result = StatementResult {
            transactions: vec![
                txn("Coffee", Some(("100200", AccountType::Checking)), Some(-4.5)),
                txn("Interest", Some(("300400", AccountType::Savings)), Some(0.5)),
                txn("Coffee refund", Some(("300400", AccountType::Savings)), Some(4.5)),
            ],
            unparsed: vec!["[p1] 07-09 ???".to_string()],
            raw_lines: vec![],
        };
        let filter = TransactionFilter {
            account_types: vec![AccountType::Savings],
            description_contains: Some("coffee".to_string()),
        };
        let resp = ParseResponse::filtered(&result, &filter);
        assert_eq!(resp.transaction_count, 1);
        assert_eq!(resp.transactions[0].description, "Coffee refund");
        assert_eq!(resp.accounts, vec![(Some("300400"), Some(AccountType::Savings))]);
        assert_eq!(resp.total_unparsed, 1);
    }

    #[test]
    fn test_csv_columns_depend_on_full_flag() {
        let txns = vec![txn("Coffee", Some(("100200", AccountType::Checking)), Some(-4.5))];

        let mut short = Vec::new();
        write_csv(&mut short, &txns, false).unwrap();
        let short = String::from_utf8(short).unwrap();
        assert!(short.starts_with("date,account_type,account_name,account_number,description,amount,balance\n"));
        assert!(short.contains("2025-07-01,checking,Acct,100200,Coffee,-4.5,100.0"));

        let mut full = Vec::new();
        write_csv(&mut full, &txns, true).unwrap();
        let full = String::from_utf8(full).unwrap();
        assert!(full.starts_with("date,account_type,account_name,account_number,description,amount,debit,credit,balance\n"));
        assert!(full.contains(",-4.5,4.5,,100.0"));
    }

    #[test]
    fn test_raw_line_sample() {
        let lines = vec![RawLine::new(1, "Checking - 100200"), RawLine::new(1, "07-01 x 1.00")];
        let sample = raw_line_sample(&lines, 1);
        assert_eq!(sample, vec!["0001: Checking - 100200".to_string()]);
    }
}
