//! Statement record types: lines, account context, and parsed transactions

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One normalized, page-tagged line of extracted statement text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLine {
    /// 1-based page number
    pub page: u32,
    pub text: String,
}

impl RawLine {
    pub fn new(page: u32, text: impl Into<String>) -> Self {
        Self {
            page,
            text: text.into(),
        }
    }
}

/// Broad account classification derived from an account header name.
///
/// Variant order is the canonical sort order of the assembled table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AccountType {
    #[serde(rename = "checking")]
    Checking,
    #[serde(rename = "money_market_savings")]
    MoneyMarketSavings,
    #[serde(rename = "savings")]
    Savings,
    #[serde(rename = "unknown")]
    Unknown,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Checking => "checking",
            AccountType::MoneyMarketSavings => "money_market_savings",
            AccountType::Savings => "savings",
            AccountType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "checking" => Ok(AccountType::Checking),
            "money_market_savings" | "money-market" | "mm" => Ok(AccountType::MoneyMarketSavings),
            "savings" => Ok(AccountType::Savings),
            "unknown" => Ok(AccountType::Unknown),
            other => Err(format!("unknown account type: {other}")),
        }
    }
}

/// The account currently in effect while scanning a document top to bottom
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountContext {
    pub name: String,
    /// Digit string, at least 6 digits
    pub number: String,
    pub account_type: AccountType,
}

/// A transaction date: resolved when possible, otherwise the raw token kept verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TxnDate {
    Resolved(NaiveDate),
    Unresolved(String),
}

impl TxnDate {
    pub fn resolved(&self) -> Option<NaiveDate> {
        match self {
            TxnDate::Resolved(d) => Some(*d),
            TxnDate::Unresolved(_) => None,
        }
    }
}

impl fmt::Display for TxnDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxnDate::Resolved(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            TxnDate::Unresolved(raw) => f.write_str(raw),
        }
    }
}

/// Row kind. Markers carry an authoritative balance and reset reconciliation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum LineType {
    #[serde(rename = "transaction")]
    #[default]
    Transaction,
    #[serde(rename = "marker")]
    Marker,
}

/// A single parsed statement row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: TxnDate,
    /// Date token exactly as it appeared on the line
    pub date_raw: String,
    pub description: String,
    /// Signed: negative = money out
    pub amount: Option<f64>,
    /// Magnitude of money out
    pub debit: Option<f64>,
    /// Magnitude of money in
    pub credit: Option<f64>,
    pub balance: Option<f64>,
    pub account_name: Option<String>,
    pub account_number: Option<String>,
    pub account_type: Option<AccountType>,
    pub line_type: LineType,
    /// Source line, for audit
    pub raw_line: String,
}

impl Transaction {
    /// True when at least one of amount/debit/credit/balance is present
    pub fn has_numeric_field(&self) -> bool {
        self.amount.is_some() || self.debit.is_some() || self.credit.is_some() || self.balance.is_some()
    }

    /// Null out the flow fields, keeping the running balance
    pub fn clear_flow(&mut self) {
        self.amount = None;
        self.debit = None;
        self.credit = None;
    }
}

/// Everything one parse pass produces
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementResult {
    pub transactions: Vec<Transaction>,
    /// Date-prefixed lines that yielded no transaction, tagged `[pN]`
    pub unparsed: Vec<String>,
    pub raw_lines: Vec<RawLine>,
}

impl StatementResult {
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
