//! tally-core: statement data model, balance reconciliation, and report views

pub mod reconcile;
pub mod report;
pub mod transaction;

pub use reconcile::{DEFAULT_TOLERANCE, Mismatch, compute_balance_mismatches};
pub use report::{
    CsvRow, ParseResponse, StatementSummary, TransactionFilter, UNPARSED_SAMPLE_LIMIT, raw_line_sample,
    write_csv,
};
pub use transaction::{
    AccountContext, AccountType, LineType, RawLine, StatementResult, Transaction, TxnDate,
};
