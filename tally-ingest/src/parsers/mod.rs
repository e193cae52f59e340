//! Token- and line-level parsers used by the statement assembler.

pub mod account;
pub mod amount;
pub mod date;
pub mod line;
pub mod year;

pub use account::{AccountTracker, classify_account, detect_account_header, has_account_header};
pub use amount::{looks_like_amount_token, normalize_amount};
pub use date::{DateOrder, resolve_date};
pub use line::{has_date_prefix, parse_line};
pub use year::infer_year;
