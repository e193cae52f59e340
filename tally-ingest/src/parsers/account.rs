//! Account header detection (`Share Draft - 123456`) and account-type classification.

use regex::Regex;
use std::sync::OnceLock;
use tally_core::{AccountContext, AccountType};

const HEADER_BODY: &str = r"(?P<name>[A-Za-z&'./-]+(?:\s+[A-Za-z&'./-]+)*)\s*-\s*(?P<number>\d{6,})\b";

fn header_anchored_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&format!("^{HEADER_BODY}")).expect("anchored header regex"))
}

pub(crate) fn header_inline_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(HEADER_BODY).expect("inline header regex"))
}

fn non_alnum_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9 ]+").expect("non-alnum regex"))
}

fn money_market_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bmm(?:sa)?\b").expect("mm regex"))
}

fn chk_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bchk\b").expect("chk regex"))
}

fn draft_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bdraft\b").expect("draft regex"))
}

/// True if the line carries an account header anywhere
pub fn has_account_header(line: &str) -> bool {
    header_inline_re().is_match(line)
}

/// Classify an account name. Credit-union wording is honored: "Share Draft" is
/// checking while a bare "Share" is savings, so money-market and checking rules run first.
pub fn classify_account(name: &str) -> AccountType {
    let lowered = name.to_lowercase();
    let n = non_alnum_re().replace_all(&lowered, " ");

    if n.contains("money market") || money_market_token_re().is_match(&n) {
        return AccountType::MoneyMarketSavings;
    }
    if n.contains("checking") || chk_token_re().is_match(&n) || n.contains("share draft") || draft_token_re().is_match(&n)
    {
        return AccountType::Checking;
    }
    if n.contains("saving") || (n.contains("share") && !n.contains("draft")) {
        return AccountType::Savings;
    }
    AccountType::Unknown
}

/// Detect an account header on the line, preferring a line-start match.
pub fn detect_account_header(line: &str) -> Option<AccountContext> {
    let caps = header_anchored_re()
        .captures(line)
        .or_else(|| header_inline_re().captures(line))?;
    let name = caps["name"].trim().to_string();
    let number = caps["number"].to_string();
    let account_type = classify_account(&name);
    Some(AccountContext {
        name,
        number,
        account_type,
    })
}

/// The account in effect during one top-to-bottom pass over a document.
///
/// Each pass owns a fresh tracker; nothing is shared between documents.
#[derive(Debug, Clone, Default)]
pub struct AccountTracker {
    current: Option<AccountContext>,
}

impl AccountTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next line; a header replaces the current account.
    pub fn observe(&mut self, line: &str) -> Option<&AccountContext> {
        if let Some(ctx) = detect_account_header(line) {
            log::debug!("account header: {} - {} ({})", ctx.name, ctx.number, ctx.account_type);
            self.current = Some(ctx);
        }
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_credit_union_names() {
        assert_eq!(classify_account("Share Draft"), AccountType::Checking);
        assert_eq!(classify_account("Money Market Savings"), AccountType::MoneyMarketSavings);
        assert_eq!(classify_account("Primary Share"), AccountType::Savings);
    }

    #[test]
    fn test_classify_variants() {
        assert_eq!(classify_account("Premier MMSA"), AccountType::MoneyMarketSavings);
        assert_eq!(classify_account("Gold MM"), AccountType::MoneyMarketSavings);
        assert_eq!(classify_account("Basic Chk."), AccountType::Checking);
        assert_eq!(classify_account("Everyday Checking"), AccountType::Checking);
        assert_eq!(classify_account("Holiday Saving"), AccountType::Savings);
        assert_eq!(classify_account("Summit Account"), AccountType::Unknown);
        // "mm" must be a whole token.
        assert_eq!(classify_account("Hammock Fund"), AccountType::Unknown);
    }

    #[test]
    fn test_detect_header_at_start() {
        let ctx = detect_account_header("Share Draft - 123456").unwrap();
        assert_eq!(ctx.name, "Share Draft");
        assert_eq!(ctx.number, "123456");
        assert_eq!(ctx.account_type, AccountType::Checking);
    }

    #[test]
    fn test_detect_header_inline() {
        let ctx = detect_account_header("Account summary: Money Market Savings - 654321 continued").unwrap();
        assert_eq!(ctx.number, "654321");
        assert_eq!(ctx.account_type, AccountType::MoneyMarketSavings);
    }

    #[test]
    fn test_short_numbers_are_not_headers() {
        assert!(detect_account_header("Checking - 12345").is_none());
        assert!(detect_account_header("07-01 Coffee Shop 4.50- 95.50").is_none());
        assert!(!has_account_header("Page 1 of 3"));
    }

    #[test]
    fn test_tracker_persists_until_next_header() {
        let mut tracker = AccountTracker::new();
        assert!(tracker.observe("Statement of Account").is_none());
        tracker.observe("Checking - 100200");
        assert_eq!(tracker.observe("07-01 Coffee 4.50-").unwrap().number, "100200");
        let ctx = tracker.observe("Primary Share - 111111").unwrap();
        assert_eq!(ctx.number, "111111");
        assert_eq!(ctx.account_type, AccountType::Savings);
    }
}
