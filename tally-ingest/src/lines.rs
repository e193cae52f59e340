//! Raw line extraction: page content -> normalized, de-boilerplated, wrap-merged lines.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tally_core::RawLine;

use crate::parsers::{has_account_header, has_date_prefix};
use crate::source::{PageContent, TextSource, WordBox};

/// Words whose tops differ by at most this much share a line
pub const DEFAULT_Y_TOLERANCE: f64 = 3.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Rejoin descriptions that wrapped onto a second typographic line
    pub merge_wrapped: bool,
    /// Drop page-number footers and statement banners
    pub drop_header_footer: bool,
    pub y_tolerance: f64,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            merge_wrapped: true,
            drop_header_footer: true,
            y_tolerance: DEFAULT_Y_TOLERANCE,
        }
    }
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t\u{00A0}]+").expect("whitespace regex"))
}

fn boilerplate_res() -> &'static [Regex] {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        [
            r"(?i)^page\s+\d+\s+of\s+\d+$",
            r"(?i)^statement\s+period$",
            r"(?i)^statement\s+of\s+account$",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("boilerplate regex"))
        .collect()
    })
}

/// Collapse runs of spaces, tabs and non-breaking spaces, then trim.
pub fn normalize_space(s: &str) -> String {
    whitespace_re().replace_all(s, " ").trim().to_string()
}

pub fn is_boilerplate(line: &str) -> bool {
    boilerplate_res().iter().any(|re| re.is_match(line))
}

/// Rebuild text lines from word boxes: cluster by vertical position, then read left to right.
pub fn group_words(words: &[WordBox], y_tolerance: f64) -> Vec<String> {
    let mut sorted: Vec<&WordBox> = words.iter().collect();
    sorted.sort_by(|a, b| a.top.total_cmp(&b.top).then(a.x0.total_cmp(&b.x0)));

    let mut groups: Vec<Vec<&WordBox>> = Vec::new();
    for w in sorted {
        match groups.last_mut() {
            Some(group) if (w.top - group[0].top).abs() <= y_tolerance => group.push(w),
            _ => groups.push(vec![w]),
        }
    }

    groups
        .into_iter()
        .map(|mut group| {
            group.sort_by(|a, b| a.x0.total_cmp(&b.x0));
            group.iter().map(|w| w.text.as_str()).collect::<Vec<_>>().join(" ")
        })
        .collect()
}

/// Join a line onto the previous one when both sit on the same page and neither
/// opens with a date or carries an account header.
pub fn merge_wrapped_lines(lines: Vec<RawLine>) -> Vec<RawLine> {
    let mut merged: Vec<RawLine> = Vec::with_capacity(lines.len());
    for line in lines {
        if let Some(prev) = merged.last_mut() {
            let joinable = prev.page == line.page
                && !has_date_prefix(&prev.text)
                && !has_date_prefix(&line.text)
                && !has_account_header(&prev.text)
                && !has_account_header(&line.text);
            if joinable {
                prev.text.push(' ');
                prev.text.push_str(&line.text);
                continue;
            }
        }
        merged.push(line);
    }
    merged
}

/// Normalize the lines of already-extracted pages (page numbers start at 1).
pub fn lines_from_pages(pages: &[PageContent], opts: &ExtractOptions) -> Vec<RawLine> {
    let mut lines = Vec::new();
    for (idx, page) in pages.iter().enumerate() {
        let page_no = idx as u32 + 1;
        let texts: Vec<String> = match page {
            PageContent::Text(text) => text.lines().map(str::to_string).collect(),
            PageContent::Words(words) => group_words(words, opts.y_tolerance),
        };
        for text in texts {
            let norm = normalize_space(&text);
            if norm.is_empty() {
                continue;
            }
            if opts.drop_header_footer && is_boilerplate(&norm) {
                continue;
            }
            lines.push(RawLine::new(page_no, norm));
        }
    }

    if opts.merge_wrapped {
        lines = merge_wrapped_lines(lines);
    }
    lines
}

/// Pull all lines out of a source. Extraction failure yields no lines.
pub fn extract_raw_lines(source: &dyn TextSource, opts: &ExtractOptions) -> Vec<RawLine> {
    match source.pages() {
        Ok(pages) => {
            let lines = lines_from_pages(&pages, opts);
            log::debug!("extracted {} lines from {} pages", lines.len(), pages.len());
            lines
        }
        Err(e) => {
            log::warn!("text extraction failed: {e:#}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};

    struct Broken;

    impl TextSource for Broken {
        fn pages(&self) -> Result<Vec<PageContent>> {
            bail!("corrupt document")
        }
    }

    fn word(text: &str, top: f64, x0: f64) -> WordBox {
        WordBox {
            text: text.to_string(),
            top,
            x0,
        }
    }

    #[test]
    fn test_normalize_space() {
        assert_eq!(normalize_space("  07-01\u{00A0}\u{00A0}Coffee \t Shop  "), "07-01 Coffee Shop");
        assert_eq!(normalize_space(" \t "), "");
    }

    #[test]
    fn test_boilerplate() {
        assert!(is_boilerplate("Page 2 of 5"));
        assert!(is_boilerplate("STATEMENT PERIOD"));
        assert!(is_boilerplate("Statement of Account"));
        assert!(!is_boilerplate("Statement Period 06/01/24 - 06/30/24"));
    }

    #[test]
    fn test_group_words_by_row() {
        let words = vec![
            word("95.50", 100.5, 300.0),
            word("07-01", 100.0, 10.0),
            word("Coffee", 101.0, 60.0),
            word("Checking", 80.0, 10.0),
            word("-", 80.0, 70.0),
            word("100200", 79.0, 90.0),
        ];
        let lines = group_words(&words, DEFAULT_Y_TOLERANCE);
        assert_eq!(lines, vec!["Checking - 100200", "07-01 Coffee 95.50"]);
    }

    #[test]
    fn test_merge_wrapped() {
        let lines = vec![
            RawLine::new(1, "Checking - 100200"),
            RawLine::new(1, "07-01 Online transfer to"),
            RawLine::new(1, "Savings ref 55 4.50- 95.50"),
            RawLine::new(1, "Important notice about"),
            RawLine::new(1, "your account terms"),
            RawLine::new(2, "continued on next page"),
        ];
        let merged = merge_wrapped_lines(lines);
        let texts: Vec<&str> = merged.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "Checking - 100200",
                "07-01 Online transfer to",
                "Savings ref 55 4.50- 95.50 Important notice about your account terms",
                "continued on next page",
            ]
        );
    }

    #[test]
    fn test_lines_from_pages() {
        let pages = vec![
            PageContent::Text("Statement of Account\nChecking - 100200\n\n07-01 Coffee 4.50-\nPage 1 of 2".to_string()),
            PageContent::Text("07-02 Paycheck 1000.00".to_string()),
        ];
        let lines = lines_from_pages(&pages, &ExtractOptions::default());
        assert_eq!(
            lines,
            vec![
                RawLine::new(1, "Checking - 100200"),
                RawLine::new(1, "07-01 Coffee 4.50-"),
                RawLine::new(2, "07-02 Paycheck 1000.00"),
            ]
        );

        let keep = ExtractOptions {
            drop_header_footer: false,
            merge_wrapped: false,
            ..ExtractOptions::default()
        };
        assert_eq!(lines_from_pages(&pages, &keep).len(), 5);
    }

    #[test]
    fn test_failed_extraction_yields_nothing() {
        assert!(extract_raw_lines(&Broken, &ExtractOptions::default()).is_empty());
    }
}
