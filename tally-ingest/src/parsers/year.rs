//! Statement year inference.
//!
//! Transaction rows often print only `MM-DD`; the year has to come from
//! elsewhere on the page (period banners, check dates, footers).

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

fn full_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\d{1,2}[/-]\d{1,2}[/-](\d{2,4})\b").expect("full date regex"))
}

fn statement_period_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"(?i)(?:statement\s+period.*?)?",
            r"(\d{1,2}[/-]\d{1,2}[/-](\d{2,4}))",
            r"\s*-\s*",
            r"(\d{1,2}[/-]\d{1,2}[/-](\d{2,4}))"
        ))
        .expect("statement period regex")
    })
}

fn expand_year(raw: &str) -> Option<i32> {
    if raw.len() == 2 {
        format!("20{raw}").parse().ok()
    } else {
        raw.parse().ok()
    }
}

/// Occurrence counts that remember first-seen order for tie-breaking
#[derive(Debug, Default)]
struct YearTally {
    counts: HashMap<i32, usize>,
    order: Vec<i32>,
}

impl YearTally {
    fn add(&mut self, year: i32) {
        let n = self.counts.entry(year).or_insert(0);
        if *n == 0 {
            self.order.push(year);
        }
        *n += 1;
    }

    fn count(&self, year: i32) -> usize {
        self.counts.get(&year).copied().unwrap_or(0)
    }

    fn distinct(&self) -> usize {
        self.order.len()
    }

    /// Most frequent year; earliest-seen wins ties
    fn most_common(&self) -> Option<i32> {
        let mut best: Option<(i32, usize)> = None;
        for &y in &self.order {
            let c = self.count(y);
            if best.is_none_or(|(_, bc)| c > bc) {
                best = Some((y, c));
            }
        }
        best.map(|(y, _)| y)
    }

    /// Most frequent year; the lower year wins ties
    fn most_common_lowest(&self) -> Option<i32> {
        self.order
            .iter()
            .copied()
            .max_by(|a, b| self.count(*a).cmp(&self.count(*b)).then(b.cmp(a)))
    }
}

/// Guess the statement's reference year from every line of the document.
///
/// When the document straddles a year boundary (exactly two consecutive years) and a
/// statement-period range is present, the year used most inside period ranges wins,
/// the earlier year on a tie. Otherwise the most frequent year overall wins.
pub fn infer_year<S: AsRef<str>>(lines: &[S]) -> Option<i32> {
    let mut overall = YearTally::default();
    let mut in_period = YearTally::default();

    for line in lines {
        let line = line.as_ref();
        for caps in full_date_re().captures_iter(line) {
            if let Some(y) = expand_year(&caps[1]) {
                overall.add(y);
            }
        }
        for caps in statement_period_re().captures_iter(line) {
            for group in [2, 4] {
                if let Some(y) = expand_year(&caps[group]) {
                    in_period.add(y);
                }
            }
        }
    }

    if overall.distinct() == 2 && in_period.distinct() > 0 {
        let (a, b) = (overall.order[0], overall.order[1]);
        if (a - b).abs() == 1 {
            let preferred = in_period.most_common_lowest();
            log::debug!("year {preferred:?} chosen from statement period");
            return preferred;
        }
    }

    overall.most_common()
}
