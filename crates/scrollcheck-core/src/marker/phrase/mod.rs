//! Grammar for date-gated scroll phrases such as `📜 delivery Dec 12 evening`.
//!
//! ```text
//! phrase  := marker keyword month day slot trailing*
//! month   := 3-letter abbreviation | full month name      (case-insensitive)
//! day     := 1-2 ASCII digits, a real day of that month    ("2" and "02" are equal)
//! slot    := "morning" | "evening"                         (case-insensitive)
//! ```
//!
//! Tokens are separated by any run of whitespace. A trailing `,` or `.` on a token is
//! ignored so `Dec 12, evening` parses. Anything after the slot is ignored.

use crate::context::Slot;
use chrono::{Datelike, NaiveDate};

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// A syntactically valid phrase, before any date or slot gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phrase {
    pub month: u32,
    pub day: u32,
    pub slot: Slot,
}

impl Phrase {
    pub fn is_on(&self, date: NaiveDate) -> bool {
        date.month() == self.month && date.day() == self.day
    }
}

/// Splits the text following the marker into tokens.
fn tokenize(rest: &str) -> impl Iterator<Item = &str> {
    rest.split_whitespace()
        .map(|t| t.trim_end_matches([',', '.']))
        .filter(|t| !t.is_empty())
}

fn month_token(token: &str) -> Option<u32> {
    let lower = token.to_lowercase();
    if lower.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|full| *full == lower || (lower.len() == 3 && full.starts_with(&lower)))
        .and_then(|i| u32::try_from(i + 1).ok())
}

fn day_token(token: &str) -> Option<u32> {
    if token.is_empty() || token.len() > 2 || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// Parses the tokens that follow the marker.
///
/// `rest` is the body with the leading marker already removed. Returns `None` unless
/// keyword, month, day and slot appear in that order.
pub fn parse_after_marker(rest: &str, keyword: &str) -> Option<Phrase> {
    let mut tokens = tokenize(rest);

    if !tokens.next()?.eq_ignore_ascii_case(keyword) {
        return None;
    }
    let month = month_token(tokens.next()?)?;
    let day = day_token(tokens.next()?)?;
    let slot = Slot::from_keyword(tokens.next()?)?;

    // 2024 is a leap year, so Feb 29 stays valid.
    NaiveDate::from_ymd_opt(2024, month, day)?;

    Some(Phrase { month, day, slot })
}
