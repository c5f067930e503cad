//! Extraction of a single proposed change date from free text.
//!
//! Recognised forms, tried in order:
//!
//! 1. `2026-03-15` (ISO, one- or two-digit month/day accepted)
//! 2. `March 15, 2026` / `March 15th 2026`
//! 3. `15 March 2026` / `15th March 2026`
//! 4. `March 15` with no year: the current year, or next year when that date
//!    is more than [`YEARLESS_ROLLOVER_DAYS`] days in the past
//!
//! Month names must be spelled out in full; matching is case-insensitive.
//! A form that matches textually but names an impossible day (`2026-02-30`)
//! is skipped and the next form is tried.

use std::sync::OnceLock;

use chrono::{Datelike, Days, NaiveDate};
use regex::{Captures, Regex};

/// How far in the past a year-less date may lie before it is read as next year.
pub const YEARLESS_ROLLOVER_DAYS: u64 = 30;

const MONTHS: &str =
    "january|february|march|april|may|june|july|august|september|october|november|december";

struct DatePatterns {
    iso: Regex,
    month_day_year: Regex,
    day_month_year: Regex,
    month_day: Regex,
}

fn patterns() -> &'static DatePatterns {
    static PATTERNS: OnceLock<DatePatterns> = OnceLock::new();
    PATTERNS.get_or_init(DatePatterns::new)
}

impl DatePatterns {
    fn new() -> Self {
        let build = |pattern: String| Regex::new(&pattern).expect("date pattern is valid");
        Self {
            iso: build(r"(\d{4})-(\d{1,2})-(\d{1,2})".to_string()),
            month_day_year: build(format!(
                r"(?i)\b({MONTHS})\s+(\d{{1,2}})(?:st|nd|rd|th)?,?\s+(\d{{4}})"
            )),
            day_month_year: build(format!(
                r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+({MONTHS})\s+(\d{{4}})"
            )),
            month_day: build(format!(r"(?i)\b({MONTHS})\s+(\d{{1,2}})(?:st|nd|rd|th)?\b")),
        }
    }
}

/// Find the first proposed date in `text`, interpreting year-less dates
/// relative to `today`. Returns `None` when no recognised form is present.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use change_calendar::proposed_date::extract_proposed_date;
///
/// let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
/// assert_eq!(
///     extract_proposed_date("Can I deploy on December 15, 2026?", today),
///     NaiveDate::from_ymd_opt(2026, 12, 15)
/// );
/// assert_eq!(extract_proposed_date("sometime soon", today), None);
/// ```
pub fn extract_proposed_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let p = patterns();

    p.iso
        .captures(text)
        .and_then(|caps| {
            let year = caps[1].parse().ok()?;
            let month = caps[2].parse().ok()?;
            let day = caps[3].parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day)
        })
        .or_else(|| {
            p.month_day_year
                .captures(text)
                .and_then(|caps| date_from_parts(&caps, 3, 1, 2))
        })
        .or_else(|| {
            p.day_month_year
                .captures(text)
                .and_then(|caps| date_from_parts(&caps, 3, 2, 1))
        })
        .or_else(|| {
            let caps = p.month_day.captures(text)?;
            let month = month_number(&caps[1])?;
            let day = caps[2].parse().ok()?;
            resolve_yearless(month, day, today)
        })
}

/// Pick the year-less date's year: this year unless that lands more than
/// [`YEARLESS_ROLLOVER_DAYS`] before `today`.
fn resolve_yearless(month: u32, day: u32, today: NaiveDate) -> Option<NaiveDate> {
    let this_year = NaiveDate::from_ymd_opt(today.year(), month, day)?;
    let cutoff = today.checked_sub_days(Days::new(YEARLESS_ROLLOVER_DAYS))?;
    if this_year < cutoff {
        NaiveDate::from_ymd_opt(today.year() + 1, month, day)
    } else {
        Some(this_year)
    }
}

fn date_from_parts(caps: &Captures<'_>, year: usize, month: usize, day: usize) -> Option<NaiveDate> {
    let y = caps[year].parse().ok()?;
    let m = month_number(&caps[month])?;
    let d = caps[day].parse().ok()?;
    NaiveDate::from_ymd_opt(y, m, d)
}

/// Full English month name to number (1-12), case-insensitive.
fn month_number(s: &str) -> Option<u32> {
    match s.to_lowercase().as_str() {
        "january" => Some(1),
        "february" => Some(2),
        "march" => Some(3),
        "april" => Some(4),
        "may" => Some(5),
        "june" => Some(6),
        "july" => Some(7),
        "august" => Some(8),
        "september" => Some(9),
        "october" => Some(10),
        "november" => Some(11),
        "december" => Some(12),
        _ => None,
    }
}
