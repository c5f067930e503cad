//! Natural-language time-period resolution.
//!
//! Maps free-text phrases such as `"last 3 weeks"`, `"next month"` or
//! `"this weekend"` to a concrete `[start, end]` interval plus a flag telling
//! whether the query looks backwards (completed work) or forwards (planned
//! work). The caller provides the "now" anchor; nothing in this module reads
//! the system clock.
//!
//! # Resolution order
//!
//! Phrases are recognised by an ordered table of `(predicate, resolver)`
//! pairs. The first rule whose predicate matches and whose resolver produces a
//! range wins:
//!
//! 1. `last|next N day(s)|week(s)|month(s)|year(s)`
//! 2. `today`, `tomorrow`
//! 3. `weekend`
//! 4. `next month`, `last month` / `previous month`, `this month` (or a bare `month`)
//! 5. `next week`, `last week` / `previous week`, `this week`
//! 6. `upcoming`, `completed` / `closed`, `all`
//!
//! Anything else resolves to the next seven days. Resolution never fails.

use std::sync::OnceLock;

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use regex::Regex;
use serde::Serialize;
use tracing::debug;

/// A resolved period, inclusive at both ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    /// First instant of the period (00:00:00 on the first day).
    pub start: NaiveDateTime,
    /// Last instant of the period (23:59:59 on the last day).
    pub end: NaiveDateTime,
    /// Human-readable name, e.g. `"Next Week"` or `"March 2026"`.
    pub label: String,
    /// Whether the query asks about the past (completed changes).
    pub is_past: bool,
}

impl TimeRange {
    /// Build a whole-day range from `start` 00:00:00 to `end` 23:59:59.
    fn whole_days(start: NaiveDate, end: NaiveDate, label: impl Into<String>, is_past: bool) -> Self {
        Self {
            start: start.and_time(NaiveTime::MIN),
            end: end.and_time(end_of_day()),
            label: label.into(),
            is_past,
        }
    }

    /// Whether `instant` lies within the range (inclusive).
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant <= self.end
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end.date()
    }
}

/// Resolve a free-text query to a [`TimeRange`] relative to `now`.
///
/// `now` is the local wall-clock time of the caller. The hour only matters
/// for weekend resolution: on a Saturday afternoon "weekend" means the
/// following one.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use change_calendar::period::resolve_period;
///
/// let now = NaiveDate::from_ymd_opt(2026, 12, 10)
///     .unwrap()
///     .and_hms_opt(9, 0, 0)
///     .unwrap();
/// let range = resolve_period("changes next month", now);
/// assert_eq!(range.label, "January 2027");
/// assert!(!range.is_past);
/// ```
pub fn resolve_period(query: &str, now: NaiveDateTime) -> TimeRange {
    let normalized = normalize_query(query);

    for rule in RULES {
        if !(rule.matches)(&normalized) {
            continue;
        }
        if let Some(range) = (rule.resolve)(&normalized, now) {
            debug!(rule = rule.name, label = %range.label, "resolved time period");
            return range;
        }
    }

    debug!(query = %normalized, "no period phrase recognised, using default");
    next_seven_days(now.date(), DEFAULT_LABEL)
}

// ── Strategy table ──────────────────────────────────────────────────────────

const DEFAULT_LABEL: &str = "Upcoming (Next 7 Days)";

/// One entry of the resolution ladder.
struct PeriodRule {
    name: &'static str,
    matches: fn(&str) -> bool,
    resolve: fn(&str, NaiveDateTime) -> Option<TimeRange>,
}

const RULES: &[PeriodRule] = &[
    PeriodRule {
        name: "relative_count",
        matches: matches_relative_count,
        resolve: resolve_relative_count,
    },
    PeriodRule {
        name: "today",
        matches: matches_today,
        resolve: resolve_today,
    },
    PeriodRule {
        name: "tomorrow",
        matches: matches_tomorrow,
        resolve: resolve_tomorrow,
    },
    PeriodRule {
        name: "weekend",
        matches: matches_weekend,
        resolve: resolve_weekend,
    },
    PeriodRule {
        name: "next_month",
        matches: matches_next_month,
        resolve: resolve_next_month,
    },
    PeriodRule {
        name: "last_month",
        matches: matches_last_month,
        resolve: resolve_last_month,
    },
    PeriodRule {
        name: "this_month",
        matches: matches_this_month,
        resolve: resolve_this_month,
    },
    PeriodRule {
        name: "next_week",
        matches: matches_next_week,
        resolve: resolve_next_week,
    },
    PeriodRule {
        name: "last_week",
        matches: matches_last_week,
        resolve: resolve_last_week,
    },
    PeriodRule {
        name: "this_week",
        matches: matches_this_week,
        resolve: resolve_this_week,
    },
    PeriodRule {
        name: "upcoming",
        matches: matches_upcoming,
        resolve: resolve_upcoming,
    },
    PeriodRule {
        name: "completed",
        matches: matches_completed,
        resolve: resolve_completed,
    },
    PeriodRule {
        name: "all",
        matches: matches_all,
        resolve: resolve_all,
    },
];

// ── Predicates ──────────────────────────────────────────────────────────────

fn relative_count_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(last|next)\s+(\d+)\s+(day|week|month|year)s?\b")
            .expect("relative count pattern is valid")
    })
}

fn matches_relative_count(q: &str) -> bool {
    relative_count_regex().is_match(q)
}

fn matches_today(q: &str) -> bool {
    q.contains("today")
}

fn matches_tomorrow(q: &str) -> bool {
    q.contains("tomorrow")
}

fn matches_weekend(q: &str) -> bool {
    q.contains("weekend")
}

fn matches_next_month(q: &str) -> bool {
    q.contains("next month")
}

fn matches_last_month(q: &str) -> bool {
    q.contains("last month") || q.contains("previous month")
}

fn matches_this_month(q: &str) -> bool {
    q.contains("this month")
        || (q.contains("month")
            && !q.contains("next")
            && !q.contains("last")
            && !q.contains("previous"))
}

fn matches_next_week(q: &str) -> bool {
    q.contains("next week")
}

fn matches_last_week(q: &str) -> bool {
    q.contains("last week") || q.contains("previous week")
}

fn matches_this_week(q: &str) -> bool {
    q.contains("this week")
}

fn matches_upcoming(q: &str) -> bool {
    q.contains("upcoming")
}

fn matches_completed(q: &str) -> bool {
    q.contains("completed") || q.contains("closed")
}

fn matches_all(q: &str) -> bool {
    q.split(|c: char| !c.is_alphanumeric()).any(|word| word == "all")
}

// ── Resolvers ───────────────────────────────────────────────────────────────

/// Calendar unit accepted by the `last|next N <unit>` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Day,
    Week,
    Month,
    Year,
}

impl Unit {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "day" => Some(Unit::Day),
            "week" => Some(Unit::Week),
            "month" => Some(Unit::Month),
            "year" => Some(Unit::Year),
            _ => None,
        }
    }

    fn label(self, n: u32) -> String {
        let name = match self {
            Unit::Day => "Day",
            Unit::Week => "Week",
            Unit::Month => "Month",
            Unit::Year => "Year",
        };
        if n == 1 {
            name.to_string()
        } else {
            format!("{name}s")
        }
    }
}

/// Shift `date` by `n` units; forwards when `forward`, otherwise backwards.
/// Month and year steps clamp to the end of shorter months.
fn shift_date(date: NaiveDate, n: u32, unit: Unit, forward: bool) -> Option<NaiveDate> {
    match unit {
        Unit::Day | Unit::Week => {
            let per = if unit == Unit::Week { 7 } else { 1 };
            let days = Days::new(u64::from(n) * per);
            if forward {
                date.checked_add_days(days)
            } else {
                date.checked_sub_days(days)
            }
        }
        Unit::Month | Unit::Year => {
            let per = if unit == Unit::Year { 12 } else { 1 };
            let months = Months::new(n.checked_mul(per)?);
            if forward {
                date.checked_add_months(months)
            } else {
                date.checked_sub_months(months)
            }
        }
    }
}

fn resolve_relative_count(q: &str, now: NaiveDateTime) -> Option<TimeRange> {
    let caps = relative_count_regex().captures(q)?;
    let forward = &caps[1] == "next";
    let n: u32 = caps[2].parse().ok()?;
    let unit = Unit::parse(&caps[3])?;

    let today = now.date();
    let other = shift_date(today, n, unit, forward)?;
    let (label_prefix, start, end) = if forward {
        ("Next", today, other)
    } else {
        ("Last", other, today)
    };

    Some(TimeRange::whole_days(
        start,
        end,
        format!("{label_prefix} {n} {}", unit.label(n)),
        !forward,
    ))
}

fn resolve_today(_: &str, now: NaiveDateTime) -> Option<TimeRange> {
    let today = now.date();
    Some(TimeRange::whole_days(today, today, "Today", false))
}

fn resolve_tomorrow(_: &str, now: NaiveDateTime) -> Option<TimeRange> {
    let tomorrow = now.date().succ_opt()?;
    Some(TimeRange::whole_days(tomorrow, tomorrow, "Tomorrow", false))
}

/// Next Saturday through Sunday. From noon on a Saturday the current weekend
/// counts as already underway and the following one is returned.
fn resolve_weekend(_: &str, now: NaiveDateTime) -> Option<TimeRange> {
    let today = now.date();
    let weekday = u64::from(today.weekday().num_days_from_monday());
    let mut days_until_saturday = (5 + 7 - weekday) % 7;
    if days_until_saturday == 0 && now.hour() >= 12 {
        days_until_saturday = 7;
    }
    let saturday = today.checked_add_days(Days::new(days_until_saturday))?;
    let sunday = saturday.succ_opt()?;
    Some(TimeRange::whole_days(saturday, sunday, "This Weekend", false))
}

/// First and last day of the month `offset` months away from `today`'s month.
fn month_bounds(today: NaiveDate, offset: i32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(today.year(), today.month(), 1)?;
    let start = if offset >= 0 {
        first.checked_add_months(Months::new(offset.unsigned_abs()))?
    } else {
        first.checked_sub_months(Months::new(offset.unsigned_abs()))?
    };
    let end = start.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((start, end))
}

fn month_range(now: NaiveDateTime, offset: i32, is_past: bool) -> Option<TimeRange> {
    let (start, end) = month_bounds(now.date(), offset)?;
    let label = start.format("%B %Y").to_string();
    Some(TimeRange::whole_days(start, end, label, is_past))
}

fn resolve_next_month(_: &str, now: NaiveDateTime) -> Option<TimeRange> {
    month_range(now, 1, false)
}

fn resolve_last_month(_: &str, now: NaiveDateTime) -> Option<TimeRange> {
    month_range(now, -1, true)
}

fn resolve_this_month(_: &str, now: NaiveDateTime) -> Option<TimeRange> {
    month_range(now, 0, false)
}

/// Monday of the ISO week containing `date`.
fn week_monday(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(u64::from(
        date.weekday().num_days_from_monday(),
    )))
}

fn week_range(monday: NaiveDate, label: &str, is_past: bool) -> Option<TimeRange> {
    let sunday = monday.checked_add_days(Days::new(6))?;
    Some(TimeRange::whole_days(monday, sunday, label, is_past))
}

fn resolve_next_week(_: &str, now: NaiveDateTime) -> Option<TimeRange> {
    let monday = week_monday(now.date())?.checked_add_days(Days::new(7))?;
    week_range(monday, "Next Week", false)
}

fn resolve_last_week(_: &str, now: NaiveDateTime) -> Option<TimeRange> {
    let monday = week_monday(now.date())?.checked_sub_days(Days::new(7))?;
    week_range(monday, "Last Week", true)
}

fn resolve_this_week(_: &str, now: NaiveDateTime) -> Option<TimeRange> {
    week_range(week_monday(now.date())?, "This Week", false)
}

fn resolve_upcoming(_: &str, now: NaiveDateTime) -> Option<TimeRange> {
    Some(next_seven_days(now.date(), "Upcoming (Next 7 Days)"))
}

fn resolve_completed(_: &str, now: NaiveDateTime) -> Option<TimeRange> {
    let today = now.date();
    let start = today.checked_sub_days(Days::new(7))?;
    Some(TimeRange::whole_days(start, today, "Completed (Last 7 Days)", true))
}

fn resolve_all(_: &str, now: NaiveDateTime) -> Option<TimeRange> {
    let today = now.date();
    let start = today.checked_sub_days(Days::new(365))?;
    let end = today.checked_add_days(Days::new(365))?;
    Some(TimeRange::whole_days(start, end, "All Changes", false))
}

// ── Internal helpers ────────────────────────────────────────────────────────

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}

fn next_seven_days(today: NaiveDate, label: &str) -> TimeRange {
    let end = today.checked_add_days(Days::new(7)).unwrap_or(today);
    TimeRange::whole_days(today, end, label, false)
}

/// Lowercase and collapse runs of whitespace.
fn normalize_query(s: &str) -> String {
    s.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use proptest::prelude::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Wednesday, February 18, 2026 at 10:00.
    fn anchor() -> NaiveDateTime {
        at(2026, 2, 18, 10)
    }

    // ── last/next N units ──────────────────────────────────────────────

    #[test]
    fn test_last_7_days() {
        let r = resolve_period("show changes from the last 7 days", anchor());
        assert_eq!(r.start, at(2026, 2, 11, 0));
        assert_eq!(r.end, date(2026, 2, 18).and_hms_opt(23, 59, 59).unwrap());
        assert_eq!(r.label, "Last 7 Days");
        assert!(r.is_past);
    }

    #[test]
    fn test_next_2_weeks() {
        let r = resolve_period("next 2 weeks", anchor());
        assert_eq!(r.start_date(), date(2026, 2, 18));
        assert_eq!(r.end_date(), date(2026, 3, 4));
        assert_eq!(r.label, "Next 2 Weeks");
        assert!(!r.is_past);
    }

    #[test]
    fn test_next_1_month_singular_label() {
        let r = resolve_period("next 1 month", anchor());
        assert_eq!(r.end_date(), date(2026, 3, 18));
        assert_eq!(r.label, "Next 1 Month");
    }

    #[test]
    fn test_last_3_months_clamps_to_month_end() {
        let r = resolve_period("last 3 months", at(2026, 5, 31, 8));
        assert_eq!(r.start_date(), date(2026, 2, 28));
        assert_eq!(r.end_date(), date(2026, 5, 31));
    }

    #[test]
    fn test_next_year_from_leap_day() {
        let r = resolve_period("next 1 year", at(2024, 2, 29, 8));
        assert_eq!(r.end_date(), date(2025, 2, 28));
    }

    #[test]
    fn test_relative_count_beats_literal_phrases() {
        // "today" is present, but the counted form is checked first.
        let r = resolve_period("from today, the next 3 days", anchor());
        assert_eq!(r.label, "Next 3 Days");
    }

    #[test]
    fn test_relative_count_zero_collapses_to_today() {
        let r = resolve_period("last 0 days", anchor());
        assert_eq!(r.start_date(), r.end_date());
        assert!(r.start <= r.end);
    }

    // ── literal phrases ────────────────────────────────────────────────

    #[test]
    fn test_today() {
        let r = resolve_period("What changes are planned TODAY?", anchor());
        assert_eq!(r.start, at(2026, 2, 18, 0));
        assert_eq!(r.end_date(), date(2026, 2, 18));
        assert_eq!(r.label, "Today");
        assert!(!r.is_past);
    }

    #[test]
    fn test_tomorrow() {
        let r = resolve_period("tomorrow", anchor());
        assert_eq!(r.start_date(), date(2026, 2, 19));
        assert_eq!(r.end_date(), date(2026, 2, 19));
    }

    #[test]
    fn test_weekend_from_wednesday() {
        let r = resolve_period("this weekend", anchor());
        assert_eq!(r.start_date(), date(2026, 2, 21));
        assert_eq!(r.end_date(), date(2026, 2, 22));
        assert_eq!(r.start_date().weekday(), Weekday::Sat);
    }

    #[test]
    fn test_weekend_saturday_morning_is_current() {
        let r = resolve_period("weekend", at(2026, 2, 21, 9));
        assert_eq!(r.start_date(), date(2026, 2, 21));
    }

    #[test]
    fn test_weekend_saturday_afternoon_rolls_forward() {
        let r = resolve_period("weekend", at(2026, 2, 21, 14));
        assert_eq!(r.start_date(), date(2026, 2, 28));
        assert_eq!(r.end_date(), date(2026, 3, 1));
    }

    #[test]
    fn test_weekend_from_sunday() {
        let r = resolve_period("weekend", at(2026, 2, 22, 9));
        assert_eq!(r.start_date(), date(2026, 2, 28));
    }

    #[test]
    fn test_weekend_not_confused_with_week() {
        let r = resolve_period("next weekend", anchor());
        assert_eq!(r.label, "This Weekend");
    }

    #[test]
    fn test_this_month() {
        let r = resolve_period("changes this month", anchor());
        assert_eq!(r.start_date(), date(2026, 2, 1));
        assert_eq!(r.end_date(), date(2026, 2, 28));
        assert_eq!(r.label, "February 2026");
    }

    #[test]
    fn test_bare_month_means_this_month() {
        let r = resolve_period("monthly change summary", anchor());
        assert_eq!(r.label, "February 2026");
    }

    #[test]
    fn test_next_month_in_december_rolls_year() {
        let r = resolve_period("next month", at(2026, 12, 10, 9));
        assert_eq!(r.start_date(), date(2027, 1, 1));
        assert_eq!(r.end_date(), date(2027, 1, 31));
        assert_eq!(r.label, "January 2027");
        assert!(!r.is_past);
    }

    #[test]
    fn test_last_month_in_january_rolls_year() {
        let r = resolve_period("previous month", at(2026, 1, 15, 9));
        assert_eq!(r.start_date(), date(2025, 12, 1));
        assert_eq!(r.end_date(), date(2025, 12, 31));
        assert!(r.is_past);
    }

    #[test]
    fn test_next_week() {
        let r = resolve_period("next week", anchor());
        assert_eq!(r.start_date(), date(2026, 2, 23));
        assert_eq!(r.end_date(), date(2026, 3, 1));
        assert_eq!(r.start_date().weekday(), Weekday::Mon);
    }

    #[test]
    fn test_next_week_from_monday_skips_today() {
        let r = resolve_period("next week", at(2026, 2, 16, 9));
        assert_eq!(r.start_date(), date(2026, 2, 23));
    }

    #[test]
    fn test_last_week() {
        let r = resolve_period("what closed last week", anchor());
        // "last week" sits above "closed" in the ladder
        assert_eq!(r.label, "Last Week");
        assert_eq!(r.start_date(), date(2026, 2, 9));
        assert_eq!(r.end_date(), date(2026, 2, 15));
        assert!(r.is_past);
    }

    #[test]
    fn test_this_week() {
        let r = resolve_period("this week", anchor());
        assert_eq!(r.start_date(), date(2026, 2, 16));
        assert_eq!(r.end_date(), date(2026, 2, 22));
    }

    #[test]
    fn test_upcoming() {
        let r = resolve_period("upcoming changes", anchor());
        assert_eq!(r.start_date(), date(2026, 2, 18));
        assert_eq!(r.end_date(), date(2026, 2, 25));
        assert_eq!(r.label, "Upcoming (Next 7 Days)");
    }

    #[test]
    fn test_completed() {
        let r = resolve_period("completed changes", anchor());
        assert_eq!(r.start_date(), date(2026, 2, 11));
        assert_eq!(r.end_date(), date(2026, 2, 18));
        assert!(r.is_past);
    }

    #[test]
    fn test_all() {
        let r = resolve_period("show all changes", anchor());
        assert_eq!(r.label, "All Changes");
        assert!(r.start < r.end);
    }

    #[test]
    fn test_all_requires_whole_word() {
        let r = resolve_period("small changes", anchor());
        assert_eq!(r.label, DEFAULT_LABEL);
    }

    #[test]
    fn test_unmatched_falls_back_to_next_seven_days() {
        let r = resolve_period("what about the quarterly patching?", anchor());
        assert_eq!(r.start_date(), date(2026, 2, 18));
        assert_eq!(r.end_date(), date(2026, 2, 25));
        assert_eq!(r.label, DEFAULT_LABEL);
        assert!(!r.is_past);
    }

    #[test]
    fn test_empty_query_falls_back() {
        let r = resolve_period("", anchor());
        assert_eq!(r.label, DEFAULT_LABEL);
    }

    #[test]
    fn test_whitespace_is_collapsed() {
        let r = resolve_period("  NEXT    week ", anchor());
        assert_eq!(r.label, "Next Week");
    }

    #[test]
    fn test_contains_is_inclusive() {
        let r = resolve_period("today", anchor());
        assert!(r.contains(r.start));
        assert!(r.contains(r.end));
        assert!(!r.contains(at(2026, 2, 19, 0)));
    }

    #[test]
    fn test_serializes_to_json() {
        let r = resolve_period("today", anchor());
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["start"], "2026-02-18T00:00:00");
        assert_eq!(json["end"], "2026-02-18T23:59:59");
        assert_eq!(json["is_past"], false);
    }

    // ── properties ─────────────────────────────────────────────────────

    fn any_now() -> impl Strategy<Value = NaiveDateTime> {
        (0i64..20_000, 0u32..24).prop_map(|(offset, hour)| {
            (date(2000, 1, 1) + chrono::Duration::days(offset))
                .and_hms_opt(hour, 0, 0)
                .unwrap()
        })
    }

    /// Fixed-length units with their length in days.
    fn any_fixed_unit() -> impl Strategy<Value = (&'static str, i64)> {
        prop_oneof![Just(("day", 1i64)), Just(("week", 7i64))]
    }

    /// Calendar units with their length in months.
    fn any_calendar_unit() -> impl Strategy<Value = (&'static str, i64)> {
        prop_oneof![Just(("month", 1i64)), Just(("year", 12i64))]
    }

    /// Move `today` by `months` calendar months, clamping the day to the
    /// target month's length.
    fn add_calendar_months(today: NaiveDate, months: i64) -> NaiveDate {
        let index = i64::from(today.year()) * 12 + i64::from(today.month0()) + months;
        let year = i32::try_from(index.div_euclid(12)).unwrap();
        let month = u32::try_from(index.rem_euclid(12)).unwrap() + 1;
        (1..=today.day())
            .rev()
            .find_map(|day| NaiveDate::from_ymd_opt(year, month, day))
            .unwrap()
    }

    proptest! {
        #[test]
        fn prop_last_n_days_or_weeks_ends_today(now in any_now(), n in 0i64..400, (word, days) in any_fixed_unit()) {
            let r = resolve_period(&format!("last {n} {word}s"), now);
            let today = now.date();
            prop_assert_eq!(r.end_date(), today);
            prop_assert_eq!(r.start_date(), today - chrono::Duration::days(n * days));
            prop_assert!(r.is_past);
        }

        #[test]
        fn prop_next_n_days_or_weeks_starts_today(now in any_now(), n in 0i64..400, (word, days) in any_fixed_unit()) {
            let r = resolve_period(&format!("next {n} {word}s"), now);
            let today = now.date();
            prop_assert_eq!(r.start_date(), today);
            prop_assert_eq!(r.end_date(), today + chrono::Duration::days(n * days));
            prop_assert!(!r.is_past);
        }

        #[test]
        fn prop_last_n_months_or_years_ends_today(now in any_now(), n in 0i64..400, (word, months) in any_calendar_unit()) {
            let r = resolve_period(&format!("last {n} {word}s"), now);
            let today = now.date();
            prop_assert_eq!(r.end_date(), today);
            prop_assert_eq!(r.start_date(), add_calendar_months(today, -n * months));
            prop_assert!(r.is_past);
            prop_assert!(r.start <= r.end);
        }

        #[test]
        fn prop_next_n_months_or_years_starts_today(now in any_now(), n in 0i64..400, (word, months) in any_calendar_unit()) {
            let r = resolve_period(&format!("next {n} {word}s"), now);
            let today = now.date();
            prop_assert_eq!(r.start_date(), today);
            prop_assert_eq!(r.end_date(), add_calendar_months(today, n * months));
            prop_assert!(!r.is_past);
            prop_assert!(r.start <= r.end);
        }

        #[test]
        fn prop_weekend_is_saturday_to_sunday(now in any_now()) {
            let r = resolve_period("weekend", now);
            prop_assert_eq!(r.start_date().weekday().num_days_from_monday(), 5);
            prop_assert_eq!(r.end_date().weekday(), Weekday::Sun);
            prop_assert_eq!(r.end_date(), r.start_date().succ_opt().unwrap());
            prop_assert!(r.start_date() >= now.date());
            prop_assert!(r.start_date() <= now.date() + chrono::Duration::days(7));
        }

        #[test]
        fn prop_any_text_resolves_to_ordered_range(now in any_now(), text in ".{0,40}") {
            let r = resolve_period(&text, now);
            prop_assert!(r.start <= r.end);
        }
    }
}
