//! Listing of scheduled or completed change requests for a time period.
//!
//! The period is resolved from the query text, then the remote change source
//! is asked for changes starting in it. Without a remote source, or when the
//! remote call fails, a small demo data set dated relative to `now` is shown
//! instead so the assistant always has something to render.

use std::io;

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use tracing::warn;

use crate::error::{CalendarError, Result};
use crate::period::{resolve_period, TimeRange};
use crate::servicenow::{ChangeRecord, ChangeSource};

const DESCRIPTION_WIDTH: usize = 80;

const CSV_HEADER: [&str; 8] = [
    "number",
    "short_description",
    "state",
    "priority",
    "risk",
    "start_date",
    "end_date",
    "assigned_to",
];

/// Changes found for a resolved period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleListing {
    pub range: TimeRange,
    pub changes: Vec<ChangeRecord>,
    /// Whether `changes` is demo data rather than a live query result.
    pub is_demo: bool,
}

/// Resolve the period named in `query` and list the changes in it.
pub fn scheduled_changes(
    query: &str,
    now: NaiveDateTime,
    source: Option<&dyn ChangeSource>,
) -> ScheduleListing {
    let range = resolve_period(query, now);

    let live = source.and_then(|src| match src.changes_in(&range) {
        Ok(changes) => Some(changes),
        Err(e) => {
            warn!(error = %e, period = %range.label, "change listing failed, showing demo data");
            None
        }
    });

    match live {
        Some(changes) => ScheduleListing {
            range,
            changes,
            is_demo: false,
        },
        None => ScheduleListing {
            changes: demo_changes(now, range.is_past),
            range,
            is_demo: true,
        },
    }
}

impl ScheduleListing {
    fn status_word(&self) -> &'static str {
        if self.range.is_past {
            "Completed"
        } else {
            "Scheduled"
        }
    }

    /// Markdown rendering: a heading, a count, and one table row per change.
    pub fn render(&self) -> String {
        if self.changes.is_empty() {
            return format!(
                "No changes {} for **{}**.",
                self.status_word().to_lowercase(),
                self.range.label
            );
        }

        let demo_note = if self.is_demo { " (Demo Data)" } else { "" };
        let mut out = format!(
            "### {} Changes for {}{demo_note}\n\nFound **{}** change request(s)\n\n",
            self.status_word(),
            self.range.label,
            self.changes.len()
        );
        out.push_str("| Number | Description | State | Priority | Start | End | Assigned To |\n");
        out.push_str("|---|---|---|---|---|---|---|\n");
        for c in &self.changes {
            out.push_str(&format!(
                "| **{}** | {} | {} | {} | {} | {} | {} |\n",
                cell(&c.number, "N/A"),
                cell(&truncate(&c.short_description, DESCRIPTION_WIDTH), "No description"),
                cell(&c.state, "N/A"),
                cell(&c.priority, "N/A"),
                cell(&c.start_date, "N/A"),
                cell(&c.end_date, "N/A"),
                cell(&c.assigned_to, "Unassigned"),
            ));
        }
        out
    }

    /// CSV export of the listed changes, header row always present.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.write_record(CSV_HEADER)?;
        for change in &self.changes {
            writer.serialize(change)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| CalendarError::Io(e.into_error()))?;
        String::from_utf8(bytes)
            .map_err(|e| CalendarError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
    }
}

fn cell(value: &str, fallback: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.replace('|', "\\|")
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let head: String = s.chars().take(width).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}

fn demo_changes(now: NaiveDateTime, is_past: bool) -> Vec<ChangeRecord> {
    let day = |offset: i64, time: &str| {
        format!("{} {time}", (now + Duration::days(offset)).format("%Y-%m-%d"))
    };
    let record = |number: &str,
                  desc: &str,
                  state: &str,
                  priority: &str,
                  risk: &str,
                  start: String,
                  end: String,
                  assigned: &str| ChangeRecord {
        number: number.to_string(),
        short_description: desc.to_string(),
        state: state.to_string(),
        priority: priority.to_string(),
        risk: risk.to_string(),
        start_date: start,
        end_date: end,
        assigned_to: assigned.to_string(),
    };

    if is_past {
        vec![
            record(
                "CHG0030001",
                "Database Backup Verification",
                "Closed",
                "3 - Moderate",
                "Low",
                day(-3, "02:00:00"),
                day(-3, "04:00:00"),
                "John Smith",
            ),
            record(
                "CHG0030002",
                "Security Patch Deployment - Web Servers",
                "Closed",
                "2 - High",
                "Moderate",
                day(-5, "22:00:00"),
                day(-4, "02:00:00"),
                "Sarah Johnson",
            ),
        ]
    } else {
        vec![
            record(
                "CHG0040001",
                "Network Switch Upgrade - Building A",
                "Scheduled",
                "2 - High",
                "Moderate",
                day(1, "20:00:00"),
                day(1, "23:00:00"),
                "Mike Davis",
            ),
            record(
                "CHG0040002",
                "Oracle Database Upgrade - Production",
                "Authorize",
                "1 - Critical",
                "High",
                day(2, "01:00:00"),
                day(2, "06:00:00"),
                "David Lee",
            ),
            record(
                "CHG0040003",
                "Firewall Rule Update - DMZ",
                "Scheduled",
                "3 - Moderate",
                "Low",
                day(3, "14:00:00"),
                day(3, "15:00:00"),
                "Lisa Wong",
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::cell::RefCell;

    fn anchor() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 18)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    /// Records the range it was asked about.
    struct RecordingSource {
        seen: RefCell<Option<TimeRange>>,
        result: Vec<ChangeRecord>,
    }

    impl ChangeSource for RecordingSource {
        fn changes_near(&self, _date: NaiveDate) -> Result<Vec<ChangeRecord>> {
            Ok(Vec::new())
        }
        fn changes_in(&self, range: &TimeRange) -> Result<Vec<ChangeRecord>> {
            *self.seen.borrow_mut() = Some(range.clone());
            Ok(self.result.clone())
        }
        fn changes_overlapping(
            &self,
            _start: NaiveDateTime,
            _end: NaiveDateTime,
            _exclude: &str,
        ) -> Result<Vec<ChangeRecord>> {
            Ok(Vec::new())
        }
    }

    struct DownSource;

    impl ChangeSource for DownSource {
        fn changes_near(&self, _date: NaiveDate) -> Result<Vec<ChangeRecord>> {
            Err(CalendarError::Remote("503".into()))
        }
        fn changes_in(&self, _range: &TimeRange) -> Result<Vec<ChangeRecord>> {
            Err(CalendarError::Remote("503".into()))
        }
        fn changes_overlapping(
            &self,
            _start: NaiveDateTime,
            _end: NaiveDateTime,
            _exclude: &str,
        ) -> Result<Vec<ChangeRecord>> {
            Err(CalendarError::Remote("503".into()))
        }
    }

    #[test]
    fn test_demo_data_without_source_future() {
        let listing = scheduled_changes("upcoming changes", anchor(), None);
        assert!(listing.is_demo);
        assert_eq!(listing.changes.len(), 3);
        assert_eq!(listing.changes[0].start_date, "2026-02-19 20:00:00");
        let text = listing.render();
        assert!(text.starts_with("### Scheduled Changes for Upcoming (Next 7 Days) (Demo Data)"));
        assert!(text.contains("Found **3** change request(s)"));
        assert!(text.contains("| **CHG0040002** | Oracle Database Upgrade - Production |"));
    }

    #[test]
    fn test_demo_data_past() {
        let listing = scheduled_changes("changes completed last week", anchor(), None);
        assert!(listing.range.is_past);
        assert_eq!(listing.changes.len(), 2);
        assert!(listing.render().starts_with("### Completed Changes for Last Week"));
    }

    #[test]
    fn test_live_source_receives_resolved_range() {
        let source = RecordingSource {
            seen: RefCell::new(None),
            result: vec![ChangeRecord {
                number: "CHG1".into(),
                short_description: "Rotate TLS certificates".into(),
                ..ChangeRecord::default()
            }],
        };
        let listing = scheduled_changes("changes next week", anchor(), Some(&source));
        assert!(!listing.is_demo);
        let seen = source.seen.borrow().clone().unwrap();
        assert_eq!(seen.label, "Next Week");
        let text = listing.render();
        assert!(!text.contains("Demo Data"));
        assert!(text.contains("| Unassigned |"));
    }

    #[test]
    fn test_live_empty_result() {
        let source = RecordingSource {
            seen: RefCell::new(None),
            result: Vec::new(),
        };
        let listing = scheduled_changes("completed changes", anchor(), Some(&source));
        assert_eq!(
            listing.render(),
            "No changes completed for **Completed (Last 7 Days)**."
        );
    }

    #[test]
    fn test_remote_failure_falls_back_to_demo() {
        let listing = scheduled_changes("changes tomorrow", anchor(), Some(&DownSource));
        assert!(listing.is_demo);
        assert_eq!(listing.range.label, "Tomorrow");
    }

    #[test]
    fn test_long_descriptions_truncated() {
        let long = "x".repeat(100);
        assert_eq!(truncate(&long, 80).len(), 83);
        assert!(truncate(&long, 80).ends_with("..."));
        assert_eq!(truncate("short", 80), "short");
    }

    #[test]
    fn test_pipes_escaped_in_cells() {
        assert_eq!(cell("a|b", "N/A"), "a\\|b");
        assert_eq!(cell("  ", "N/A"), "N/A");
    }

    #[test]
    fn test_csv_export() {
        let listing = scheduled_changes("upcoming", anchor(), None);
        let csv = listing.to_csv().unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "number,short_description,state,priority,risk,start_date,end_date,assigned_to"
        );
        assert_eq!(csv.lines().count(), 4);
        assert!(csv.contains("CHG0040003,Firewall Rule Update - DMZ,Scheduled"));
    }

    #[test]
    fn test_csv_export_empty_has_header() {
        let listing = ScheduleListing {
            range: resolve_period("today", anchor()),
            changes: Vec::new(),
            is_demo: false,
        };
        assert_eq!(listing.to_csv().unwrap().lines().count(), 1);
    }
}
