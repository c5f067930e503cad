//! Schedule conflict checking for a proposed change date.
//!
//! The remote change source is consulted first: changes within a day of the
//! proposed date count as conflicts when they are marked as a freeze or
//! blackout, or carry high risk. When the remote source is absent, fails, or
//! reports nothing, the local freeze calendar is scanned instead. Failures on
//! either side are logged and never reach the caller.
//!
//! An existing change's own window can also be checked against other open
//! changes on the remote source.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::freeze::{FreezeCalendar, FreezeWindow};
use crate::proposed_date::extract_proposed_date;
use crate::servicenow::{ChangeRecord, ChangeSource, ServiceNowClient};

/// A freeze window or risky change overlapping the proposed date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub event: String,
    pub event_type: Option<String>,
    pub start: String,
    pub end: String,
    /// Remote change number, when the conflict came from the change source.
    pub source_id: Option<String>,
    pub description: Option<String>,
}

impl From<&FreezeWindow> for Conflict {
    fn from(window: &FreezeWindow) -> Self {
        Self {
            event: window.event_name.clone(),
            event_type: Some(window.event_type.clone()),
            start: window.start_date.format("%Y-%m-%d").to_string(),
            end: window.end_date.format("%Y-%m-%d").to_string(),
            source_id: None,
            description: Some(window.description.clone()).filter(|d| !d.is_empty()),
        }
    }
}

impl From<&ChangeRecord> for Conflict {
    fn from(change: &ChangeRecord) -> Self {
        let or_na = |s: &str| {
            if s.is_empty() {
                "N/A".to_string()
            } else {
                s.to_string()
            }
        };
        Self {
            event: if change.short_description.is_empty() {
                "Scheduled Change".to_string()
            } else {
                change.short_description.clone()
            },
            event_type: None,
            start: or_na(&change.start_date),
            end: or_na(&change.end_date),
            source_id: Some(or_na(&change.number)),
            description: None,
        }
    }
}

/// Outcome of a conflict check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConflictReport {
    /// No recognisable date in the request.
    NoDate,
    /// The date is free of known freezes and risky changes.
    Clear { date: NaiveDate },
    Conflicts {
        date: NaiveDate,
        conflicts: Vec<Conflict>,
    },
}

impl ConflictReport {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            ConflictReport::NoDate => None,
            ConflictReport::Clear { date } | ConflictReport::Conflicts { date, .. } => Some(*date),
        }
    }

    pub fn has_conflicts(&self) -> bool {
        matches!(self, ConflictReport::Conflicts { .. })
    }

    /// The user-facing Markdown message.
    pub fn render(&self) -> String {
        match self {
            ConflictReport::NoDate => "I couldn't identify a specific date in your request. \
                 Please specify a date like 'December 15, 2025' or '2025-12-15'."
                .to_string(),
            ConflictReport::Clear { date } => format!(
                "**No conflicts found!**\n\nThe date **{}** appears to be available for \
                 scheduling your change. Please proceed with your change request.",
                date.format("%B %d, %Y")
            ),
            ConflictReport::Conflicts { conflicts, .. } => {
                let mut out = String::from("**Conflict Detected!**\n\n");
                for c in conflicts {
                    match &c.source_id {
                        Some(id) => out.push_str(&format!("- **{}** ({id})\n", c.event)),
                        None => out.push_str(&format!("- **{}**\n", c.event)),
                    }
                    out.push_str(&format!("  - Period: {} to {}\n", c.start, c.end));
                    if let Some(desc) = &c.description {
                        out.push_str(&format!("  - {desc}\n"));
                    }
                }
                out.push_str(
                    "\n**Recommendation:** Please select a different date to avoid operational conflicts.",
                );
                out
            }
        }
    }
}

/// Markdown summary of the changes overlapping `number`'s window.
pub fn render_overlaps(number: &str, overlaps: &[Conflict]) -> String {
    if overlaps.is_empty() {
        return format!("No other open changes overlap the window of **{number}**.");
    }
    let mut out = format!("**Changes overlapping {number}:**\n\n");
    for c in overlaps {
        let id = c.source_id.as_deref().unwrap_or("N/A");
        out.push_str(&format!("- **{id}**: {} ({} to {})\n", c.event, c.start, c.end));
    }
    out
}

/// Checks proposed dates against the remote change source and the local calendar.
pub struct ConflictChecker {
    calendar_file: PathBuf,
    remote: Option<Box<dyn ChangeSource>>,
}

impl ConflictChecker {
    /// Build a checker from configuration. The remote source is enabled only
    /// when ServiceNow credentials are complete.
    pub fn new(config: &Config) -> Self {
        let remote: Option<Box<dyn ChangeSource>> = if config.servicenow.is_configured() {
            match ServiceNowClient::new(&config.servicenow) {
                Ok(client) => Some(Box::new(client)),
                Err(e) => {
                    warn!(error = %e, "remote change source unavailable, using local calendar only");
                    None
                }
            }
        } else {
            None
        };
        Self::with_source(config.calendar_file.clone(), remote)
    }

    pub fn with_source(calendar_file: PathBuf, remote: Option<Box<dyn ChangeSource>>) -> Self {
        Self {
            calendar_file,
            remote,
        }
    }

    /// Find the date in `text` and report conflicts for it. `today` anchors
    /// year-less dates.
    pub fn check(&self, text: &str, today: NaiveDate) -> ConflictReport {
        let Some(date) = extract_proposed_date(text, today) else {
            debug!("no proposed date found in request");
            return ConflictReport::NoDate;
        };

        let mut conflicts = self.remote_conflicts(date);
        if conflicts.is_empty() {
            conflicts = self.local_conflicts(date);
        }

        debug!(%date, conflicts = conflicts.len(), "conflict check complete");
        if conflicts.is_empty() {
            ConflictReport::Clear { date }
        } else {
            ConflictReport::Conflicts { date, conflicts }
        }
    }

    /// Open remote changes, other than `number`, whose window overlaps
    /// `[start, end]`. Empty when no remote source is configured or it fails.
    pub fn overlapping_changes(
        &self,
        number: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Vec<Conflict> {
        let Some(remote) = &self.remote else {
            debug!("no remote change source, skipping overlap lookup");
            return Vec::new();
        };
        match remote.changes_overlapping(start, end, number) {
            Ok(changes) => changes
                .iter()
                .filter(|c| c.number != number)
                .map(Conflict::from)
                .collect(),
            Err(e) => {
                warn!(error = %e, %number, "overlap lookup failed");
                Vec::new()
            }
        }
    }

    fn remote_conflicts(&self, date: NaiveDate) -> Vec<Conflict> {
        let Some(remote) = &self.remote else {
            return Vec::new();
        };
        match remote.changes_near(date) {
            Ok(changes) => changes
                .iter()
                .filter(|c| c.is_freeze_marker() || c.is_high_risk())
                .map(Conflict::from)
                .collect(),
            Err(e) => {
                warn!(error = %e, "remote conflict lookup failed, falling back to local calendar");
                Vec::new()
            }
        }
    }

    fn local_conflicts(&self, date: NaiveDate) -> Vec<Conflict> {
        if !self.calendar_file.exists() {
            debug!(path = %self.calendar_file.display(), "no local freeze calendar");
            return Vec::new();
        }
        match FreezeCalendar::load(&self.calendar_file) {
            Ok(calendar) => calendar
                .windows_containing(date)
                .into_iter()
                .map(Conflict::from)
                .collect(),
            Err(e) => {
                warn!(
                    path = %self.calendar_file.display(),
                    error = %e,
                    "failed to read freeze calendar"
                );
                Vec::new()
            }
        }
    }
}
