//! Freeze and blackout windows loaded from a flat CSV calendar.
//!
//! Expected columns: `event_name,event_type,start_date,end_date,description`.
//! `event_type` and `description` may be omitted; dates are `YYYY-MM-DD`.
//! Rows that fail to parse are logged and skipped so one bad line does not
//! hide the rest of the calendar.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;

/// A date range during which changes are prohibited or flagged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreezeWindow {
    pub event_name: String,
    #[serde(default = "default_event_type")]
    pub event_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub description: String,
}

fn default_event_type() -> String {
    "freeze".to_string()
}

impl FreezeWindow {
    /// Whether `date` falls inside the window, both bounds inclusive.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// The full set of known freeze windows. Read-only once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreezeCalendar {
    windows: Vec<FreezeWindow>,
}

impl FreezeCalendar {
    pub fn new(windows: Vec<FreezeWindow>) -> Self {
        Self { windows }
    }

    /// Load the calendar from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::Io`](crate::CalendarError::Io) if the file
    /// cannot be opened, or [`CalendarError::Csv`](crate::CalendarError::Csv)
    /// if its header cannot be read. Individual bad rows are skipped, not
    /// reported as errors.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let calendar = Self::from_reader(file)?;
        debug!(
            path = %path.display(),
            windows = calendar.windows.len(),
            "loaded freeze calendar"
        );
        Ok(calendar)
    }

    /// Parse a calendar from any CSV source.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        // Surface header problems as an error rather than per-row noise.
        csv_reader.headers()?;

        let mut windows = Vec::new();
        for (index, row) in csv_reader.deserialize::<FreezeWindow>().enumerate() {
            match row {
                Ok(window) if window.start_date <= window.end_date => windows.push(window),
                Ok(window) => warn!(
                    row = index + 1,
                    event = %window.event_name,
                    "skipping freeze window that ends before it starts"
                ),
                Err(e) => warn!(row = index + 1, error = %e, "skipping unparseable calendar row"),
            }
        }

        Ok(Self { windows })
    }

    pub fn windows(&self) -> &[FreezeWindow] {
        &self.windows
    }

    /// All windows whose inclusive range covers `date`, in file order.
    pub fn windows_containing(&self, date: NaiveDate) -> Vec<&FreezeWindow> {
        self.windows.iter().filter(|w| w.contains(date)).collect()
    }
}
