//! Remote change-request source backed by the ServiceNow table API.
//!
//! Records are requested with `sysparm_display_value=true`, so every field
//! arrives as the human-readable display string (`"High"`, `"Scheduled"`,
//! `"Jane Doe"`) rather than a sys_id or enum code.

use std::time::Duration;

use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::config::ServiceNowConfig;
use crate::error::{CalendarError, Result};
use crate::period::TimeRange;

const TABLE_PATH: &str = "/api/now/table/change_request";
const NEAR_FIELDS: &str = "number,short_description,start_date,end_date,state,risk";
const LISTING_FIELDS: &str =
    "number,short_description,state,priority,risk,start_date,end_date,assigned_to";
const OVERLAP_FIELDS: &str = "number,short_description,start_date,end_date";
const NEAR_LIMIT: u32 = 10;
const LISTING_LIMIT: u32 = 50;
const OVERLAP_LIMIT: u32 = 5;

/// ServiceNow numeric states for Review, Closed and Canceled.
const CLOSED_STATES: &str = "3,4,7";

/// A change request as returned by the remote table, display values only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    #[serde(default, deserialize_with = "display_string")]
    pub number: String,
    #[serde(default, deserialize_with = "display_string")]
    pub short_description: String,
    #[serde(default, deserialize_with = "display_string")]
    pub state: String,
    #[serde(default, deserialize_with = "display_string")]
    pub priority: String,
    #[serde(default, deserialize_with = "display_string")]
    pub risk: String,
    #[serde(default, deserialize_with = "display_string")]
    pub start_date: String,
    #[serde(default, deserialize_with = "display_string")]
    pub end_date: String,
    #[serde(default, deserialize_with = "display_string")]
    pub assigned_to: String,
}

impl ChangeRecord {
    pub fn is_high_risk(&self) -> bool {
        self.risk.trim().eq_ignore_ascii_case("high")
    }

    /// Whether the description marks this change as a freeze or blackout.
    pub fn is_freeze_marker(&self) -> bool {
        let desc = self.short_description.to_lowercase();
        desc.contains("freeze") || desc.contains("blackout")
    }
}

/// Accept plain strings, `null`, numbers, or reference objects carrying a
/// `display_value`.
fn display_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Object(map)) => map
            .get("display_value")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        Some(other) => other.to_string(),
    })
}

#[derive(Debug, Deserialize)]
struct TableResponse {
    #[serde(default)]
    result: Vec<ChangeRecord>,
}

/// Anything that can answer date-window queries about change requests.
pub trait ChangeSource {
    /// Changes whose window overlaps `date ± 1 day`.
    fn changes_near(&self, date: NaiveDate) -> Result<Vec<ChangeRecord>>;

    /// Changes starting inside `range`, ordered by start date. Past-looking
    /// ranges are restricted to closed changes.
    fn changes_in(&self, range: &TimeRange) -> Result<Vec<ChangeRecord>>;

    /// Open changes other than `exclude` whose window overlaps `[start, end]`.
    fn changes_overlapping(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        exclude: &str,
    ) -> Result<Vec<ChangeRecord>>;
}

/// Blocking HTTP client for the `change_request` table.
pub struct ServiceNowClient {
    table_url: String,
    user: String,
    password: String,
    timeout_secs: u64,
    client: reqwest::blocking::Client,
}

impl ServiceNowClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidConfig`] when instance, user or
    /// password is missing, or [`CalendarError::Remote`] if the HTTP client
    /// cannot be constructed.
    pub fn new(config: &ServiceNowConfig) -> Result<Self> {
        let (instance, user, password) = config.credentials().ok_or_else(|| {
            CalendarError::InvalidConfig(
                "ServiceNow instance, user and password must all be set".to_string(),
            )
        })?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CalendarError::Remote(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            table_url: format!("{}{TABLE_PATH}", instance.trim_end_matches('/')),
            user: user.to_string(),
            password: password.to_string(),
            timeout_secs: config.timeout_secs,
            client,
        })
    }

    fn fetch(&self, params: &[(&str, String)]) -> Result<Vec<ChangeRecord>> {
        debug!(url = %self.table_url, ?params, "querying change_request table");

        let response = self
            .client
            .get(&self.table_url)
            .basic_auth(&self.user, Some(&self.password))
            .header(reqwest::header::ACCEPT, "application/json")
            .query(params)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    CalendarError::Remote(format!(
                        "request timed out after {} seconds",
                        self.timeout_secs
                    ))
                } else {
                    CalendarError::Remote(format!("request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CalendarError::Remote(format!("unexpected status {status}")));
        }

        let body: TableResponse = response
            .json()
            .map_err(|e| CalendarError::Remote(format!("invalid response body: {e}")))?;
        debug!(records = body.result.len(), "change_request query returned");
        Ok(body.result)
    }
}

impl ChangeSource for ServiceNowClient {
    fn changes_near(&self, date: NaiveDate) -> Result<Vec<ChangeRecord>> {
        let query = near_query(date).ok_or_else(|| {
            CalendarError::Remote(format!("date {date} is out of range for a window query"))
        })?;
        self.fetch(&[
            ("sysparm_query", query),
            ("sysparm_fields", NEAR_FIELDS.to_string()),
            ("sysparm_display_value", "true".to_string()),
            ("sysparm_limit", NEAR_LIMIT.to_string()),
        ])
    }

    fn changes_in(&self, range: &TimeRange) -> Result<Vec<ChangeRecord>> {
        self.fetch(&[
            ("sysparm_query", range_query(range)),
            ("sysparm_fields", LISTING_FIELDS.to_string()),
            ("sysparm_display_value", "true".to_string()),
            ("sysparm_limit", LISTING_LIMIT.to_string()),
        ])
    }

    fn changes_overlapping(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        exclude: &str,
    ) -> Result<Vec<ChangeRecord>> {
        self.fetch(&[
            ("sysparm_query", overlap_query(start, end, exclude)),
            ("sysparm_fields", OVERLAP_FIELDS.to_string()),
            ("sysparm_display_value", "true".to_string()),
            ("sysparm_limit", OVERLAP_LIMIT.to_string()),
        ])
    }
}

/// Encoded query for changes overlapping `date ± 1 day`. `^` is AND in an
/// encoded query, so overlap is written as start before the window end and
/// end after the window start.
fn near_query(date: NaiveDate) -> Option<String> {
    let from = date.checked_sub_days(Days::new(1))?.format("%Y-%m-%d");
    let to = date.checked_add_days(Days::new(1))?.format("%Y-%m-%d");
    Some(format!("start_date<={to}^end_date>={from}"))
}

/// Encoded query for open changes, other than `exclude`, overlapping `[start, end]`.
fn overlap_query(start: NaiveDateTime, end: NaiveDateTime, exclude: &str) -> String {
    let start = start.format("%Y-%m-%d %H:%M:%S");
    let end = end.format("%Y-%m-%d %H:%M:%S");
    format!("start_date<={end}^end_date>={start}^number!={exclude}^stateNOT IN{CLOSED_STATES}")
}

/// Encoded query for changes starting inside `range`, oldest first.
fn range_query(range: &TimeRange) -> String {
    let start = range.start.format("%Y-%m-%d %H:%M:%S");
    let end = range.end.format("%Y-%m-%d %H:%M:%S");
    let mut query = format!(
        "start_dateBETWEENjavascript:gs.dateGenerate('{start}')@javascript:gs.dateGenerate('{end}')"
    );
    if range.is_past {
        query.push_str(&format!("^stateIN{CLOSED_STATES}"));
    }
    query.push_str("^ORDERBYstart_date");
    query
}
