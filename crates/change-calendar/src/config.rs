//! Process-wide configuration, loaded once at startup and passed by reference.
//!
//! Values come from an optional TOML file and are then overridden by
//! environment variables:
//!
//! | variable | field |
//! |----------|-------|
//! | `SERVICENOW_INSTANCE` | `servicenow.instance` |
//! | `SERVICENOW_USER` | `servicenow.user` |
//! | `SERVICENOW_PASSWORD` | `servicenow.password` |
//! | `CHANGE_CALENDAR_FILE` | `calendar_file` |
//! | `CHANGE_CALENDAR_TZ` | `timezone` |

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{CalendarError, Result};

pub const DEFAULT_CALENDAR_FILE: &str = "change_calendar.csv";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Connection settings for the remote change-request table.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceNowConfig {
    /// Base URL, e.g. `https://example.service-now.com`.
    pub instance: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Per-request timeout for outbound HTTP calls.
    pub timeout_secs: u64,
}

impl Default for ServiceNowConfig {
    fn default() -> Self {
        Self {
            instance: None,
            user: None,
            password: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for ServiceNowConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceNowConfig")
            .field("instance", &self.instance)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ServiceNowConfig {
    /// `(instance, user, password)` when all three are set and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str, &str)> {
        fn non_empty(v: &Option<String>) -> Option<&str> {
            v.as_deref().filter(|s| !s.trim().is_empty())
        }
        Some((
            non_empty(&self.instance)?,
            non_empty(&self.user)?,
            non_empty(&self.password)?,
        ))
    }

    pub fn is_configured(&self) -> bool {
        self.credentials().is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub servicenow: ServiceNowConfig,
    /// CSV file of freeze/blackout windows.
    pub calendar_file: PathBuf,
    /// IANA timezone in which "today" and "now" are evaluated.
    pub timezone: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            servicenow: ServiceNowConfig::default(),
            calendar_file: PathBuf::from(DEFAULT_CALENDAR_FILE),
            timezone: "UTC".to_string(),
        }
    }
}

impl Config {
    /// Load from `path` (if given), then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::Io`] if the file cannot be read,
    /// [`CalendarError::InvalidConfig`] if it is not valid TOML, or
    /// [`CalendarError::InvalidTimezone`] if the final timezone is unknown.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = fs::read_to_string(path)?;
                let config = Self::from_toml_str(&content)?;
                info!(path = %path.display(), "loaded config");
                config
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.tz()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| CalendarError::InvalidConfig(e.to_string()))
    }

    /// Override fields from a variable lookup (normally the process environment).
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SERVICENOW_INSTANCE") {
            self.servicenow.instance = Some(v);
        }
        if let Some(v) = lookup("SERVICENOW_USER") {
            self.servicenow.user = Some(v);
        }
        if let Some(v) = lookup("SERVICENOW_PASSWORD") {
            self.servicenow.password = Some(v);
        }
        if let Some(v) = lookup("CHANGE_CALENDAR_FILE") {
            self.calendar_file = PathBuf::from(v);
        }
        if let Some(v) = lookup("CHANGE_CALENDAR_TZ") {
            self.timezone = v;
        }
    }

    /// The configured timezone.
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| CalendarError::InvalidTimezone(format!("'{}'", self.timezone)))
    }

    /// Current local wall-clock time in the configured timezone.
    ///
    /// This is the only place the crate reads the system clock.
    pub fn now(&self) -> Result<NaiveDateTime> {
        Ok(Utc::now().with_timezone(&self.tz()?).naive_local())
    }
}
