//! # change-calendar
//!
//! Change-window arithmetic for ITSM assistants.
//!
//! Turns the loose date language people use when asking about changes
//! ("what's planned next week?", "can I deploy on December 24?") into
//! concrete intervals, and checks proposed dates against freeze/blackout
//! windows and risky changes.
//!
//! ## Modules
//!
//! - [`period`] - Free-text phrase → `[start, end]` time range with past/future flag
//! - [`proposed_date`] - Free text → single proposed change date
//! - [`freeze`] - Freeze/blackout windows from a CSV calendar
//! - [`servicenow`] - Remote change-request source (ServiceNow table API)
//! - [`conflict`] - Proposed date → conflicts → user-facing message, plus change-window overlaps
//! - [`scheduled`] - Time period → listing of scheduled or completed changes
//! - [`intent`] - Keyword routing between conflict checks and listings
//! - [`config`] - Explicit configuration loaded once at startup
//! - [`error`] - Error types

pub mod config;
pub mod conflict;
pub mod error;
pub mod freeze;
pub mod intent;
pub mod period;
pub mod proposed_date;
pub mod scheduled;
pub mod servicenow;

pub use config::{Config, ServiceNowConfig};
pub use conflict::{render_overlaps, Conflict, ConflictChecker, ConflictReport};
pub use error::CalendarError;
pub use freeze::{FreezeCalendar, FreezeWindow};
pub use intent::{classify, Intent};
pub use period::{resolve_period, TimeRange};
pub use proposed_date::extract_proposed_date;
pub use scheduled::{scheduled_changes, ScheduleListing};
pub use servicenow::{ChangeRecord, ChangeSource, ServiceNowClient};
