//! Error types for change-calendar operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Calendar file error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Remote change source error: {0}")]
    Remote(String),
}

pub type Result<T> = std::result::Result<T, CalendarError>;
