//! Reporting periods and the time ranges they resolve to.

use crate::error::GridlineError;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Human-relative reporting period accepted by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Period {
    /// The dashboard's standard 7-day window.
    #[default]
    #[serde(rename = "default")]
    Default,
    /// Last two days.
    #[serde(rename = "twoDay")]
    TwoDay,
    /// Last thirty days.
    #[serde(rename = "thirtyDay")]
    ThirtyDay,
}

impl Period {
    /// The backend's name for this period.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::TwoDay => "twoDay",
            Self::ThirtyDay => "thirtyDay",
        }
    }

    /// Length of the window this period covers.
    fn window(&self) -> Duration {
        match self {
            Self::Default => Duration::days(7),
            Self::TwoDay => Duration::days(2),
            Self::ThirtyDay => Duration::days(30),
        }
    }

    /// Resolve to a concrete time range ending at `now`.
    pub fn resolve(&self, now: DateTime<Utc>) -> TimeRange {
        // The window is always positive, so the invariant holds.
        TimeRange { start: now - self.window(), end: now }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Self::Default),
            "twoDay" => Ok(Self::TwoDay),
            "thirtyDay" => Ok(Self::ThirtyDay),
            _ => Err(()),
        }
    }
}

/// A pair of RFC3339 instants with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    /// Create a range from explicit bounds.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, GridlineError> {
        if start > end {
            return Err(GridlineError::invalid_query(format!(
                "time range start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Range start.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Range end.
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// RFC3339 rendering of the start, second precision, Z suffix.
    pub fn start_rfc3339(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// RFC3339 rendering of the end, second precision, Z suffix.
    pub fn end_rfc3339(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}
