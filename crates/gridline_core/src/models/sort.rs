//! Sort models. Single-column sort only.

use crate::models::filter::ReportField;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sort direction for the active sort column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// The backend's name for this direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(()),
        }
    }
}

/// The active sort column and direction. At most one per view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    /// Field to sort on.
    pub field: ReportField,
    /// Direction to sort in.
    pub direction: SortDirection,
}

impl SortSpec {
    /// Create a new sort spec.
    pub fn new(field: ReportField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Apply a sort change, returning true only when something changed.
    ///
    /// Used by the state synchronizer to avoid redundant URL writes when the
    /// requested sort equals the current one.
    pub fn update(&mut self, next: SortSpec) -> bool {
        if *self == next {
            return false;
        }
        *self = next;
        true
    }
}

impl Default for SortSpec {
    /// The dashboard's default: worst current working percentage first.
    fn default() -> Self {
        Self::new(ReportField::CurrentWorkingPercentage, SortDirection::Asc)
    }
}
