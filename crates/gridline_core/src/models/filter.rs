//! Filter expression models.
//!
//! The wire JSON mirrors what the dashboard's data grid stores in the URL:
//! `{"items": [{"columnField": ..., "operatorValue": ..., "value": ...}],
//! "linkOperator": "and"}`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Report fields the backend accepts in filter and sort expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportField {
    Name,
    Variants,
    Component,
    Capability,
    Environment,
    Tags,
    CurrentWorkingPercentage,
    CurrentPassPercentage,
    CurrentFlakePercentage,
    CurrentFailurePercentage,
    CurrentRuns,
    CurrentFailures,
    CurrentFlakes,
    NetWorkingImprovement,
    PreviousWorkingPercentage,
    PreviousPassPercentage,
    PreviousFlakePercentage,
    PreviousFailurePercentage,
    PreviousRuns,
    PreviousFailures,
    PreviousFlakes,
}

impl ReportField {
    /// The backend's name for this field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Variants => "variants",
            Self::Component => "component",
            Self::Capability => "capability",
            Self::Environment => "environment",
            Self::Tags => "tags",
            Self::CurrentWorkingPercentage => "current_working_percentage",
            Self::CurrentPassPercentage => "current_pass_percentage",
            Self::CurrentFlakePercentage => "current_flake_percentage",
            Self::CurrentFailurePercentage => "current_failure_percentage",
            Self::CurrentRuns => "current_runs",
            Self::CurrentFailures => "current_failures",
            Self::CurrentFlakes => "current_flakes",
            Self::NetWorkingImprovement => "net_working_improvement",
            Self::PreviousWorkingPercentage => "previous_working_percentage",
            Self::PreviousPassPercentage => "previous_pass_percentage",
            Self::PreviousFlakePercentage => "previous_flake_percentage",
            Self::PreviousFailurePercentage => "previous_failure_percentage",
            Self::PreviousRuns => "previous_runs",
            Self::PreviousFailures => "previous_failures",
            Self::PreviousFlakes => "previous_flakes",
        }
    }
}

impl fmt::Display for ReportField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| UnknownField(s.to_string()))
    }
}

/// Error returned when a field name is not part of the backend contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownField(pub String);

impl fmt::Display for UnknownField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown report field: {}", self.0)
    }
}

impl std::error::Error for UnknownField {}

/// Comparison operators the backend understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOperator {
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "equals")]
    Equals,
    #[serde(rename = "starts with")]
    StartsWith,
    #[serde(rename = "ends with")]
    EndsWith,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = ">=")]
    AtLeast,
    #[serde(rename = "<=")]
    AtMost,
    #[serde(rename = "!=")]
    NotEquals,
}

/// A filter value: a string or a number, never anything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Number(f64),
    Text(String),
}

impl FilterValue {
    /// An empty value is pruned before submission.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Number(_) => false,
            Self::Text(s) => s.is_empty(),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for FilterValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// One `{field, operator, value}` triple of a filter expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterItem {
    /// Field being filtered.
    #[serde(rename = "columnField")]
    pub field: ReportField,
    /// Comparison operator.
    #[serde(rename = "operatorValue")]
    pub operator: FilterOperator,
    /// Value to compare against.
    pub value: FilterValue,
}

impl FilterItem {
    /// Create a new filter item.
    pub fn new(field: ReportField, operator: FilterOperator, value: impl Into<FilterValue>) -> Self {
        Self { field, operator, value: value.into() }
    }
}

/// Boolean combinator joining the items of a filter expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkOperator {
    #[default]
    And,
    Or,
}

/// An ordered filter expression plus its boolean combinator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterModel {
    /// Ordered filter items.
    #[serde(default)]
    pub items: Vec<FilterItem>,
    /// How items combine; the backend defaults to `and`.
    #[serde(rename = "linkOperator", default)]
    pub link_operator: LinkOperator,
}

impl FilterModel {
    /// Create an empty filter model.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no items remain after pruning would apply.
    pub fn is_empty(&self) -> bool {
        self.items.iter().all(|item| item.value.is_empty())
    }

    /// Drop items whose value is empty.
    pub fn prune_empty(&mut self) {
        self.items.retain(|item| !item.value.is_empty());
    }

    /// Merge new filters in: last writer wins per field, then empties are
    /// pruned. Merging an empty-valued item therefore clears that field.
    pub fn merge(&mut self, incoming: impl IntoIterator<Item = FilterItem>) {
        for item in incoming {
            self.items.retain(|existing| existing.field != item.field);
            self.items.push(item);
        }
        self.prune_empty();
    }

    /// Quick-search: set a `name contains <text>` filter, replacing any
    /// previous `name` filter. An empty search text clears it.
    pub fn search(&mut self, text: impl Into<String>) {
        self.merge([FilterItem::new(ReportField::Name, FilterOperator::Contains, text.into())]);
    }

    /// Encode for the `filter=` request parameter / `filters` URL parameter.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode from URL/request JSON.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
