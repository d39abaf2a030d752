//! Aggregate query state for one report view.

use crate::models::filter::FilterModel;
use crate::models::period::{Period, TimeRange};
use crate::models::sort::SortSpec;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// View-specific scoping keys narrowing a report to one slice of the data.
///
/// Emitted into the request in a fixed order: component, capability,
/// environment. All are optional; the same controller serves every page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ScopeKeys {
    /// Selected component, if the view is scoped to one.
    pub component: Option<String>,
    /// Selected capability, if the view is scoped to one.
    pub capability: Option<String>,
    /// Selected environment, if the view is scoped to one.
    pub environment: Option<String>,
}

impl ScopeKeys {
    /// Scope to a component.
    pub fn component(name: impl Into<String>) -> Self {
        Self { component: Some(name.into()), ..Self::default() }
    }

    /// Scope to a component within an environment.
    pub fn component_in_environment(
        component: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            component: Some(component.into()),
            capability: None,
            environment: Some(environment.into()),
        }
    }

    /// The populated `(key, value)` pairs in request order.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("component", self.component.as_deref()),
            ("capability", self.capability.as_deref()),
            ("environment", self.environment.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
    }
}

/// The complete, URL-persisted description of what data to retrieve and how
/// to present it. The URL owns this; the controller reads and writes it but
/// never keeps a private copy that could drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryState {
    /// Active filter expression.
    pub filters: FilterModel,
    /// Active sort column and direction.
    pub sort: SortSpec,
    /// Human-relative period the time range was derived from.
    pub period: Period,
    /// Resolved time range; fixed at state-build time so composition stays
    /// a pure function of the state.
    pub time_range: TimeRange,
    /// Page size; 0 means unlimited and is omitted from the request.
    pub limit: u32,
    /// View-specific scoping keys.
    pub scope: ScopeKeys,
}

impl QueryState {
    /// Build state for a period, resolving its time range against `now`.
    pub fn new(period: Period, now: DateTime<Utc>) -> Self {
        Self {
            filters: FilterModel::default(),
            sort: SortSpec::default(),
            period,
            time_range: period.resolve(now),
            limit: 0,
            scope: ScopeKeys::default(),
        }
    }

    /// Replace the resolved time range with explicit bounds.
    pub fn with_time_range(mut self, range: TimeRange) -> Self {
        self.time_range = range;
        self
    }

    /// Set the scoping keys.
    pub fn with_scope(mut self, scope: ScopeKeys) -> Self {
        self.scope = scope;
        self
    }

    /// Set the page size.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Switch period, re-resolving the time range against `now`.
    pub fn set_period(&mut self, period: Period, now: DateTime<Utc>) {
        self.period = period;
        self.time_range = period.resolve(now);
    }
}
