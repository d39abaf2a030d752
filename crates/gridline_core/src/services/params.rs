//! URL query-parameter state.
//!
//! The URL is the single source of truth for filter/sort/period state; these
//! codecs read it with declared defaults and write it back without redundant
//! writes. [`UrlState`] mirrors the browser's `location.search` as an ordered
//! key/value list.

use crate::models::{FilterModel, Period, SortSpec};
use crate::services::compose::safe_encode;

use percent_encoding::percent_decode_str;

/// URL parameter carrying the JSON-encoded filter model.
pub const FILTERS_PARAM: &str = "filters";
/// URL parameter carrying the sort direction.
pub const SORT_PARAM: &str = "sort";
/// URL parameter carrying the sort field.
pub const SORT_FIELD_PARAM: &str = "sortField";
/// URL parameter carrying the reporting period.
pub const PERIOD_PARAM: &str = "period";

/// Ordered key/value view over a URL query string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UrlState {
    pairs: Vec<(String, String)>,
}

impl UrlState {
    /// An empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query string (with or without the leading `?`).
    pub fn from_query(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        let pairs = raw
            .split('&')
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
                (decode(key), decode(value))
            })
            .collect();
        Self { pairs }
    }

    /// Get a parameter value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Set a parameter, returning true only when the stored value changed.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| k == key) {
            Some(pair) => {
                if pair.1 == value {
                    return false;
                }
                pair.1 = value;
                true
            }
            None => {
                self.pairs.push((key.to_string(), value));
                true
            }
        }
    }

    /// Remove a parameter, returning true when it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.pairs.len();
        self.pairs.retain(|(k, _)| k != key);
        self.pairs.len() != before
    }

    /// Render back to a query string (no leading `?`), values encoded.
    pub fn to_query(&self) -> String {
        self.pairs
            .iter()
            .map(|(key, value)| format!("{key}={}", safe_encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn decode(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

// ========== Typed readers (defaults applied when absent or malformed) ==========

/// Read the reporting period.
pub fn read_period(url: &UrlState, default: Period) -> Period {
    url.get(PERIOD_PARAM).and_then(|raw| raw.parse().ok()).unwrap_or(default)
}

/// Read the sort spec from its two parameters.
pub fn read_sort(url: &UrlState, default: SortSpec) -> SortSpec {
    let field = url.get(SORT_FIELD_PARAM).and_then(|raw| raw.parse().ok()).unwrap_or(default.field);
    let direction = url.get(SORT_PARAM).and_then(|raw| raw.parse().ok()).unwrap_or(default.direction);
    SortSpec::new(field, direction)
}

/// Read the filter model; malformed JSON falls back to the default rather
/// than erroring, matching the dashboard's lenient param decoding.
pub fn read_filters(url: &UrlState, default: &FilterModel) -> FilterModel {
    url.get(FILTERS_PARAM)
        .and_then(|raw| FilterModel::from_json(raw).ok())
        .unwrap_or_else(|| default.clone())
}

// ========== Typed writers ==========

/// Write the period; returns true when the URL changed.
pub fn write_period(url: &mut UrlState, period: Period) -> bool {
    url.set(PERIOD_PARAM, period.as_str())
}

/// Write the sort spec; returns true when the URL changed. Writing the
/// current sort again is a no-op.
pub fn write_sort(url: &mut UrlState, sort: SortSpec) -> bool {
    let field_changed = url.set(SORT_FIELD_PARAM, sort.field.as_str());
    let direction_changed = url.set(SORT_PARAM, sort.direction.as_str());
    field_changed || direction_changed
}

/// Write the filter model; an empty model removes the parameter entirely.
pub fn write_filters(url: &mut UrlState, filters: &FilterModel) -> Result<bool, serde_json::Error> {
    if filters.items.is_empty() {
        Ok(url.remove(FILTERS_PARAM))
    } else {
        Ok(url.set(FILTERS_PARAM, filters.to_json()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FilterItem, FilterOperator, ReportField, SortDirection};

    #[test]
    fn query_string_round_trips() {
        let mut url = UrlState::new();
        url.set("period", "twoDay");
        url.set("component", "kube-apiserver (auth)");
        let reparsed = UrlState::from_query(&url.to_query());
        assert_eq!(reparsed, url);
        assert_eq!(reparsed.get("component"), Some("kube-apiserver (auth)"));
    }

    #[test]
    fn leading_question_mark_is_accepted() {
        let url = UrlState::from_query("?sort=desc&sortField=name");
        assert_eq!(url.get("sort"), Some("desc"));
        assert_eq!(url.get("sortField"), Some("name"));
    }

    #[test]
    fn defaults_apply_when_absent_or_malformed() {
        let url = UrlState::from_query("period=fortnight&filters=not-json");
        assert_eq!(read_period(&url, Period::Default), Period::Default);
        let sort = read_sort(&url, SortSpec::default());
        assert_eq!(sort, SortSpec::default());
        let filters = read_filters(&url, &FilterModel::default());
        assert!(filters.items.is_empty());
    }

    #[test]
    fn filters_round_trip_through_the_url() {
        let mut filters = FilterModel::default();
        filters.merge([
            FilterItem::new(ReportField::Name, FilterOperator::Contains, "etcd"),
            FilterItem::new(ReportField::CurrentRuns, FilterOperator::GreaterThan, 10.0),
            FilterItem::new(ReportField::Tags, FilterOperator::Equals, ""),
        ]);

        let mut url = UrlState::new();
        write_filters(&mut url, &filters).expect("encode");
        let reparsed = UrlState::from_query(&url.to_query());
        let decoded = read_filters(&reparsed, &FilterModel::default());

        // Equal modulo the pruned empty-value item, which merge dropped.
        assert_eq!(decoded, filters);
        assert_eq!(decoded.items.len(), 2);
    }

    #[test]
    fn redundant_sort_write_is_suppressed() {
        let mut url = UrlState::new();
        assert!(write_sort(&mut url, SortSpec::default()));
        assert!(!write_sort(&mut url, SortSpec::default()));
        assert!(write_sort(
            &mut url,
            SortSpec::new(ReportField::Name, SortDirection::Desc)
        ));
    }

    #[test]
    fn empty_filter_model_removes_the_parameter() {
        let mut url = UrlState::new();
        let mut filters = FilterModel::default();
        filters.merge([FilterItem::new(ReportField::Name, FilterOperator::Contains, "x")]);
        write_filters(&mut url, &filters).expect("encode");
        assert!(url.get(FILTERS_PARAM).is_some());

        write_filters(&mut url, &FilterModel::default()).expect("encode");
        assert!(url.get(FILTERS_PARAM).is_none());
    }
}
