//! The remote data-table controller.
//!
//! One [`RemoteTableController`] instance drives one report view. It owns the
//! pieces the dashboard's report pages used to duplicate: URL-backed query
//! state, the
//! at-most-one-outstanding fetch discipline, and the generation guard that
//! keeps a superseded response from clobbering a newer one. Scoping keys
//! parameterize the view, so the component, capability, and environment pages
//! all share this one controller.

use crate::error::GridlineError;
use crate::models::{
    FetchHandle, FetchOutcome, FilterItem, FilterModel, Period, QueryState, ScopeKeys, SortSpec,
};
use crate::services::{compose, params, FetchService, Fetcher, UrlState};

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use url::Url;

/// Per-view defaults applied when a URL parameter is absent or malformed.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewDefaults {
    /// Default reporting period.
    pub period: Period,
    /// Default sort column and direction.
    pub sort: SortSpec,
    /// Default filter model.
    pub filters: FilterModel,
    /// Default page size; 0 means unlimited.
    pub limit: u32,
}

impl Default for ViewDefaults {
    fn default() -> Self {
        Self {
            period: Period::Default,
            sort: SortSpec::default(),
            filters: FilterModel::default(),
            limit: 0,
        }
    }
}

/// Controller for one remote data-table view.
///
/// The cancellation handle and generation counter are scoped to this
/// instance: created with it, reset by [`teardown`](Self::teardown), never
/// shared across views. The URL parameter state is the single source of
/// truth for filters, sort, and period; the controller reads it on every
/// refresh instead of keeping a private copy that could drift.
pub struct RemoteTableController<F: Fetcher> {
    fetcher: F,
    endpoint: String,
    defaults: ViewDefaults,
    /// Scoping keys identifying the current view.
    scope: RwLock<ScopeKeys>,
    /// URL-backed query parameters.
    params: RwLock<UrlState>,
    /// Latest applied outcome for the current generation.
    outcome: RwLock<FetchOutcome>,
    /// Monotonic request generation; bumped per refresh and per reset.
    generation: AtomicU64,
    /// The in-flight request, if any. At most one at a time.
    current: Mutex<Option<Arc<FetchHandle>>>,
}

impl<F: Fetcher> RemoteTableController<F> {
    /// Create a controller for `endpoint` with default view settings.
    pub fn new(fetcher: F, endpoint: impl Into<String>) -> Result<Self, GridlineError> {
        Self::with_defaults(fetcher, endpoint, ViewDefaults::default())
    }

    /// Create a controller with explicit per-view defaults.
    pub fn with_defaults(
        fetcher: F,
        endpoint: impl Into<String>,
        defaults: ViewDefaults,
    ) -> Result<Self, GridlineError> {
        let endpoint = endpoint.into();
        Url::parse(&endpoint)?;
        Ok(Self {
            fetcher,
            endpoint,
            defaults,
            scope: RwLock::new(ScopeKeys::default()),
            params: RwLock::new(UrlState::new()),
            outcome: RwLock::new(FetchOutcome::Pending),
            generation: AtomicU64::new(0),
            current: Mutex::new(None),
        })
    }

    // ========== State reads ==========

    /// The endpoint this controller queries.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The transport this controller fetches through.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Build the current query state from the URL parameters, scope, and
    /// defaults, resolving the period against `now`.
    pub fn query_state(&self, now: DateTime<Utc>) -> QueryState {
        let url = self.params.read();
        let period = params::read_period(&url, self.defaults.period);
        let mut state = QueryState::new(period, now)
            .with_scope(self.scope.read().clone())
            .with_limit(self.defaults.limit);
        state.sort = params::read_sort(&url, self.defaults.sort);
        state.filters = params::read_filters(&url, &self.defaults.filters);
        state
    }

    /// Latest outcome for the current view generation.
    pub fn outcome(&self) -> FetchOutcome {
        self.outcome.read().clone()
    }

    /// The URL query string the current state persists as.
    pub fn url_query(&self) -> String {
        self.params.read().to_query()
    }

    // ========== State writes (URL is the source of truth) ==========

    /// Merge filters in: last writer wins per field, empties pruned.
    /// Returns true when the URL changed.
    pub fn merge_filters(
        &self,
        items: impl IntoIterator<Item = FilterItem>,
    ) -> Result<bool, GridlineError> {
        let mut url = self.params.write();
        let mut filters = params::read_filters(&url, &self.defaults.filters);
        filters.merge(items);
        params::write_filters(&mut url, &filters)
            .map_err(|e| GridlineError::invalid_query(format!("unencodable filter: {e}")))
    }

    /// Quick-search on the name field; empty text clears the search filter.
    pub fn search(&self, text: impl Into<String>) -> Result<bool, GridlineError> {
        let mut url = self.params.write();
        let mut filters = params::read_filters(&url, &self.defaults.filters);
        filters.search(text);
        params::write_filters(&mut url, &filters)
            .map_err(|e| GridlineError::invalid_query(format!("unencodable filter: {e}")))
    }

    /// Set the sort; writing the current sort again is a no-op and returns
    /// false so callers can skip a redundant refresh.
    pub fn set_sort(&self, sort: SortSpec) -> bool {
        params::write_sort(&mut self.params.write(), sort)
    }

    /// Set the reporting period; returns true when the URL changed.
    pub fn set_period(&self, period: Period) -> bool {
        params::write_period(&mut self.params.write(), period)
    }

    // ========== Navigation ==========

    /// Adopt a new view identity and its URL parameters.
    ///
    /// When the scope actually changes, any in-flight request is cancelled,
    /// the generation is bumped so its late response can never land, and the
    /// outcome resets to not-loaded so stale rows never render under a new
    /// heading. Returns true when such a reset happened.
    pub fn navigate(&self, scope: ScopeKeys, url: UrlState) -> bool {
        let changed = *self.scope.read() != scope;
        if changed {
            tracing::debug!(endpoint = %self.endpoint, "View identity changed; resetting");
            self.reset();
            *self.scope.write() = scope;
        }
        *self.params.write() = url;
        changed
    }

    /// Cancel the in-flight request, if any. The next refresh mints a fresh
    /// handle; a fired token is never reused.
    pub fn cancel(&self) {
        if let Some(handle) = self.current.lock().as_ref() {
            handle.cancel();
        }
    }

    /// Release the view: cancel outstanding work and invalidate the
    /// generation so nothing from this lifetime can apply later.
    pub fn teardown(&self) {
        self.reset();
    }

    fn reset(&self) {
        let mut current = self.current.lock();
        if let Some(handle) = current.take() {
            handle.cancel();
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.outcome.write() = FetchOutcome::Pending;
    }

    // ========== Fetch lifecycle ==========

    /// Compose and run one request for the current state, superseding any
    /// request still in flight.
    ///
    /// Returns the outcome that ended up applied for this view: the request's
    /// own outcome when it is still the newest, or the newer generation's
    /// outcome when this request was superseded mid-flight.
    pub async fn refresh(&self, now: DateTime<Utc>) -> FetchOutcome {
        let state = self.query_state(now);
        let request_url = match compose(&self.endpoint, &state) {
            Ok(url) => url,
            Err(err) => {
                let outcome = FetchOutcome::Failed(err.to_string());
                *self.outcome.write() = outcome.clone();
                return outcome;
            }
        };

        // Supersede before suspending: cancel the previous handle and make
        // this request the only live one.
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let handle = Arc::new(FetchHandle::new(generation, request_url));
        {
            let mut current = self.current.lock();
            if let Some(previous) = current.take() {
                tracing::debug!(
                    superseded = %previous.id(),
                    by = %handle.id(),
                    "Superseding in-flight request"
                );
                previous.cancel();
            }
            *current = Some(handle.clone());
        }
        *self.outcome.write() = FetchOutcome::Pending;

        let outcome = FetchService::execute(&self.fetcher, &handle).await;
        self.apply(&handle, outcome)
    }

    /// Apply a settled outcome, unless the request's generation is stale.
    /// The apply is atomic: the renderer sees either the old outcome or the
    /// new one, never a partial row/column update.
    fn apply(&self, handle: &FetchHandle, outcome: FetchOutcome) -> FetchOutcome {
        let mut current = self.current.lock();
        if handle.generation() != self.generation.load(Ordering::SeqCst) {
            tracing::debug!(
                request_id = %handle.id(),
                generation = handle.generation(),
                "Stale response discarded"
            );
            return self.outcome.read().clone();
        }
        *self.outcome.write() = outcome.clone();
        *current = None;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FilterOperator, ReportField, SortDirection};
    use serde_json::{json, Value};

    struct StaticFetcher(Value);

    impl Fetcher for StaticFetcher {
        async fn fetch(&self, _url: &str) -> Result<Value, GridlineError> {
            Ok(self.0.clone())
        }
    }

    fn controller() -> RemoteTableController<StaticFetcher> {
        RemoteTableController::new(
            StaticFetcher(json!({"rows": [{"capability": "install", "columns": [{"name": "aws"}]}]})),
            "https://sippy.example.com/api/capabilities",
        )
        .expect("valid endpoint")
    }

    #[test]
    fn invalid_endpoint_is_rejected_at_construction() {
        let result = RemoteTableController::new(StaticFetcher(json!({})), "::nope::");
        assert!(result.is_err());
    }

    #[test]
    fn query_state_reads_url_with_defaults() {
        let c = controller();
        c.navigate(
            ScopeKeys::component("etcd"),
            UrlState::from_query("period=twoDay&sortField=name&sort=desc"),
        );
        let state = c.query_state(Utc::now());
        assert_eq!(state.period, Period::TwoDay);
        assert_eq!(state.sort, SortSpec::new(ReportField::Name, SortDirection::Desc));
        assert_eq!(state.scope.component.as_deref(), Some("etcd"));
        assert!(state.filters.items.is_empty());
    }

    #[test]
    fn filter_writes_land_in_the_url() {
        let c = controller();
        let changed = c
            .merge_filters([FilterItem::new(ReportField::Name, FilterOperator::Contains, "etcd")])
            .expect("merge");
        assert!(changed);
        assert!(c.url_query().contains("filters="));

        // Round-trip back out of the URL.
        let state = c.query_state(Utc::now());
        assert_eq!(state.filters.items.len(), 1);
        assert_eq!(state.filters.items[0].field, ReportField::Name);
    }

    #[test]
    fn redundant_sort_write_is_reported_as_noop() {
        let c = controller();
        assert!(c.set_sort(SortSpec::default()));
        assert!(!c.set_sort(SortSpec::default()));
    }

    #[tokio::test]
    async fn refresh_applies_the_loaded_outcome() {
        let c = controller();
        let outcome = c.refresh(Utc::now()).await;
        assert!(matches!(outcome, FetchOutcome::Loaded(_)));
        assert_eq!(c.outcome(), outcome);
    }

    #[tokio::test]
    async fn navigation_to_a_new_scope_resets_loaded_state() {
        let c = controller();
        c.navigate(ScopeKeys::component("etcd"), UrlState::new());
        c.refresh(Utc::now()).await;
        assert!(matches!(c.outcome(), FetchOutcome::Loaded(_)));

        let reset = c.navigate(ScopeKeys::component("kube-apiserver"), UrlState::new());
        assert!(reset);
        assert_eq!(c.outcome(), FetchOutcome::Pending);
    }

    #[tokio::test]
    async fn navigation_to_the_same_scope_keeps_state() {
        let c = controller();
        c.navigate(ScopeKeys::component("etcd"), UrlState::new());
        c.refresh(Utc::now()).await;

        let reset = c.navigate(ScopeKeys::component("etcd"), UrlState::from_query("period=twoDay"));
        assert!(!reset);
        assert!(matches!(c.outcome(), FetchOutcome::Loaded(_)));
    }

    #[tokio::test]
    async fn teardown_invalidates_the_view() {
        let c = controller();
        c.refresh(Utc::now()).await;
        c.teardown();
        assert_eq!(c.outcome(), FetchOutcome::Pending);
    }
}
