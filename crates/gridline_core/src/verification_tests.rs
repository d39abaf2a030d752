//! Lifecycle verification tests for the remote data-table controller.
//!
//! These exercise the cross-module guarantees that the per-module unit tests
//! cannot: the at-most-one-outstanding invariant, cancel-then-respond
//! ordering, stale-response discard across navigation, and the rule that
//! user state changes are applied before the next fetch is issued.

use crate::controller::RemoteTableController;
use crate::error::GridlineError;
use crate::models::{FetchOutcome, FilterItem, FilterOperator, Period, ReportField, ScopeKeys};
use crate::services::{Fetcher, UrlState};

use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::oneshot;

const ENDPOINT: &str = "https://sippy.example.com/api/capabilities";

/// One scripted response: a payload, an optional "fetch started" signal, and
/// an optional gate the test must release before the payload is returned.
struct Scripted {
    payload: Value,
    started: Option<oneshot::Sender<()>>,
    release: Option<oneshot::Receiver<()>>,
}

impl Scripted {
    fn immediate(payload: Value) -> Self {
        Self { payload, started: None, release: None }
    }

    fn gated(payload: Value) -> (Self, oneshot::Receiver<()>, oneshot::Sender<()>) {
        let (started_tx, started_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        (Self { payload, started: Some(started_tx), release: Some(release_rx) }, started_rx, release_tx)
    }
}

/// Fetcher whose responses are consumed in script order; it also records
/// every request URL it sees.
struct ScriptedFetcher {
    script: Mutex<VecDeque<Scripted>>,
    seen: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    fn new(script: impl IntoIterator<Item = Scripted>) -> Self {
        Self { script: Mutex::new(script.into_iter().collect()), seen: Mutex::new(Vec::new()) }
    }

    fn seen_urls(&self) -> Vec<String> {
        self.seen.lock().clone()
    }
}

impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<Value, GridlineError> {
        self.seen.lock().push(url.to_string());
        let next = self.script.lock().pop_front();
        let Some(mut scripted) = next else {
            return Ok(json!({}));
        };
        if let Some(started) = scripted.started.take() {
            let _ = started.send(());
        }
        if let Some(release) = scripted.release.take() {
            // Held back until the test releases (or drops) the gate.
            let _ = release.await;
        }
        Ok(scripted.payload)
    }
}

fn capability_rows(name: &str) -> Value {
    json!({"rows": [{"capability": name, "columns": [{"name": "aws"}]}]})
}

fn loaded_row_name(outcome: &FetchOutcome) -> Option<&str> {
    match outcome {
        FetchOutcome::Loaded(data) => data.rows.first().map(|row| row.name.as_str()),
        _ => None,
    }
}

#[tokio::test]
async fn superseding_a_loading_request_settles_on_the_latest_start() {
    let (slow, started, _release) = Scripted::gated(capability_rows("stale"));
    let fetcher = ScriptedFetcher::new([slow, Scripted::immediate(capability_rows("fresh"))]);
    let controller =
        Arc::new(RemoteTableController::new(fetcher, ENDPOINT).expect("valid endpoint"));

    let first = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.refresh(chrono::Utc::now()).await })
    };
    started.await.expect("first fetch must start");

    // Second start while the first is still Loading.
    let second = controller.refresh(chrono::Utc::now()).await;
    assert_eq!(loaded_row_name(&second), Some("fresh"));

    // The superseded call observes the newer applied outcome, not its own.
    let first = first.await.expect("task");
    assert_ne!(loaded_row_name(&first), Some("stale"));

    // Exactly one terminal outcome is visible, and it is the latest one.
    assert_eq!(loaded_row_name(&controller.outcome()), Some("fresh"));
}

#[tokio::test]
async fn cancel_before_the_response_arrives_yields_cancelled() {
    let (slow, started, release) = Scripted::gated(capability_rows("late"));
    let fetcher = ScriptedFetcher::new([slow]);
    let controller =
        Arc::new(RemoteTableController::new(fetcher, ENDPOINT).expect("valid endpoint"));

    let pending = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.refresh(chrono::Utc::now()).await })
    };
    started.await.expect("fetch must start");

    controller.cancel();
    // The response arrives after the cancel; it must never surface.
    let _ = release.send(());

    let outcome = pending.await.expect("task");
    assert_eq!(outcome, FetchOutcome::Cancelled);
    assert_eq!(controller.outcome(), FetchOutcome::Cancelled);
}

#[tokio::test]
async fn a_new_request_after_cancel_uses_a_fresh_handle() {
    let (slow, started, _release) = Scripted::gated(capability_rows("cancelled"));
    let fetcher = ScriptedFetcher::new([slow, Scripted::immediate(capability_rows("retry"))]);
    let controller =
        Arc::new(RemoteTableController::new(fetcher, ENDPOINT).expect("valid endpoint"));

    let pending = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.refresh(chrono::Utc::now()).await })
    };
    started.await.expect("fetch must start");
    controller.cancel();
    pending.await.expect("task");

    // The fired token from the cancelled request must not bleed into this one.
    let retried = controller.refresh(chrono::Utc::now()).await;
    assert_eq!(loaded_row_name(&retried), Some("retry"));
}

#[tokio::test]
async fn stale_response_never_lands_after_navigating_to_a_new_scope() {
    let (slow, started, release) = Scripted::gated(capability_rows("component-a"));
    let fetcher = ScriptedFetcher::new([slow, Scripted::immediate(capability_rows("component-b"))]);
    let controller =
        Arc::new(RemoteTableController::new(fetcher, ENDPOINT).expect("valid endpoint"));
    controller.navigate(ScopeKeys::component("a"), UrlState::new());

    let pending = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.refresh(chrono::Utc::now()).await })
    };
    started.await.expect("fetch must start");

    // Navigate to component B while A's fetch is still pending.
    controller.navigate(ScopeKeys::component("b"), UrlState::new());
    let _ = release.send(());
    pending.await.expect("task");

    // A's rows must not render under B's heading.
    assert_eq!(controller.outcome(), FetchOutcome::Pending);

    let loaded = controller.refresh(chrono::Utc::now()).await;
    assert_eq!(loaded_row_name(&loaded), Some("component-b"));
}

#[tokio::test]
async fn state_changes_are_applied_before_the_next_fetch() {
    let fetcher = ScriptedFetcher::new([]);
    let controller = RemoteTableController::new(fetcher, ENDPOINT).expect("valid endpoint");

    controller
        .merge_filters([FilterItem::new(ReportField::Name, FilterOperator::Contains, "etcd")])
        .expect("merge");
    controller.set_period(Period::TwoDay);
    controller.refresh(chrono::Utc::now()).await;

    // The composed request reflects both state writes.
    let urls = controller.fetcher().seen_urls();
    assert_eq!(urls.len(), 1);
    assert!(urls[0].contains("filter="), "filter missing from {}", urls[0]);
    assert!(urls[0].contains("period=twoDay"), "period missing from {}", urls[0]);
}
