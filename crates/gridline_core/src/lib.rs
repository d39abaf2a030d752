//! Remote data-table controller core for the Gridline CI results dashboard.
//!
//! This crate provides the logic layer behind the dashboard's report pages:
//!
//! - **error**: Error handling with request-URL diagnostics
//! - **models**: Filter/sort/period/query state and the renderable table model
//! - **services**: Request composition, fetch with cancellation, response
//!   normalization, URL parameter codecs
//! - **controller**: The parameterized remote data-table controller
//! - **logging**: Structured logging setup
//!
//! Rendering is out of scope: a UI consumes [`FetchOutcome`] and the table
//! models, and feeds user interactions back through
//! [`RemoteTableController`].

pub mod controller;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;

#[cfg(test)]
mod verification_tests;

pub use controller::{RemoteTableController, ViewDefaults};
pub use error::{ErrorInfo, GridlineError};
pub use models::{
    CellModel, ColumnSet, FetchHandle, FetchOutcome, FilterItem, FilterModel, FilterOperator,
    FilterValue, LinkOperator, Period, QueryState, ReportField, RowModel, ScopeKeys,
    SortDirection, SortSpec, TableData, TimeRange, NAME_COLUMN,
};
pub use services::{compose, safe_encode, FetchService, Fetcher, HttpFetcher, UrlState};
