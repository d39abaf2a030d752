//! Data models for the Gridline controller core.
//!
//! This module contains all core data structures:
//! - `filter` - FilterModel, FilterItem, FilterOperator, ReportField
//! - `sort` - SortSpec, SortDirection
//! - `period` - Period, TimeRange
//! - `query` - QueryState, ScopeKeys
//! - `table` - RowModel, ColumnSet, TableData, FetchOutcome
//! - `fetch` - FetchHandle

pub mod fetch;
pub mod filter;
pub mod period;
pub mod query;
pub mod sort;
pub mod table;

pub use fetch::FetchHandle;
pub use filter::{
    FilterItem, FilterModel, FilterOperator, FilterValue, LinkOperator, ReportField, UnknownField,
};
pub use period::{Period, TimeRange};
pub use query::{QueryState, ScopeKeys};
pub use sort::{SortDirection, SortSpec};
pub use table::{CellModel, ColumnSet, FetchOutcome, RowModel, TableData, NAME_COLUMN};
