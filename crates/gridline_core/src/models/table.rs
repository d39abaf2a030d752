//! Renderable table models and the fetch outcome that carries them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The fixed leading column every report table carries.
pub const NAME_COLUMN: &str = "Name";

/// One cell of a report row: the column it belongs to plus whatever metric
/// keys the server sent for it. The metric set is server-defined and not
/// statically known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellModel {
    /// Column this cell renders under.
    pub column: String,
    /// Server-defined metrics for the cell.
    pub metrics: Map<String, Value>,
}

/// One table row, keyed by the server-assigned identity (capability or test
/// name).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowModel {
    /// Stable row key, as assigned by the server.
    pub name: String,
    /// Cells, one per column the server reported for this row.
    pub cells: Vec<CellModel>,
}

impl RowModel {
    /// Look up the cell for a column, if the server sent one.
    pub fn cell(&self, column: &str) -> Option<&CellModel> {
        self.cells.iter().find(|cell| cell.column == column)
    }
}

/// The ordered list of displayable columns derived from a response payload.
///
/// `"Name"` is always first and never duplicated; the rest is the union of
/// column names across all rows, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSet(Vec<String>);

impl ColumnSet {
    /// The column set of a headers-only table.
    pub fn name_only() -> Self {
        Self(vec![NAME_COLUMN.to_string()])
    }

    /// Derive the column set from normalized rows.
    pub fn from_rows(rows: &[RowModel]) -> Self {
        let mut columns = Self::name_only();
        for row in rows {
            for cell in &row.cells {
                // Nameless cells carry metrics but no displayable column.
                if !cell.column.is_empty() {
                    columns.push_unique(&cell.column);
                }
            }
        }
        columns
    }

    fn push_unique(&mut self, column: &str) {
        if !self.0.iter().any(|existing| existing == column) {
            self.0.push(column.to_string());
        }
    }

    /// Column names in render order.
    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// Number of columns, including the leading name column.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// A column set is never truly empty; it always has the name column.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A fully normalized, renderable table: headers plus rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    /// Ordered displayable columns.
    pub columns: ColumnSet,
    /// Normalized rows.
    pub rows: Vec<RowModel>,
}

/// Terminal or pending state of one data-retrieval attempt.
///
/// Exactly one variant is active per request; within a request's lifetime
/// transitions are monotonic (nothing reverts to `Pending`). Superseding
/// requests and navigation resets start a new lifetime under a new
/// generation.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Request in flight (or not yet issued).
    Pending,
    /// Successful response with data.
    Loaded(TableData),
    /// Successful response with nothing to show.
    Empty,
    /// User cancelled; rendered as "start over", not as an error.
    Cancelled,
    /// Transport, status, or payload failure; the message embeds the
    /// request URL.
    Failed(String),
}

impl FetchOutcome {
    /// Whether the request has left the loading state.
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Rows to render; empty for every non-loaded outcome.
    pub fn rows(&self) -> &[RowModel] {
        match self {
            Self::Loaded(data) => &data.rows,
            _ => &[],
        }
    }

    /// Columns to render. `Empty` still renders headers (the name column),
    /// distinguishing it from a blank table.
    pub fn columns(&self) -> Option<ColumnSet> {
        match self {
            Self::Loaded(data) => Some(data.columns.clone()),
            Self::Empty => Some(ColumnSet::name_only()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, columns: &[&str]) -> RowModel {
        RowModel {
            name: name.to_string(),
            cells: columns
                .iter()
                .map(|c| CellModel { column: c.to_string(), metrics: Map::new() })
                .collect(),
        }
    }

    #[test]
    fn column_set_is_union_with_name_first() {
        let rows = vec![row("a", &["ovn", "sdn"]), row("b", &["sdn", "metal"])];
        let columns = ColumnSet::from_rows(&rows);
        assert_eq!(columns.names(), ["Name", "ovn", "sdn", "metal"]);
    }

    #[test]
    fn name_column_is_never_duplicated() {
        let rows = vec![row("a", &["Name", "ovn"])];
        let columns = ColumnSet::from_rows(&rows);
        assert_eq!(columns.names(), ["Name", "ovn"]);
    }

    #[test]
    fn empty_outcome_still_renders_headers() {
        let outcome = FetchOutcome::Empty;
        assert!(outcome.is_settled());
        assert!(outcome.rows().is_empty());
        assert_eq!(outcome.columns().expect("headers").names(), ["Name"]);
    }

    #[test]
    fn cancelled_renders_no_headers() {
        assert!(FetchOutcome::Cancelled.columns().is_none());
        assert!(FetchOutcome::Cancelled.is_settled());
        assert!(!FetchOutcome::Pending.is_settled());
    }
}
