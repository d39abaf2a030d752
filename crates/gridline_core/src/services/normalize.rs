//! Response normalization.
//!
//! Classifies a raw JSON payload (empty, malformed, normal) and maps it into
//! the renderable [`TableData`] model. Classification is a pure function of
//! the payload and is idempotent.

use crate::error::GridlineError;
use crate::models::{CellModel, ColumnSet, FetchOutcome, RowModel, TableData};

use serde_json::Value;

/// Classify a 2xx response payload into a fetch outcome.
///
/// Order of checks:
/// 1. an empty object is `Empty` (the backend's "no data" shape);
/// 2. `rows` present but zero-length is `Empty`;
/// 3. otherwise rows are mapped, with the column set derived from the union
///    of cell names plus the fixed leading name column.
///
/// A non-empty payload without a `rows` key is a malformed response; the
/// error embeds `url` for diagnostics.
pub fn classify(payload: &Value, url: &str) -> Result<FetchOutcome, GridlineError> {
    let object = payload
        .as_object()
        .ok_or_else(|| GridlineError::malformed("payload is not a JSON object", url))?;

    if object.is_empty() {
        tracing::debug!(url, "empty-object payload");
        return Ok(FetchOutcome::Empty);
    }

    let rows = object
        .get("rows")
        .ok_or_else(|| GridlineError::malformed("non-empty payload missing \"rows\"", url))?;
    let rows = rows
        .as_array()
        .ok_or_else(|| GridlineError::malformed("\"rows\" is not an array", url))?;

    if rows.is_empty() {
        tracing::debug!(url, "zero-row payload");
        return Ok(FetchOutcome::Empty);
    }

    let rows = rows
        .iter()
        .map(|row| normalize_row(row, url))
        .collect::<Result<Vec<RowModel>, GridlineError>>()?;
    let columns = ColumnSet::from_rows(&rows);

    tracing::debug!(url, row_count = rows.len(), column_count = columns.len(), "payload loaded");
    Ok(FetchOutcome::Loaded(TableData { columns, rows }))
}

/// Map one payload row, keyed by its server-assigned identity.
fn normalize_row(row: &Value, url: &str) -> Result<RowModel, GridlineError> {
    let object = row
        .as_object()
        .ok_or_else(|| GridlineError::malformed("row is not a JSON object", url))?;

    // Capability reports key rows by "capability", test reports by "name".
    let name = object
        .get("capability")
        .or_else(|| object.get("name"))
        .and_then(Value::as_str)
        .ok_or_else(|| GridlineError::malformed("row missing capability/name identity", url))?
        .to_string();

    let cells = match object.get("columns") {
        Some(Value::Array(cells)) => cells
            .iter()
            .map(|cell| normalize_cell(cell, url))
            .collect::<Result<Vec<CellModel>, GridlineError>>()?,
        Some(_) => return Err(GridlineError::malformed("row \"columns\" is not an array", url)),
        None => Vec::new(),
    };

    Ok(RowModel { name, cells })
}

fn normalize_cell(cell: &Value, url: &str) -> Result<CellModel, GridlineError> {
    let object = cell
        .as_object()
        .ok_or_else(|| GridlineError::malformed("column entry is not a JSON object", url))?;

    // A cell without a "name" keeps its metrics but contributes no column.
    let column = object.get("name").and_then(Value::as_str).unwrap_or_default().to_string();
    let mut metrics = object.clone();
    metrics.remove("name");

    Ok(CellModel { column, metrics })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const URL: &str = "https://sippy.example.com/api/capabilities?component=etcd";

    #[test]
    fn empty_object_is_empty() {
        assert_eq!(classify(&json!({}), URL).expect("classify"), FetchOutcome::Empty);
    }

    #[test]
    fn zero_rows_is_empty() {
        assert_eq!(classify(&json!({"rows": []}), URL).expect("classify"), FetchOutcome::Empty);
    }

    #[test]
    fn classification_is_idempotent_on_empty() {
        let payload = json!({});
        let first = classify(&payload, URL).expect("classify");
        let second = classify(&payload, URL).expect("classify");
        assert_eq!(first, FetchOutcome::Empty);
        assert_eq!(first, second);
    }

    #[test]
    fn single_row_single_column_payload_loads() {
        let payload = json!({"rows": [{"capability": "X", "columns": [{"name": "A"}]}]});
        let outcome = classify(&payload, URL).expect("classify");
        let FetchOutcome::Loaded(data) = outcome else {
            panic!("expected Loaded, got {outcome:?}");
        };
        assert_eq!(data.rows.len(), 1);
        assert_eq!(data.rows[0].name, "X");
        assert_eq!(data.columns.names(), ["Name", "A"]);
    }

    #[test]
    fn column_set_is_union_across_rows() {
        let payload = json!({"rows": [
            {"capability": "install", "columns": [{"name": "aws", "status": 3}]},
            {"capability": "upgrade", "columns": [{"name": "gcp", "status": -1}, {"name": "aws"}]},
        ]});
        let FetchOutcome::Loaded(data) = classify(&payload, URL).expect("classify") else {
            panic!("expected Loaded");
        };
        assert_eq!(data.columns.names(), ["Name", "aws", "gcp"]);
        let status = &data.rows[0].cells[0].metrics["status"];
        assert_eq!(status, &json!(3));
    }

    #[test]
    fn test_report_rows_keyed_by_name() {
        let payload = json!({"rows": [{"name": "etcd watch", "columns": []}]});
        let FetchOutcome::Loaded(data) = classify(&payload, URL).expect("classify") else {
            panic!("expected Loaded");
        };
        assert_eq!(data.rows[0].name, "etcd watch");
    }

    #[test]
    fn missing_rows_key_is_malformed() {
        let err = classify(&json!({"totals": 3}), URL).expect_err("must fail");
        assert_eq!(err.category(), "Response");
        assert_eq!(err.url(), Some(URL));
    }

    #[test]
    fn non_object_payload_is_malformed() {
        assert!(classify(&json!([1, 2, 3]), URL).is_err());
        assert!(classify(&json!(null), URL).is_err());
    }

    #[test]
    fn row_without_identity_is_malformed() {
        let err = classify(&json!({"rows": [{"columns": []}]}), URL).expect_err("must fail");
        assert!(err.to_string().contains("identity"));
    }

    #[test]
    fn nameless_cell_keeps_metrics_but_adds_no_column() {
        let payload = json!({"rows": [{"capability": "X", "columns": [{"status": 7}]}]});
        let FetchOutcome::Loaded(data) = classify(&payload, URL).expect("classify") else {
            panic!("expected Loaded");
        };
        assert_eq!(data.columns.names(), ["Name"]);
        assert_eq!(data.rows[0].cells[0].metrics["status"], json!(7));
    }
}
