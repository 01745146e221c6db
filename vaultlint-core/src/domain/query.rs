// vaultlint-core/src/domain/query.rs

use crate::domain::error::DomainError;
use crate::ports::gateway::{QueryRecord, QueryStatus};
use serde_json::{Map, Value, json};
use std::time::Duration;

/// Raw outcome of one query execution, consumed immediately by the rule
/// runner. Never persisted.
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub query: String,
    pub success: bool,
    pub data: Option<Value>,
    pub error: Option<String>,
    pub execution_time: Duration,
    pub result_count: Option<usize>,
}

pub const ENGINE_UNAVAILABLE_ERROR: &str =
    "Dataview plugin not available or query execution failed";

impl QueryResult {
    /// Interprets the gateway response. `None` means the external engine was
    /// not available, which is a normal outcome, not an error.
    pub fn from_record(
        query: String,
        record: Option<QueryRecord>,
        execution_time: Duration,
    ) -> Self {
        match record {
            None => QueryResult {
                query,
                success: false,
                data: None,
                error: Some(ENGINE_UNAVAILABLE_ERROR.to_string()),
                execution_time,
                result_count: None,
            },
            Some(record) if record.status == QueryStatus::Success => {
                // Success payloads carry rows under `result.values`.
                let values = record
                    .result
                    .as_ref()
                    .and_then(|r| r.get("values").cloned())
                    .unwrap_or_else(|| Value::Array(Vec::new()));
                let count = values.as_array().map(|a| a.len());
                QueryResult {
                    query,
                    success: true,
                    data: Some(values),
                    error: None,
                    execution_time,
                    result_count: count,
                }
            }
            Some(record) => QueryResult {
                query,
                success: false,
                data: None,
                error: Some(
                    record
                        .error
                        .unwrap_or_else(|| "Unknown query error".to_string()),
                ),
                execution_time,
                result_count: None,
            },
        }
    }

}

/// Query flavor, inferred from the first word of the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    List,
    Table,
    Task,
}

impl QueryKind {
    pub fn infer(query: &str) -> Self {
        match query
            .trim_start()
            .split_whitespace()
            .next()
            .map(|w| w.to_ascii_uppercase())
            .as_deref()
        {
            Some("TABLE") => QueryKind::Table,
            Some("TASK") => QueryKind::Task,
            _ => QueryKind::List,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::List => "LIST",
            QueryKind::Table => "TABLE",
            QueryKind::Task => "TASK",
        }
    }
}

/// Normalized view over `QueryResult::data`: ordered rows of key/value maps
/// plus the column names. Row count and emptiness are always derived.
#[derive(Debug, Clone, Default)]
pub struct QueryData {
    pub query_type: String,
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
}

impl QueryData {
    pub fn from_result(result: &QueryResult) -> Self {
        let kind = QueryKind::infer(&result.query);
        Self::from_value(result.data.as_ref(), kind)
    }

    pub fn from_value(data: Option<&Value>, kind: QueryKind) -> Self {
        let mut normalized = QueryData {
            query_type: kind.as_str().to_string(),
            ..QueryData::default()
        };

        let Some(data) = data else {
            return normalized;
        };

        match data {
            Value::Array(items) if !items.is_empty() => match (kind, &items[0]) {
                (QueryKind::Table, Value::Object(first)) => {
                    // Column order comes from the first row, rows kept as-is.
                    normalized.columns = first.keys().cloned().collect();
                    normalized.rows = items
                        .iter()
                        .filter_map(|item| item.as_object().cloned())
                        .collect();
                }
                (QueryKind::Table, Value::Array(header)) => {
                    // First element is the header row; later rows are zipped
                    // positionally, short rows padded with null.
                    normalized.columns = header
                        .iter()
                        .map(|h| match h {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect();
                    normalized.rows = items[1..]
                        .iter()
                        .filter_map(|row| row.as_array())
                        .map(|row| {
                            normalized
                                .columns
                                .iter()
                                .enumerate()
                                .map(|(i, col)| {
                                    (col.clone(), row.get(i).cloned().unwrap_or(Value::Null))
                                })
                                .collect()
                        })
                        .collect();
                }
                _ => {
                    // LIST/TASK results: wrap each element under "value".
                    normalized.columns = vec!["value".to_string()];
                    normalized.rows = items
                        .iter()
                        .map(|item| {
                            let mut row = Map::new();
                            row.insert("value".to_string(), item.clone());
                            row
                        })
                        .collect();
                }
            },
            Value::Object(map) => {
                normalized.columns = map.keys().cloned().collect();
                normalized.rows = vec![map.clone()];
            }
            _ => {}
        }

        normalized
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column, row order preserved. Rows missing the key
    /// contribute null.
    pub fn column(&self, name: &str) -> Result<Vec<Value>, DomainError> {
        if !self.columns.iter().any(|c| c == name) {
            return Err(DomainError::ColumnNotFound(name.to_string()));
        }
        Ok(self
            .rows
            .iter()
            .map(|row| row.get(name).cloned().unwrap_or(Value::Null))
            .collect())
    }

    pub fn to_value(&self) -> Value {
        json!({
            "query_type": self.query_type,
            "columns": self.columns,
            "rows": self.rows,
            "row_count": self.row_count(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn list_result(data: Value) -> QueryResult {
        QueryResult {
            query: "LIST FROM \"Daily\"".to_string(),
            success: true,
            data: Some(data),
            error: None,
            execution_time: Duration::from_millis(10),
            result_count: None,
        }
    }

    #[test]
    fn test_infer_kind() {
        assert_eq!(QueryKind::infer("  table file.name"), QueryKind::Table);
        assert_eq!(QueryKind::infer("TASK WHERE !completed"), QueryKind::Task);
        assert_eq!(QueryKind::infer("LIST"), QueryKind::List);
        assert_eq!(QueryKind::infer(""), QueryKind::List);
    }

    #[test]
    fn test_empty_data_yields_no_rows() {
        let data = QueryData::from_value(None, QueryKind::List);
        assert!(data.is_empty());
        assert!(data.columns.is_empty());
    }

    #[test]
    fn test_list_wraps_values() {
        let result = list_result(json!(["a.md", "b.md"]));
        let data = QueryData::from_result(&result);
        assert_eq!(data.columns, vec!["value"]);
        assert_eq!(data.row_count(), 2);
        assert_eq!(data.rows[0]["value"], json!("a.md"));
    }

    #[test]
    fn test_table_of_maps_preserves_order() {
        let value = json!([
            {"path": "a.md", "size": 10},
            {"path": "b.md", "size": 20}
        ]);
        let data = QueryData::from_value(Some(&value), QueryKind::Table);
        assert_eq!(data.columns, vec!["path", "size"]);
        assert_eq!(data.rows[1]["path"], json!("b.md"));
    }

    #[test]
    fn test_column_order_is_declaration_order_not_alphabetical() {
        let value = json!([
            {"size": 10, "path": "a.md", "created": "2026-01-01"}
        ]);
        let data = QueryData::from_value(Some(&value), QueryKind::Table);
        assert_eq!(data.columns, vec!["size", "path", "created"]);
    }

    #[test]
    fn test_table_of_arrays_zips_header() {
        let value = json!([["path", "size"], ["a.md", 10], ["b.md"]]);
        let data = QueryData::from_value(Some(&value), QueryKind::Table);
        assert_eq!(data.columns, vec!["path", "size"]);
        assert_eq!(data.row_count(), 2);
        assert_eq!(data.rows[0]["size"], json!(10));
        // Short row padded with null.
        assert_eq!(data.rows[1]["size"], Value::Null);
    }

    #[test]
    fn test_column_extraction() {
        let value = json!([["path", "size"], ["a.md", 10], ["b.md"]]);
        let data = QueryData::from_value(Some(&value), QueryKind::Table);
        assert_eq!(
            data.column("path").unwrap(),
            vec![json!("a.md"), json!("b.md")]
        );
        assert_eq!(data.column("size").unwrap(), vec![json!(10), Value::Null]);
    }

    #[test]
    fn test_unknown_column_is_domain_error() {
        let value = json!([{"path": "a.md"}]);
        let data = QueryData::from_value(Some(&value), QueryKind::Table);
        let err = data.column("size").unwrap_err();
        assert!(matches!(err, DomainError::ColumnNotFound(_)));
        assert_eq!(err.kind(), "eval");
    }

    #[test]
    fn test_single_map_becomes_one_row() {
        let value = json!({"total": 42});
        let data = QueryData::from_value(Some(&value), QueryKind::List);
        assert_eq!(data.columns, vec!["total"]);
        assert_eq!(data.row_count(), 1);
    }

    #[test]
    fn test_from_record_success_extracts_values() {
        let record = QueryRecord {
            query: "LIST".to_string(),
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            status: QueryStatus::Success,
            result: Some(json!({"values": [{"path": "a.md"}]})),
            error: None,
            extra: Map::new(),
        };
        let result =
            QueryResult::from_record("LIST".to_string(), Some(record), Duration::from_secs(0));
        assert!(result.success);
        assert_eq!(result.result_count, Some(1));
    }

    #[test]
    fn test_from_record_unavailable() {
        let result = QueryResult::from_record("LIST".to_string(), None, Duration::from_secs(0));
        assert!(!result.success);
        assert!(result.error.as_deref().unwrap().contains("not available"));
    }

    #[test]
    fn test_from_record_error_status() {
        let record = QueryRecord {
            query: "LIST".to_string(),
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            status: QueryStatus::Error,
            result: None,
            error: Some("bad syntax".to_string()),
            extra: Map::new(),
        };
        let result =
            QueryResult::from_record("LIST".to_string(), Some(record), Duration::from_secs(0));
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("bad syntax"));
    }
}
