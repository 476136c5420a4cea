// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Domain Entities
//!
//! Entities are the "Nouns" of our application: columns, rows, batches,
//! export jobs and their results.
//!
//! We use the `serde` crate (Serialize/Deserialize) so results can be written
//! to the JSON run report.

use crate::domain::errors::{ExportError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Schema used when a table is given without one.
pub const DEFAULT_SCHEMA: &str = "dbo";

/// The small set of value kinds a column can carry once it leaves the server.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnType {
    Text,
    Integer,
    /// Exact and approximate numerics. Rendered with the configured locale.
    Decimal,
    DateTime,
    Boolean,
    Binary,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Text => write!(f, "TEXT"),
            ColumnType::Integer => write!(f, "INTEGER"),
            ColumnType::Decimal => write!(f, "DECIMAL"),
            ColumnType::DateTime => write!(f, "DATETIME"),
            ColumnType::Boolean => write!(f, "BOOLEAN"),
            ColumnType::Binary => write!(f, "BINARY"),
        }
    }
}

/// `ColumnDescriptor` is the name and type of one result-set column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub data_type: ColumnType,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, data_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Column layout of a result set, in cursor order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableSchema {
    pub columns: Vec<ColumnDescriptor>,
}

impl TableSchema {
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self { columns }
    }

    /// Header line for the CSV file.
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// A single typed, nullable scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Integer(i64),
    /// Canonical text with `.` as decimal separator, as sent by the server.
    Decimal(String),
    DateTime(String),
    Boolean(bool),
    Binary(Vec<u8>),
}

/// One row, ordered like the batch's schema.
pub type Row = Vec<Value>;

/// `Batch` is a bounded group of rows sharing a schema.
///
/// The row batcher owns one `Batch` and clears it between fills, so at most
/// one batch worth of rows is resident at any time.
#[derive(Debug, Clone)]
pub struct Batch {
    pub schema: Arc<TableSchema>,
    pub rows: Vec<Row>,
}

impl Batch {
    pub fn with_capacity(schema: Arc<TableSchema>, capacity: usize) -> Self {
        Self {
            schema,
            rows: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }
}

/// Where the rows come from: a table/view reference or a free-form query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    TableRef { schema: String, name: String },
    RawQuery { text: String },
}

impl Source {
    /// Builds a source from the loosely typed configuration fields.
    ///
    /// Exactly one of `table` and `query` must be present.
    pub fn from_parts(
        schema: Option<&str>,
        table: Option<&str>,
        query: Option<&str>,
    ) -> Result<Self> {
        let table = table.map(str::trim).filter(|t| !t.is_empty());
        let query = query.map(str::trim).filter(|q| !q.is_empty());

        match (table, query) {
            (Some(name), None) => Ok(Source::TableRef {
                schema: schema
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .unwrap_or(DEFAULT_SCHEMA)
                    .to_string(),
                name: name.to_string(),
            }),
            (None, Some(text)) => Ok(Source::RawQuery {
                text: text.to_string(),
            }),
            (Some(_), Some(_)) => Err(ExportError::ValidationError(
                "table and query are mutually exclusive; supply only one".to_string(),
            )),
            (None, None) => Err(ExportError::ValidationError(
                "either a table/view name or a query must be supplied".to_string(),
            )),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::TableRef { schema, name } => write!(f, "{}.{}", schema, name),
            Source::RawQuery { .. } => write!(f, "<query>"),
        }
    }
}

/// `ExportJob` is one Single-Range export request.
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub source: Source,
    /// Fully resolved SQL; overrides the plain `SELECT *` rendering of `source`.
    pub query_override: Option<String>,
    pub output_path: PathBuf,
    pub batch_size: usize,
    /// Token of the period this job covers, when it is part of a period export.
    pub period_token: Option<String>,
}

impl ExportJob {
    pub fn new(source: Source, output_path: impl Into<PathBuf>, batch_size: usize) -> Self {
        Self {
            source,
            query_override: None,
            output_path: output_path.into(),
            batch_size,
            period_token: None,
        }
    }
}

/// Final state of an export task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Success,
    /// The query returned no rows; no file was written.
    Empty,
    Failed,
}

/// `TaskResult` is the "Report Card" for an `ExportJob`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    pub output_file: String,
    pub period: Option<String>,
    pub rows: u64,
    pub batches: u64,
    pub bytes: u64,
    /// Seconds.
    pub duration: f64,
    pub status: TaskStatus,
    pub error_kind: Option<String>,
    pub error: Option<String>,
    /// Set when a failure happened after at least one batch reached disk.
    pub incomplete_output: bool,
}

impl TaskResult {
    pub fn failure(job: &ExportJob, err: &ExportError, batches_written: u64) -> Self {
        Self {
            output_file: job.output_path.display().to_string(),
            period: job.period_token.clone(),
            rows: 0,
            batches: batches_written,
            bytes: 0,
            duration: 0.0,
            status: TaskStatus::Failed,
            error_kind: Some(err.kind().to_string()),
            error: Some(err.to_string()),
            incomplete_output: batches_written > 0,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == TaskStatus::Failed
    }
}

/// Outcome of a period-partitioned export: one result per sub-range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodExportReport {
    pub results: Vec<TaskResult>,
    pub total_duration_seconds: f64,
}

impl PeriodExportReport {
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_failed()).count()
    }

    pub fn total_rows(&self) -> u64 {
        self.results.iter().map(|r| r.rows).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_from_table_defaults_schema() {
        let source = Source::from_parts(None, Some("Orders"), None).unwrap();
        assert_eq!(
            source,
            Source::TableRef {
                schema: "dbo".to_string(),
                name: "Orders".to_string()
            }
        );

        let source = Source::from_parts(Some("sales"), Some("Orders"), None).unwrap();
        assert_eq!(source.to_string(), "sales.Orders");
    }

    #[test]
    fn test_source_from_query() {
        let source = Source::from_parts(Some("ignored"), None, Some("SELECT 1")).unwrap();
        assert_eq!(
            source,
            Source::RawQuery {
                text: "SELECT 1".to_string()
            }
        );
    }

    #[test]
    fn test_source_requires_exactly_one() {
        let both = Source::from_parts(None, Some("T"), Some("SELECT 1"));
        assert!(matches!(both, Err(ExportError::ValidationError(_))));

        let neither = Source::from_parts(None, None, None);
        assert!(matches!(neither, Err(ExportError::ValidationError(_))));

        // Blank strings count as absent
        let blank = Source::from_parts(None, Some("  "), Some(""));
        assert!(matches!(blank, Err(ExportError::ValidationError(_))));
    }

    #[test]
    fn test_batch_clear_keeps_schema() {
        let schema = Arc::new(TableSchema::new(vec![ColumnDescriptor::new(
            "ID",
            ColumnType::Integer,
        )]));
        let mut batch = Batch::with_capacity(schema.clone(), 4);
        batch.rows.push(vec![Value::Integer(1)]);
        assert_eq!(batch.len(), 1);
        batch.clear();
        assert!(batch.is_empty());
        assert_eq!(batch.schema.names(), vec!["ID"]);
    }

    #[test]
    fn test_task_result_failure_flags_incomplete() {
        let job = ExportJob::new(
            Source::from_parts(None, Some("T"), None).unwrap(),
            "out.csv",
            10,
        );
        let err = ExportError::ReadError("network drop".into());

        let partial = TaskResult::failure(&job, &err, 2);
        assert!(partial.incomplete_output);
        assert_eq!(partial.error_kind.as_deref(), Some("read"));

        let early = TaskResult::failure(&job, &err, 0);
        assert!(!early.incomplete_output);
        assert!(early.is_failed());
    }
}
