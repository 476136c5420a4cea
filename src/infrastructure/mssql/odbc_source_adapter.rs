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

//! Infrastructure adapter for reading SQL Server result sets over ODBC.

use crate::domain::entities::{ColumnDescriptor, Row, TableSchema, Value};
use crate::domain::errors::{ExportError, Result};
use crate::domain::mapping::{cast_text, map_odbc_type};
use crate::ports::source_port::{RowCursor, SourcePort};
use log::{debug, info};
use odbc_api::buffers::TextRowSet;
use odbc_api::{BlockCursor, ConnectionOptions, Cursor, Environment, ResultSetMetadata};
use std::collections::VecDeque;

/// Concrete implementation of `SourcePort` for SQL Server.
///
/// Every call to `with_cursor` opens its own connection and closes it before
/// returning; connections are never shared between exports. Only the login is
/// bounded by a timeout, statements may run as long as the server needs.
pub struct OdbcSourceAdapter {
    env: Environment,
    conn_str: String,
    login_timeout_secs: u32,
    /// Rows per driver round trip.
    fetch_size: usize,
    /// Longest text value accepted per field, in bytes.
    max_text_length: usize,
}

impl OdbcSourceAdapter {
    pub fn new(
        conn_str: String,
        login_timeout_secs: u32,
        fetch_size: usize,
        max_text_length: usize,
    ) -> Result<Self> {
        let env = Environment::new().map_err(|e| {
            ExportError::ConnectionError(format!("Failed to initialize ODBC environment: {}", e))
        })?;
        Ok(Self {
            env,
            conn_str,
            login_timeout_secs,
            fetch_size,
            max_text_length,
        })
    }
}

fn read_error(e: odbc_api::Error) -> ExportError {
    ExportError::ReadError(e.to_string())
}

/// Reads the column layout of an open result set.
fn describe(cursor: &mut impl ResultSetMetadata) -> Result<TableSchema> {
    let count = cursor.num_result_cols().map_err(read_error)?;
    let count = u16::try_from(count).unwrap_or(0);

    let mut columns = Vec::with_capacity(count as usize);
    for i in 1..=count {
        let name = cursor.col_name(i).map_err(read_error)?;
        let data_type = cursor.col_data_type(i).map_err(read_error)?;
        columns.push(ColumnDescriptor::new(name, map_odbc_type(&data_type)));
    }
    Ok(TableSchema::new(columns))
}

impl SourcePort for OdbcSourceAdapter {
    fn with_cursor(
        &self,
        sql: &str,
        consume: &mut dyn FnMut(&mut dyn RowCursor) -> Result<()>,
    ) -> Result<()> {
        info!("Connecting to SQL Server...");
        let options = ConnectionOptions {
            login_timeout_sec: Some(self.login_timeout_secs),
            ..Default::default()
        };
        let conn = self
            .env
            .connect_with_connection_string(&self.conn_str, options)
            .map_err(|e| ExportError::ConnectionError(e.to_string()))?;

        debug!("Executing: {}", sql);
        let Some(mut cursor) = conn.execute(sql, ()).map_err(read_error)? else {
            // Statement produced no result set at all, same as zero rows.
            return consume(&mut NoResultSet::default());
        };

        let schema = describe(&mut cursor)?;
        let buffer = TextRowSet::for_cursor(self.fetch_size, &mut cursor, Some(self.max_text_length))
            .map_err(read_error)?;
        let block_cursor = cursor.bind_buffer(buffer).map_err(read_error)?;

        let mut rows = OdbcRowCursor {
            schema,
            block_cursor,
            pending: VecDeque::with_capacity(self.fetch_size),
            exhausted: false,
        };

        // Cursor, statement and connection drop here on success and on error alike.
        consume(&mut rows)
    }
}

/// Hands out rows one at a time from driver blocks of `fetch_size` rows.
struct OdbcRowCursor<C: Cursor> {
    schema: TableSchema,
    block_cursor: BlockCursor<C, TextRowSet>,
    pending: VecDeque<Row>,
    exhausted: bool,
}

impl<C: Cursor> OdbcRowCursor<C> {
    fn fetch_block(&mut self) -> Result<()> {
        // Over-long values are an error instead of being cut short.
        match self
            .block_cursor
            .fetch_with_truncation_check(true)
            .map_err(read_error)?
        {
            Some(block) => {
                for row_index in 0..block.num_rows() {
                    let mut row = Vec::with_capacity(self.schema.len());
                    for (col_index, column) in self.schema.columns.iter().enumerate() {
                        let value = match block.at(col_index, row_index) {
                            None => Value::Null,
                            Some(bytes) => {
                                let text = std::str::from_utf8(bytes).map_err(|e| {
                                    ExportError::ReadError(format!(
                                        "Column {} holds invalid UTF-8: {}",
                                        column.name, e
                                    ))
                                })?;
                                cast_text(column.data_type, text)
                            }
                        };
                        row.push(value);
                    }
                    self.pending.push_back(row);
                }
            }
            None => self.exhausted = true,
        }
        Ok(())
    }
}

impl<C: Cursor> RowCursor for OdbcRowCursor<C> {
    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    fn next_row(&mut self) -> Result<Option<Row>> {
        if self.pending.is_empty() && !self.exhausted {
            self.fetch_block()?;
        }
        Ok(self.pending.pop_front())
    }
}

/// Stand-in cursor for statements that return no result set.
#[derive(Default)]
struct NoResultSet {
    schema: TableSchema,
}

impl RowCursor for NoResultSet {
    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    fn next_row(&mut self) -> Result<Option<Row>> {
        Ok(None)
    }
}
