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

//! # Source Port
//!
//! This Port defines what it means to "read rows" from a database. It does
//! not care whether the rows come from SQL Server over ODBC or from a mock
//! in a test.

use crate::domain::entities::{Row, TableSchema};
use crate::domain::errors::Result;

/// A forward-only, non-restartable cursor over one result set.
///
/// The cursor does not own its connection; whoever handed it out closes it.
pub trait RowCursor {
    /// Column layout of the result set. Available before the first row.
    fn schema(&self) -> &TableSchema;

    /// Advances the cursor. `Ok(None)` means the result set is exhausted.
    fn next_row(&mut self) -> Result<Option<Row>>;
}

/// `SourcePort` opens cursors for SQL text.
pub trait SourcePort {
    /// Opens a connection and a cursor for `sql`, lends the cursor to `consume`,
    /// then releases cursor and connection, whether `consume` succeeded or not.
    fn with_cursor(
        &self,
        sql: &str,
        consume: &mut dyn FnMut(&mut dyn RowCursor) -> Result<()>,
    ) -> Result<()>;
}
