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

//! Groups cursor rows into fixed-size batches.

use crate::domain::entities::{Batch, TableSchema};
use crate::domain::errors::Result;
use crate::ports::source_port::RowCursor;
use std::sync::Arc;

/// Pulls up to `batch_size` rows per call from a borrowed cursor.
///
/// A single `Batch` buffer is reused for every call, so memory stays bounded
/// by one batch no matter how large the result set is.
pub struct RowBatcher<'c> {
    cursor: &'c mut dyn RowCursor,
    batch: Batch,
    batch_size: usize,
}

impl<'c> RowBatcher<'c> {
    /// Captures the cursor's schema once; every batch carries the same one.
    pub fn new(cursor: &'c mut dyn RowCursor, batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        let schema = Arc::new(cursor.schema().clone());
        Self {
            cursor,
            batch: Batch::with_capacity(schema, batch_size),
            batch_size,
        }
    }

    pub fn schema(&self) -> &Arc<TableSchema> {
        &self.batch.schema
    }

    /// Fills the buffer with the next rows.
    ///
    /// Returns `Ok(None)` once the cursor has no more rows. The returned batch
    /// is only valid until the next call.
    pub fn next_batch(&mut self) -> Result<Option<&Batch>> {
        self.batch.clear();

        while self.batch.len() < self.batch_size {
            match self.cursor.next_row()? {
                Some(row) => self.batch.rows.push(row),
                None => break,
            }
        }

        if self.batch.is_empty() {
            Ok(None)
        } else {
            Ok(Some(&self.batch))
        }
    }
}
