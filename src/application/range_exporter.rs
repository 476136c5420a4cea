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

//! # Single-Range Exporter
//!
//! Streams one query into one CSV file:
//! open cursor -> (fill batch -> write batch)* -> report -> release cursor.
//!
//! The first non-empty batch creates the file and writes the header; every
//! later batch is appended. A query that returns no rows creates no file.

use crate::application::row_batcher::RowBatcher;
use crate::domain::entities::{ExportJob, TaskResult, TaskStatus};
use crate::domain::errors::{ExportError, Result};
use crate::domain::progress::ProgressTracker;
use crate::infrastructure::mssql::sql_utils::select_for_source;
use crate::ports::batch_writer_port::BatchWriterPort;
use crate::ports::source_port::{RowCursor, SourcePort};
use log::{error, info, warn};
use std::sync::Arc;

pub struct RangeExporter {
    source: Arc<dyn SourcePort>,
    writer: Arc<dyn BatchWriterPort>,
}

impl RangeExporter {
    pub fn new(source: Arc<dyn SourcePort>, writer: Arc<dyn BatchWriterPort>) -> Self {
        Self { source, writer }
    }

    /// Runs one export job to completion.
    ///
    /// Failures are logged and returned as a `FAILED` result; a file that
    /// already received batches is left on disk and flagged as incomplete.
    pub fn export(&self, job: &ExportJob) -> TaskResult {
        if job.batch_size == 0 {
            let err = ExportError::ValidationError("batch size must be at least 1".to_string());
            error!("Export of {} rejected: {}", job.source, err);
            return TaskResult::failure(job, &err, 0);
        }

        let sql = job
            .query_override
            .clone()
            .unwrap_or_else(|| select_for_source(&job.source));

        info!(
            "Exporting {} to {} (batch size {})",
            job.source,
            job.output_path.display(),
            job.batch_size
        );

        let mut progress = ProgressTracker::start();
        let outcome = self.source.with_cursor(
            &sql,
            &mut |cursor: &mut dyn RowCursor| self.stream(cursor, job, &mut progress),
        );

        match outcome {
            Ok(()) => Self::completed(job, &progress),
            Err(e) => {
                error!("Export of {} failed [{}]: {}", job.source, e.kind(), e);
                // A write that failed half way can leave a file behind even
                // before the first batch is counted.
                let incomplete = progress.output_started() && job.output_path.exists();
                if incomplete {
                    warn!(
                        "Output file {} is INCOMPLETE: only {} rows in {} batches were written before the failure. Do not treat it as a full export.",
                        job.output_path.display(),
                        progress.total_rows(),
                        progress.batches()
                    );
                }
                let mut result = TaskResult::failure(job, &e, progress.batches());
                result.rows = progress.total_rows();
                result.bytes = progress.bytes();
                result.duration = progress.elapsed().as_secs_f64();
                result.incomplete_output = incomplete;
                result
            }
        }
    }

    /// Batch loop. The batch buffer lives inside the batcher and is dropped
    /// when this returns, on success or error.
    fn stream(
        &self,
        cursor: &mut dyn RowCursor,
        job: &ExportJob,
        progress: &mut ProgressTracker,
    ) -> Result<()> {
        let mut batcher = RowBatcher::new(cursor, job.batch_size);

        while let Some(batch) = batcher.next_batch()? {
            let append = progress.batches() > 0;
            progress.begin_write();
            let bytes = self.writer.write_batch(batch, &job.output_path, append)?;
            let timing = progress.record_batch(batch.len(), bytes);

            info!(
                "Batch {}: {} rows written ({} total) | elapsed {:.2}s | delta {:.2}s",
                timing.batch_number,
                timing.rows_in_batch,
                timing.total_rows,
                timing.elapsed.as_secs_f64(),
                timing.delta.as_secs_f64()
            );
        }
        Ok(())
    }

    fn completed(job: &ExportJob, progress: &ProgressTracker) -> TaskResult {
        let duration = progress.elapsed().as_secs_f64();
        let status = if progress.batches() == 0 {
            info!(
                "{} returned no rows; {} was not created",
                job.source,
                job.output_path.display()
            );
            TaskStatus::Empty
        } else {
            info!(
                "Export complete: {} rows in {} batches to {} | total {:.2}s | avg {:.2}s per batch",
                progress.total_rows(),
                progress.batches(),
                job.output_path.display(),
                duration,
                progress.average_per_batch().as_secs_f64()
            );
            TaskStatus::Success
        };

        TaskResult {
            output_file: job.output_path.display().to_string(),
            period: job.period_token.clone(),
            rows: progress.total_rows(),
            batches: progress.batches(),
            bytes: progress.bytes(),
            duration,
            status,
            error_kind: None,
            error: None,
            incomplete_output: false,
        }
    }
}
