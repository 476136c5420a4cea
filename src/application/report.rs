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

//! JSON run report.

use crate::domain::entities::{TaskResult, TaskStatus};
use crate::domain::errors::{ExportError, Result};
use log::info;
use serde_json::json;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes a summary of all export results to `path` as pretty-printed JSON.
pub fn write_report(path: &Path, results: &[TaskResult], duration_secs: f64) -> Result<()> {
    let count = |status: TaskStatus| results.iter().filter(|r| r.status == status).count();
    let total_rows: u64 = results.iter().map(|r| r.rows).sum();
    let total_bytes: u64 = results.iter().map(|r| r.bytes).sum();

    let report = json!({
        "summary": {
            "total_tasks": results.len(),
            "success": count(TaskStatus::Success),
            "empty": count(TaskStatus::Empty),
            "failed": count(TaskStatus::Failed),
            "incomplete_files": results.iter().filter(|r| r.incomplete_output).count(),
            "total_rows": total_rows,
            "total_bytes": total_bytes,
            "total_duration_seconds": duration_secs,
            "generated_at": chrono::Local::now().to_rfc3339(),
        },
        "details": results
    });

    let write_error = |reason: String| ExportError::WriteError {
        path: path.display().to_string(),
        reason,
    };
    let file = File::create(path).map_err(|e| write_error(e.to_string()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &report).map_err(|e| write_error(e.to_string()))?;
    writer.flush().map_err(|e| write_error(e.to_string()))?;

    info!("Report written to {}", path.display());
    Ok(())
}
