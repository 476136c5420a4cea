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

//! # Period-Partitioned Exporter
//!
//! Splits a table export into one file per calendar period. Each period gets
//! its own date-filtered query, its own output file and its own connection,
//! and periods run strictly one after another.
//!
//! All input is validated before the first query runs. After that a failing
//! period is reported and the next period still runs.

use crate::application::range_exporter::RangeExporter;
use crate::domain::entities::{ExportJob, PeriodExportReport, Source, TaskResult};
use crate::domain::errors::{ExportError, Result};
use crate::domain::path_template::PathTemplate;
use crate::domain::period::{decompose, Granularity};
use crate::infrastructure::mssql::sql_utils::select_date_range;
use log::{error, info, warn};
use std::time::Instant;

/// Everything needed to run a period export.
#[derive(Debug, Clone)]
pub struct PeriodExportRequest {
    pub source: Source,
    pub date_column: String,
    pub start_period: String,
    pub end_period: String,
    /// Output path containing one `{}` for the period token.
    pub output_template: String,
    pub batch_size: usize,
}

pub struct PeriodExporter {
    exporter: RangeExporter,
}

impl PeriodExporter {
    pub fn new(exporter: RangeExporter) -> Self {
        Self { exporter }
    }

    /// Runs one Single-Range export per period, in chronological order.
    ///
    /// Returns `Err` only for invalid input, in which case nothing was queried.
    /// Per-period failures are recorded in the report.
    pub fn run(&self, request: &PeriodExportRequest) -> Result<PeriodExportReport> {
        let (schema, table) = match &request.source {
            Source::TableRef { schema, name } => (schema.as_str(), name.as_str()),
            Source::RawQuery { .. } => {
                return Err(ExportError::ValidationError(
                    "period export needs a table or view name; free-form queries are not supported"
                        .to_string(),
                ))
            }
        };
        let date_column = request.date_column.trim();
        if date_column.is_empty() {
            return Err(ExportError::ValidationError(
                "period export needs a date column".to_string(),
            ));
        }
        let template = PathTemplate::parse(&request.output_template)?;
        let plan = decompose(&request.start_period, &request.end_period)?;

        if plan.granularity() == Granularity::Year {
            warn!(
                "Yearly periods still advance one calendar month at a time; all months of a year map to the same file name and each month replaces the previous one"
            );
        }

        let started = Instant::now();
        let mut results: Vec<TaskResult> = Vec::new();

        for range in plan.iter() {
            let token = range.token();
            info!(
                "Period {} ({}): [{}, {})",
                range.label(),
                plan.granularity(),
                range.start,
                range.end
            );

            let mut job = ExportJob::new(
                request.source.clone(),
                template.render(&token),
                request.batch_size,
            );
            job.query_override = Some(select_date_range(
                schema,
                table,
                date_column,
                range.start,
                range.end,
            ));
            job.period_token = Some(token);

            let result = self.exporter.export(&job);
            if result.is_failed() {
                error!(
                    "Period {} failed; continuing with the next period",
                    range.label()
                );
            }
            results.push(result);
        }

        let report = PeriodExportReport {
            results,
            total_duration_seconds: started.elapsed().as_secs_f64(),
        };

        info!(
            "Period export finished: {} periods, {} failed, {} rows | total {:.2}s",
            report.results.len(),
            report.failed_count(),
            report.total_rows(),
            report.total_duration_seconds
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::range_exporter::tests::MockSource;
    use crate::domain::entities::TaskStatus;
    use crate::domain::locale::NumberLocale;
    use crate::infrastructure::local_storage::csv_file_writer::CsvFileWriter;
    use std::sync::Arc;

    fn exporter(source: Arc<MockSource>) -> PeriodExporter {
        let writer = Arc::new(CsvFileWriter::new(b',', NumberLocale::default()));
        PeriodExporter::new(RangeExporter::new(source, writer))
    }

    fn request(template: &str, start: &str, end: &str) -> PeriodExportRequest {
        PeriodExportRequest {
            source: Source::from_parts(Some("sales"), Some("Orders"), None).unwrap(),
            date_column: "OrderDate".to_string(),
            start_period: start.to_string(),
            end_period: end.to_string(),
            output_template: template.to_string(),
            batch_size: 4,
        }
    }

    #[test]
    fn test_one_file_per_month() {
        let dir = tempfile::tempdir().unwrap();
        let template = format!("{}/orders_{{}}.csv", dir.path().display());
        let source = Arc::new(MockSource::new(10));

        let report = exporter(source.clone())
            .run(&request(&template, "2022-01", "2022-04"))
            .unwrap();

        assert_eq!(report.results.len(), 4);
        assert_eq!(report.failed_count(), 0);
        assert_eq!(report.total_rows(), 40);

        let queries = source.queries();
        assert_eq!(queries.len(), 4);
        assert_eq!(
            queries[0],
            "SELECT * FROM [sales].[Orders] WHERE [OrderDate] >= '20220101' AND [OrderDate] < '20220201'"
        );
        assert_eq!(
            queries[3],
            "SELECT * FROM [sales].[Orders] WHERE [OrderDate] >= '20220401' AND [OrderDate] < '20220501'"
        );

        for token in ["202201", "202202", "202203", "202204"] {
            let path = dir.path().join(format!("orders_{}.csv", token));
            let content = std::fs::read_to_string(&path).unwrap();
            assert_eq!(content.split_terminator("\r\n").count(), 11);
        }
        let periods: Vec<Option<String>> = report.results.iter().map(|r| r.period.clone()).collect();
        assert_eq!(periods[0].as_deref(), Some("202201"));
    }

    #[test]
    fn test_daily_input_exports_whole_month() {
        let dir = tempfile::tempdir().unwrap();
        let template = format!("{}/orders_{{}}.csv", dir.path().display());
        let source = Arc::new(MockSource::new(2));

        let report = exporter(source.clone())
            .run(&request(&template, "2022-02-15", "2022-02-20"))
            .unwrap();

        assert_eq!(report.results.len(), 1);
        assert_eq!(
            source.queries(),
            vec!["SELECT * FROM [sales].[Orders] WHERE [OrderDate] >= '20220201' AND [OrderDate] < '20220301'"]
        );
        assert!(dir.path().join("orders_20220201.csv").exists());
    }

    #[test]
    fn test_failed_period_does_not_stop_later_ones() {
        let dir = tempfile::tempdir().unwrap();
        let template = format!("{}/orders_{{}}.csv", dir.path().display());
        let mut source = MockSource::new(10);
        source.fail_call = Some((1, 6));
        source.connect_error_call = Some(2);
        let source = Arc::new(source);

        let report = exporter(source.clone())
            .run(&request(&template, "2022-01", "2022-04"))
            .unwrap();

        let statuses: Vec<TaskStatus> = report.results.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![
                TaskStatus::Success,
                TaskStatus::Failed,
                TaskStatus::Failed,
                TaskStatus::Success
            ]
        );
        assert_eq!(report.failed_count(), 2);
        assert!(report.results[1].incomplete_output);
        assert_eq!(report.results[2].error_kind.as_deref(), Some("connection"));
        assert_eq!(source.queries().len(), 4);
        assert!(dir.path().join("orders_202204.csv").exists());
    }

    #[test]
    fn test_empty_period_creates_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let template = format!("{}/orders_{{}}.csv", dir.path().display());

        let report = exporter(Arc::new(MockSource::new(0)))
            .run(&request(&template, "2022-01", "2022-02"))
            .unwrap();

        assert!(report.results.iter().all(|r| r.status == TaskStatus::Empty));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_validation_failures_run_no_queries() {
        let source = Arc::new(MockSource::new(10));
        let exporter = exporter(source.clone());

        let mismatched = exporter.run(&request("out_{}.csv", "2022", "2022-03"));
        assert!(matches!(mismatched, Err(ExportError::ValidationError(_))));

        let reversed = exporter.run(&request("out_{}.csv", "2022-05", "2022-01"));
        assert!(matches!(reversed, Err(ExportError::ValidationError(_))));

        let no_placeholder = exporter.run(&request("out.csv", "2022-01", "2022-02"));
        assert!(matches!(no_placeholder, Err(ExportError::ValidationError(_))));

        let mut raw = request("out_{}.csv", "2022-01", "2022-02");
        raw.source = Source::from_parts(None, None, Some("SELECT 1")).unwrap();
        assert!(matches!(exporter.run(&raw), Err(ExportError::ValidationError(_))));

        let mut no_column = request("out_{}.csv", "2022-01", "2022-02");
        no_column.date_column = " ".to_string();
        assert!(matches!(exporter.run(&no_column), Err(ExportError::ValidationError(_))));

        assert!(source.queries().is_empty());
    }
}
