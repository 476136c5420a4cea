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

//! # SQL Server CSV Exporter
//!
//! Streams large SQL Server result sets into RFC 4180 CSV files in
//! fixed-size batches, so memory use does not grow with the result set.
//! Optionally splits a table into one file per calendar month using a date
//! column.
//!
//! This application follows the **Hexagonal Architecture** (Ports and Adapters)
//! to keep the batching pipeline independent of ODBC and the filesystem.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ports;

use crate::application::period_exporter::{PeriodExportRequest, PeriodExporter};
use crate::application::range_exporter::RangeExporter;
use crate::application::report::write_report;
use crate::config::{AppConfig, CliArgs};
use crate::domain::entities::{ExportJob, Source, TaskResult};
use crate::domain::errors::Result;
use crate::infrastructure::local_storage::csv_file_writer::CsvFileWriter;
use crate::infrastructure::mssql::odbc_source_adapter::OdbcSourceAdapter;
use clap::Parser;
use log::{error, info};
use std::path::Path;
use std::process;
use std::sync::Arc;

fn main() {
    // 1. Initialize Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 2. Parse Arguments
    let args = CliArgs::parse();

    // 3. Load Config
    let mut config = if let Some(config_path) = &args.config {
        match AppConfig::from_file(config_path) {
            Ok(c) => c,
            Err(e) => {
                error!("Failed to load config: {}", e);
                process::exit(1);
            }
        }
    } else {
        AppConfig::default_from_cli(&args)
    };

    // Merge CLI overrides
    config.merge_cli(&args);

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        process::exit(1);
    }

    // 4. Run
    match run(&config) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            error!("Export aborted [{}]: {}", e.kind(), e);
            process::exit(1);
        }
    }
}

/// Builds the adapters and runs the requested export. Returns whether every
/// export task succeeded.
fn run(config: &AppConfig) -> Result<bool> {
    // Resolve the source before anything connects.
    let source = Source::from_parts(
        Some(config.schema()),
        config.export.table.as_deref(),
        config.export.query.as_deref(),
    )?;

    let source_port = Arc::new(OdbcSourceAdapter::new(
        config.database.get_connection_string(),
        config.database.connection_timeout_secs(),
        config.fetch_size(),
        config.max_text_length(),
    )?);
    let writer = Arc::new(CsvFileWriter::new(config.delimiter()?, config.locale()?));
    let exporter = RangeExporter::new(source_port, writer);

    let (results, duration) = match &config.period {
        Some(period) => {
            let request = PeriodExportRequest {
                source,
                date_column: period.date_column.clone(),
                start_period: period.start_period.clone(),
                end_period: period.end_period.clone(),
                output_template: config.export.output.clone(),
                batch_size: config.batch_size(),
            };
            info!(
                "Starting period export of {} from {} to {}",
                request.source, request.start_period, request.end_period
            );
            let report = PeriodExporter::new(exporter).run(&request)?;
            (report.results, report.total_duration_seconds)
        }
        None => {
            let job = ExportJob::new(source, &config.export.output, config.batch_size());
            let result = exporter.export(&job);
            let duration = result.duration;
            (vec![result], duration)
        }
    };

    if let Some(report_file) = &config.export.report_file {
        write_report(Path::new(report_file), &results, duration)?;
    }

    Ok(!results.iter().any(TaskResult::is_failed))
}
