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

//! Infrastructure adapter that appends row batches to RFC 4180 CSV files.

use crate::domain::entities::{Batch, Value};
use crate::domain::errors::{ExportError, Result};
use crate::domain::locale::NumberLocale;
use crate::ports::batch_writer_port::BatchWriterPort;
use base64::{engine::general_purpose, Engine as _};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::fmt::Display;
use std::fs::{File, OpenOptions};
use std::io::BufWriter;
use std::path::Path;

/// Concrete implementation of `BatchWriterPort` for local CSV files.
///
/// Fields are quoted only when they contain the delimiter, a quote or a line
/// break; embedded quotes are doubled. Records end with CRLF.
pub struct CsvFileWriter {
    delimiter: u8,
    locale: NumberLocale,
}

impl CsvFileWriter {
    pub fn new(delimiter: u8, locale: NumberLocale) -> Self {
        Self { delimiter, locale }
    }

    /// Formats a single value into its CSV field text. NULL becomes an empty field.
    fn render(&self, value: &Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::Text(s) | Value::DateTime(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Decimal(d) => self.locale.format_decimal(d),
            Value::Boolean(true) => "True".to_string(),
            Value::Boolean(false) => "False".to_string(),
            Value::Binary(bytes) => general_purpose::STANDARD.encode(bytes),
        }
    }

    fn open(path: &Path, append: bool) -> std::io::Result<(File, u64)> {
        if append {
            // No `create`: appending to a file that is not there is an error.
            let file = OpenOptions::new().append(true).open(path)?;
            let len = file.metadata()?.len();
            Ok((file, len))
        } else {
            Ok((File::create(path)?, 0))
        }
    }
}

fn write_error(path: &Path, e: impl Display) -> ExportError {
    ExportError::WriteError {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

impl BatchWriterPort for CsvFileWriter {
    fn write_batch(&self, batch: &Batch, path: &Path, append: bool) -> Result<u64> {
        let (file, start_len) = Self::open(path, append).map_err(|e| write_error(path, e))?;
        let buf_writer = BufWriter::with_capacity(128 * 1024, file);

        let mut wtr = WriterBuilder::new()
            .delimiter(self.delimiter)
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::CRLF)
            .from_writer(buf_writer);

        if !append {
            wtr.write_record(batch.schema.names())
                .map_err(|e| write_error(path, e))?;
        }

        let mut record: Vec<String> = Vec::with_capacity(batch.schema.len());
        for row in &batch.rows {
            record.clear();
            record.extend(row.iter().map(|v| self.render(v)));
            wtr.write_record(&record)
                .map_err(|e| write_error(path, e))?;
        }

        wtr.flush().map_err(|e| write_error(path, e))?;
        drop(wtr);

        let end_len = std::fs::metadata(path)
            .map_err(|e| write_error(path, e))?
            .len();
        Ok(end_len.saturating_sub(start_len))
    }
}
