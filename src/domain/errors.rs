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

//! Core error definitions for the SQL Server CSV Exporter.
//!
//! This module provides a centralized `ExportError` enum and a `Result` type
//! used throughout the application. The variants follow the order in which an
//! export can fail: input validation, connecting, reading rows, writing files.

use thiserror::Error;

/// Error types encountered during the export process.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Raised before any connection is opened.
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Connection failed: {0}")]
    ConnectionError(String),

    #[error("Read failed: {0}")]
    ReadError(String),

    #[error("Write failed for {path}: {reason}")]
    WriteError { path: String, reason: String },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ExportError {
    /// Short, stable label used when reporting a failure.
    pub fn kind(&self) -> &'static str {
        match self {
            ExportError::ConfigError(_) => "config",
            ExportError::ValidationError(_) => "validation",
            ExportError::ConnectionError(_) => "connection",
            ExportError::ReadError(_) => "read",
            ExportError::WriteError { .. } => "write",
            ExportError::IoError(_) => "io",
        }
    }
}

/// A specialized Result type for the SQL Server CSV Exporter.
pub type Result<T> = std::result::Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(ExportError::ValidationError("x".into()).kind(), "validation");
        assert_eq!(ExportError::ConnectionError("x".into()).kind(), "connection");
        assert_eq!(ExportError::ReadError("x".into()).kind(), "read");
        let write = ExportError::WriteError {
            path: "out.csv".into(),
            reason: "disk full".into(),
        };
        assert_eq!(write.kind(), "write");
        assert_eq!(write.to_string(), "Write failed for out.csv: disk full");
    }
}
