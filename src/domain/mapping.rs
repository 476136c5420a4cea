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

//! # Type Mapping Logic
//!
//! This module is the "Translator" between what the ODBC driver reports for a
//! SQL Server column and the small set of value kinds the exporter works with.
//!
//! Two steps happen here:
//! 1. **Column Type**: the ODBC SQL data type of each result column becomes a
//!    [`ColumnType`], once per export.
//! 2. **Value Cast**: each fetched field, which arrives as text, is cast into a
//!    typed [`Value`] following its column type.

use crate::domain::entities::{ColumnType, Value};
use odbc_api::DataType;

/// Returns the column type used for values of an ODBC SQL data type.
pub fn map_odbc_type(data_type: &DataType) -> ColumnType {
    match data_type {
        DataType::TinyInt | DataType::SmallInt | DataType::Integer | DataType::BigInt => {
            ColumnType::Integer
        }

        DataType::Numeric { .. }
        | DataType::Decimal { .. }
        | DataType::Float { .. }
        | DataType::Real
        | DataType::Double => ColumnType::Decimal,

        DataType::Date | DataType::Time { .. } | DataType::Timestamp { .. } => {
            ColumnType::DateTime
        }

        DataType::Bit => ColumnType::Boolean,

        DataType::Binary { .. } | DataType::Varbinary { .. } | DataType::LongVarbinary { .. } => {
            ColumnType::Binary
        }

        // char/varchar/nvarchar/xml/uniqueidentifier/datetimeoffset and anything unknown
        _ => ColumnType::Text,
    }
}

/// Casts the text form of a non-NULL field into a typed value.
///
/// Text that does not parse as its declared type is kept as text rather than dropped.
pub fn cast_text(column_type: ColumnType, text: &str) -> Value {
    match column_type {
        ColumnType::Integer => text
            .parse::<i64>()
            .map(Value::Integer)
            .unwrap_or_else(|_| Value::Text(text.to_string())),
        ColumnType::Decimal => Value::Decimal(normalize_decimal(text)),
        ColumnType::DateTime => Value::DateTime(text.to_string()),
        ColumnType::Boolean => match text {
            "1" => Value::Boolean(true),
            "0" => Value::Boolean(false),
            other => Value::Text(other.to_string()),
        },
        ColumnType::Binary => hex::decode(text)
            .map(Value::Binary)
            .unwrap_or_else(|_| Value::Text(text.to_string())),
        ColumnType::Text => Value::Text(text.to_string()),
    }
}

/// The SQL Server driver drops the leading zero of fractions (`.50`, `-.5`).
fn normalize_decimal(text: &str) -> String {
    if let Some(rest) = text.strip_prefix("-.") {
        format!("-0.{}", rest)
    } else if text.starts_with('.') {
        format!("0{}", text)
    } else {
        text.to_string()
    }
}
