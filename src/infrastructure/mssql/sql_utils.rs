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

//! Utility functions for generating T-SQL statements.

use crate::domain::entities::Source;
use chrono::NaiveDate;

/// Bracket-quotes an identifier, doubling any closing bracket inside it.
pub fn quote_ident(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// `[schema].[table]`
pub fn qualified_name(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table))
}

/// Unseparated `'YYYYMMDD'` literal. Unlike `'YYYY-MM-DD'` it is read the same
/// way by `datetime` columns under every session language and DATEFORMAT.
pub fn date_literal(date: NaiveDate) -> String {
    format!("'{}'", date.format("%Y%m%d"))
}

/// Resolves a source into the statement that is actually executed.
///
/// Table references become `SELECT *`; free-form queries are used verbatim.
pub fn select_for_source(source: &Source) -> String {
    match source {
        Source::TableRef { schema, name } => {
            format!("SELECT * FROM {}", qualified_name(schema, name))
        }
        Source::RawQuery { text } => text.clone(),
    }
}

/// `SELECT *` restricted to `[start, end)` on a date column.
pub fn select_date_range(
    schema: &str,
    table: &str,
    date_column: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> String {
    let column = quote_ident(date_column);
    format!(
        "SELECT * FROM {} WHERE {} >= {} AND {} < {}",
        qualified_name(schema, table),
        column,
        date_literal(start),
        column,
        date_literal(end)
    )
}
