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

//! # Period Decomposition
//!
//! Turns a `start`/`end` pair of period strings (`YYYY`, `YYYY-MM` or
//! `YYYY-MM-DD`) into a sequence of half-open calendar ranges, one per
//! output file.
//!
//! The step between ranges is always one calendar month. The granularity of
//! the input strings only decides how each range's file token is formatted
//! (`yyyy`, `yyyyMM` or `yyyyMMdd`) and how the range is labelled in logs.

use crate::domain::errors::{ExportError, Result};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Precision at which a period boundary string is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Year,
    Month,
    Day,
}

impl Granularity {
    /// Recognizes the exact shape of a period string.
    fn detect(s: &str) -> Option<Self> {
        let b = s.as_bytes();
        let digits = |range: std::ops::Range<usize>| b[range].iter().all(u8::is_ascii_digit);

        match b.len() {
            4 if digits(0..4) => Some(Granularity::Year),
            7 if digits(0..4) && b[4] == b'-' && digits(5..7) => Some(Granularity::Month),
            10 if digits(0..4)
                && b[4] == b'-'
                && digits(5..7)
                && b[7] == b'-'
                && digits(8..10) =>
            {
                Some(Granularity::Day)
            }
            _ => None,
        }
    }

    /// `chrono` format for the file-name token.
    fn token_format(self) -> &'static str {
        match self {
            Granularity::Year => "%Y",
            Granularity::Month => "%Y%m",
            Granularity::Day => "%Y%m%d",
        }
    }

    fn label_format(self) -> &'static str {
        match self {
            Granularity::Year => "%Y",
            Granularity::Month => "%Y-%m",
            Granularity::Day => "%Y-%m-%d",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Year => write!(f, "yearly"),
            Granularity::Month => write!(f, "monthly"),
            Granularity::Day => write!(f, "daily"),
        }
    }
}

/// Parses one period string into its granularity and its first calendar day.
pub fn parse_period(s: &str) -> Result<(Granularity, NaiveDate)> {
    let s = s.trim();
    let granularity = Granularity::detect(s).ok_or_else(|| {
        ExportError::ValidationError(format!(
            "period '{}' does not match yyyy, yyyy-MM or yyyy-MM-dd",
            s
        ))
    })?;

    let full = match granularity {
        Granularity::Year => format!("{}-01-01", s),
        Granularity::Month => format!("{}-01", s),
        Granularity::Day => s.to_string(),
    };

    let date = NaiveDate::parse_from_str(&full, "%Y-%m-%d").map_err(|e| {
        ExportError::ValidationError(format!("period '{}' is not a calendar date: {}", s, e))
    })?;

    Ok((granularity, date))
}

/// One half-open calendar interval `[start, end)` and the token naming its file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub granularity: Granularity,
}

impl PeriodRange {
    /// File-name token, e.g. `202201` for a monthly range starting 2022-01-01.
    pub fn token(&self) -> String {
        self.start
            .format(self.granularity.token_format())
            .to_string()
    }

    /// Human readable period name for logs.
    pub fn label(&self) -> String {
        self.start
            .format(self.granularity.label_format())
            .to_string()
    }
}

/// Validated decomposition of a start/end period pair.
///
/// Iterating a plan is lazy and can be repeated any number of times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodPlan {
    first_month: NaiveDate,
    end: NaiveDate,
    granularity: Granularity,
}

impl PeriodPlan {
    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn iter(&self) -> PeriodRanges {
        PeriodRanges {
            next_start: Some(self.first_month),
            end: self.end,
            granularity: self.granularity,
        }
    }
}

impl<'a> IntoIterator for &'a PeriodPlan {
    type Item = PeriodRange;
    type IntoIter = PeriodRanges;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the monthly ranges of a [`PeriodPlan`].
#[derive(Debug, Clone)]
pub struct PeriodRanges {
    next_start: Option<NaiveDate>,
    end: NaiveDate,
    granularity: Granularity,
}

impl Iterator for PeriodRanges {
    type Item = PeriodRange;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next_start.filter(|s| *s <= self.end)?;
        let end = start.checked_add_months(Months::new(1))?;
        self.next_start = Some(end);

        Some(PeriodRange {
            start,
            end,
            granularity: self.granularity,
        })
    }
}

/// Validates a start/end period pair and plans its sub-ranges.
///
/// Both strings must share one granularity and `start` must not be after `end`.
pub fn decompose(start: &str, end: &str) -> Result<PeriodPlan> {
    let (start_granularity, start_date) = parse_period(start)?;
    let (end_granularity, end_date) = parse_period(end)?;

    if start_granularity != end_granularity {
        return Err(ExportError::ValidationError(format!(
            "start period '{}' is {} but end period '{}' is {}; both must use the same format",
            start.trim(),
            start_granularity,
            end.trim(),
            end_granularity
        )));
    }

    if start_date > end_date {
        return Err(ExportError::ValidationError(format!(
            "start period '{}' is after end period '{}'",
            start.trim(),
            end.trim()
        )));
    }

    let first_month = start_date.with_day(1).unwrap_or(start_date);

    Ok(PeriodPlan {
        first_month,
        end: end_date,
        granularity: start_granularity,
    })
}
