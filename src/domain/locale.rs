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

//! Decimal formatting rules for numeric CSV fields.
//!
//! The locale is an explicit value handed to the CSV writer; nothing here
//! reads or changes process-wide state.

use crate::domain::errors::{ExportError, Result};

pub const DEFAULT_LOCALE: &str = "en-US";

/// Languages whose conventional decimal separator is a comma.
const COMMA_LANGUAGES: &[&str] = &[
    "bg", "ca", "cs", "da", "de", "el", "es", "et", "fi", "fr", "hr", "hu", "id", "is", "it", "lt",
    "lv", "nb", "nl", "nn", "no", "pl", "pt", "ro", "ru", "sk", "sl", "sr", "sv", "tr", "uk", "vi",
];

/// Languages whose conventional decimal separator is a period.
const PERIOD_LANGUAGES: &[&str] = &[
    "ar", "en", "he", "hi", "ja", "ko", "ms", "th", "zh",
];

/// Regions that use a period even though the language usually does not.
const PERIOD_REGION_OVERRIDES: &[&str] = &["de-CH", "de-LI", "fr-CH", "it-CH", "es-MX", "es-US"];

/// Numeric formatting for one culture identifier such as `en-US` or `de-DE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberLocale {
    name: String,
    decimal_separator: char,
}

impl NumberLocale {
    /// Resolves a culture identifier (`ll` or `ll-CC`, any case, `_` accepted).
    pub fn parse(identifier: &str) -> Result<Self> {
        let normalized = identifier.trim().replace('_', "-");
        let mut parts = normalized.splitn(2, '-');
        let language = parts.next().unwrap_or("").to_ascii_lowercase();
        let region = parts.next().map(|r| r.to_ascii_uppercase());

        let name = match &region {
            Some(r) => format!("{}-{}", language, r),
            None => language.clone(),
        };

        let decimal_separator = if PERIOD_REGION_OVERRIDES.contains(&name.as_str()) {
            '.'
        } else if COMMA_LANGUAGES.contains(&language.as_str()) {
            ','
        } else if PERIOD_LANGUAGES.contains(&language.as_str()) {
            '.'
        } else {
            return Err(ExportError::ConfigError(format!(
                "Unsupported locale '{}'",
                identifier
            )));
        };

        Ok(Self {
            name,
            decimal_separator,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn decimal_separator(&self) -> char {
        self.decimal_separator
    }

    /// Rewrites the `.` of a canonical numeric string to this locale's separator.
    pub fn format_decimal(&self, canonical: &str) -> String {
        if self.decimal_separator == '.' {
            canonical.to_string()
        } else {
            canonical.replacen('.', &self.decimal_separator.to_string(), 1)
        }
    }
}

impl Default for NumberLocale {
    fn default() -> Self {
        Self {
            name: DEFAULT_LOCALE.to_string(),
            decimal_separator: '.',
        }
    }
}
