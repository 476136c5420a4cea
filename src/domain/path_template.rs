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

//! Output path templates for period exports.

use crate::domain::errors::{ExportError, Result};
use std::path::PathBuf;

/// Literal placeholder replaced by the period token.
pub const PLACEHOLDER: &str = "{}";

/// An output path containing exactly one literal `{}`.
///
/// Other braces in the path are left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    prefix: String,
    suffix: String,
}

impl PathTemplate {
    pub fn parse(template: &str) -> Result<Self> {
        match template.matches(PLACEHOLDER).count() {
            1 => {
                let (prefix, rest) = template.split_once(PLACEHOLDER).ok_or_else(|| {
                    ExportError::ValidationError(format!("Missing '{}' in '{}'", PLACEHOLDER, template))
                })?;
                Ok(Self {
                    prefix: prefix.to_string(),
                    suffix: rest.to_string(),
                })
            }
            0 => Err(ExportError::ValidationError(format!(
                "Output path template '{}' has no '{}' placeholder for the period token",
                template, PLACEHOLDER
            ))),
            n => Err(ExportError::ValidationError(format!(
                "Output path template '{}' has {} '{}' placeholders; exactly one is allowed",
                template, n, PLACEHOLDER
            ))),
        }
    }

    pub fn render(&self, token: &str) -> PathBuf {
        PathBuf::from(format!("{}{}{}", self.prefix, token, self.suffix))
    }
}
