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

//! Port for persisting row batches.

use crate::domain::entities::Batch;
use crate::domain::errors::Result;
use std::path::Path;

/// Writes batches to a target file.
pub trait BatchWriterPort {
    /// Serializes `batch` into `path`.
    ///
    /// With `append == false` the file is created or truncated and a header is
    /// written first. With `append == true` the file must already exist and no
    /// header is repeated. Returns the number of bytes written.
    fn write_batch(&self, batch: &Batch, path: &Path, append: bool) -> Result<u64>;
}
