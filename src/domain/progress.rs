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

//! Row and timing counters for a single export.

use std::time::{Duration, Instant};

/// Timings reported after each flushed batch.
#[derive(Debug, Clone, Copy)]
pub struct BatchTiming {
    pub batch_number: u64,
    pub rows_in_batch: u64,
    pub total_rows: u64,
    pub elapsed: Duration,
    /// Time since the previous batch was flushed (or since start).
    pub delta: Duration,
}

/// Counters for one Single-Range export. A new tracker is made per sub-range.
#[derive(Debug)]
pub struct ProgressTracker {
    started: Instant,
    last_batch: Instant,
    total_rows: u64,
    batches: u64,
    bytes: u64,
    output_started: bool,
}

impl ProgressTracker {
    pub fn start() -> Self {
        let now = Instant::now();
        Self {
            started: now,
            last_batch: now,
            total_rows: 0,
            batches: 0,
            bytes: 0,
            output_started: false,
        }
    }

    /// Marks that a write to the output file has begun. Set before the first
    /// write so a failure inside it still counts as touching the file.
    pub fn begin_write(&mut self) {
        self.output_started = true;
    }

    pub fn output_started(&self) -> bool {
        self.output_started
    }

    pub fn record_batch(&mut self, rows: usize, bytes: u64) -> BatchTiming {
        let now = Instant::now();
        let delta = now.duration_since(self.last_batch);
        self.last_batch = now;
        self.total_rows += rows as u64;
        self.batches += 1;
        self.bytes += bytes;

        BatchTiming {
            batch_number: self.batches,
            rows_in_batch: rows as u64,
            total_rows: self.total_rows,
            elapsed: now.duration_since(self.started),
            delta,
        }
    }

    pub fn total_rows(&self) -> u64 {
        self.total_rows
    }

    pub fn batches(&self) -> u64 {
        self.batches
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Mean time per flushed batch, zero when nothing was flushed.
    pub fn average_per_batch(&self) -> Duration {
        match u32::try_from(self.batches) {
            Ok(0) => Duration::ZERO,
            Ok(n) => self.elapsed() / n,
            Err(_) => Duration::from_secs_f64(self.elapsed().as_secs_f64() / self.batches as f64),
        }
    }
}
