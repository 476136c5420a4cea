//! Application layer: the batching pipeline and the period driver.

pub mod period_exporter;
pub mod range_exporter;
pub mod report;
pub mod row_batcher;
