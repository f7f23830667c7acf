//! Energy meter log: date-stamped cumulative kWh readings, persisted as a single blob,
//! with per-interval averages and a linear 12-month projection.

pub mod average_calculator;
pub mod blob_store;
pub mod entry_store;
pub mod error;
pub mod import;
pub mod report;
pub mod usage_data;
