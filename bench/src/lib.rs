//! Benchmark harness for column-store time-series tables.
//!
//! Provisions the namespace the table lives in, generates synthetic rows,
//! bulk-loads them with wall-clock timing, and aggregates per-partition
//! storage statistics, comparing row-store and column-store encodings. All
//! database work goes through the `stratum-link` collaborator traits.

pub mod client;
pub mod config;
pub mod generator;
pub mod ingest;
pub mod provision;
pub mod repl;
pub mod report;
pub mod runner;
pub mod schema;
pub mod stats;
