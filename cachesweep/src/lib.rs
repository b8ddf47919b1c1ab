//! Cache simulator parameter sweeps (`cachesweep`)
//!
//! Runs an external cache simulator over every configuration of a
//! parameter grid and collects its hit, miss and eviction counters
//! into a table.

// Modules
pub mod invoker;
pub mod metrics;
pub mod sweep;
pub mod table;

// Exports
pub use self::{
	invoker::{Invoker, ProcessInvoker, RunError},
	metrics::{ExtractError, MetricRecord},
	sweep::{Configuration, Grid, Outcome, SkipCounts, Sweep, SweepOutput},
	table::ResultTable,
};
