//! Core domain types for the ergmeter logbook poller.
//!
//! This crate provides the types shared by every component:
//! - `MeterReading`: fresh facts scraped from the logbook in one cycle
//! - `MeterState`: the durable per-account record between cycles
//! - `MeterTotals`: the derived lifetime / day / season output
//! - `PollInterval`: range-validated poll interval
//! - `StatsSource`: the seam between the HTTP client and the engine

pub mod error;
pub mod interval;
pub mod source;
pub mod types;

pub use error::{CoreError, Result};
pub use interval::{PollInterval, INTERVAL_MAX_MINUTES, INTERVAL_MIN_MINUTES};
pub use source::{BoxFuture, ScriptedSource, StatsSource};
pub use types::{MeterReading, MeterState, MeterTotals};
