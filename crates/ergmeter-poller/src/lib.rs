//! Scheduler binary for the ergmeter logbook poller.
//!
//! Wires the per-account pieces together:
//! - TOML configuration with load-time validation
//! - an explicit account registry (owned client + store + status per account)
//! - one timer task per account, at most one in-flight cycle each
//! - credential-redacted diagnostics snapshots

pub mod app;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod logging;

pub use app::{AccountStatus, Application};
pub use config::{AccountConfig, AppConfig};
pub use diagnostics::{DiagnosticsSnapshot, REDACTED};
pub use error::{AppError, AppResult};
