//! Authenticated session client for the logbook website.
//!
//! Wraps a cookie-carrying HTTP session, logs in lazily via the site's
//! anti-forgery token, and fetches the stats page. This crate is the sole
//! boundary between network or parse failure and the reconciliation engine:
//! `fetch_stats` never errors, it returns absent fields.

pub mod client;
pub mod endpoints;
pub mod error;

pub use client::{Credentials, LogbookClient};
pub use endpoints::{LogbookEndpoints, DEFAULT_BASE_URL};
pub use error::{ClientError, ClientResult};
