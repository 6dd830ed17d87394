//! Redaction of personal data in loggable HTML excerpts.

use once_cell::sync::Lazy;
use regex::Regex;

/// Marker substituted for every email-like substring.
pub const REDACTION_MARKER: &str = "[redacted@mail]";

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("email pattern compiles")
});

/// Replace email-like substrings with [`REDACTION_MARKER`].
///
/// The logbook renders the account's email address into the page chrome, so
/// every HTML snippet destined for a log line passes through here first.
pub fn redact_emails(text: &str) -> String {
    EMAIL.replace_all(text, REDACTION_MARKER).into_owned()
}
