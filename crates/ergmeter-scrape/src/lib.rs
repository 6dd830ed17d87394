//! HTML extraction of logbook meter counters.
//!
//! Pure, best-effort functions over raw HTML text: no network, no state,
//! no failures. Anything that cannot be determined comes back as `None`.
//! The scanning is deliberately naive string work tailored to the logbook
//! markup rather than a full HTML tree; the page structure has been stable
//! for years and the raw-regex fallback catches the rest.

pub mod extract;
pub mod number;
pub mod redact;
pub mod token;

pub use extract::extract_meters;
pub use number::clean_number;
pub use redact::{redact_emails, REDACTION_MARKER};
pub use token::find_csrf_token;
