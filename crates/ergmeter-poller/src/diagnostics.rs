//! Read-only diagnostics snapshots.

use ergmeter_core::{MeterState, MeterTotals};
use serde::Serialize;

/// Marker substituted for credential fields in diagnostics output.
pub const REDACTED: &str = "**REDACTED**";

/// Point-in-time view of one account's poller.
///
/// Credential fields are always redacted before a snapshot leaves the
/// process; the struct carries them anyway so the output shape makes the
/// redaction visible rather than silently dropping the fields.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticsSnapshot {
    pub account: String,
    pub username: String,
    pub password: String,
    pub update_interval_sec: u64,
    pub attempts: u64,
    pub last_update_success: bool,
    /// Totals from the latest completed cycle.
    pub data: Option<MeterTotals>,
    /// Raw persisted record as of the latest completed cycle.
    pub storage_state: Option<MeterState>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_redaction_markers() {
        let snapshot = DiagnosticsSnapshot {
            account: "alice".into(),
            username: REDACTED.into(),
            password: REDACTED.into(),
            update_interval_sec: 1800,
            attempts: 3,
            last_update_success: true,
            data: Some(MeterTotals {
                lifetime_meters: 1800,
                day_meters: 300,
                season_meters: 300,
            }),
            storage_state: None,
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("**REDACTED**"));
        assert!(json.contains("\"attempts\":3"));
        assert!(json.contains("\"day_meters\":300"));
    }
}
