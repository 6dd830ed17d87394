//! Meter counter types.
//!
//! The logbook site only exposes cumulative counters (lifetime and season
//! meters). The "day meters" value has to be manufactured locally from a
//! baseline captured at the start of each local calendar day, so three
//! distinct shapes exist: the fresh facts of one scrape, the durable
//! per-account record, and the derived output.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fresh facts scraped from the logbook in one update cycle.
///
/// Either field is `None` when the fetch failed or the markup did not yield
/// a parseable number. A reading is ephemeral and never persisted directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeterReading {
    /// Cumulative lifetime meters, if the page yielded them.
    pub lifetime: Option<u64>,
    /// Cumulative season meters, if the page yielded them.
    pub season: Option<u64>,
}

impl MeterReading {
    /// Create a reading with both fields known.
    pub fn new(lifetime: u64, season: u64) -> Self {
        Self {
            lifetime: Some(lifetime),
            season: Some(season),
        }
    }

    /// True when the cycle recovered neither counter.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lifetime.is_none() && self.season.is_none()
    }
}

/// Durable per-account record carried between cycles.
///
/// `date` is the local calendar day the current baseline belongs to; it is
/// `None` only before the very first completed cycle. A fetched value smaller
/// than the stored one is accepted as the new truth (the site resets season
/// counters at season boundaries).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeterState {
    /// Local calendar date of the last baseline reset.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Lifetime meters captured at the start of the current local day.
    #[serde(default)]
    pub baseline: u64,
    /// Last known lifetime meters.
    #[serde(default)]
    pub lifetime: u64,
    /// Last known season meters.
    #[serde(default)]
    pub season: u64,
}

/// Derived output of one update cycle.
///
/// Recomputed every cycle and never persisted; consumers read the latest
/// snapshot only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeterTotals {
    pub lifetime_meters: u64,
    pub day_meters: u64,
    pub season_meters: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn empty_reading() {
        assert!(MeterReading::default().is_empty());
        assert!(!MeterReading::new(1, 2).is_empty());
        assert!(!MeterReading {
            lifetime: None,
            season: Some(0)
        }
        .is_empty());
    }

    #[test]
    fn state_round_trips_through_json() {
        let state = MeterState {
            date: NaiveDate::from_ymd_opt(2024, 1, 2),
            baseline: 1500,
            lifetime: 1800,
            season: 300,
        };
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("2024-01-02"));
        let back: MeterState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn state_defaults_missing_fields() {
        let back: MeterState = serde_json::from_str("{}").unwrap();
        assert_eq!(back, MeterState::default());
        assert!(back.date.is_none());
    }
}
