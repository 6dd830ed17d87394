//! The reconciliation policy.

use chrono::NaiveDate;
use ergmeter_core::{MeterReading, MeterState, MeterTotals};

/// Result of reconciling one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleOutcome {
    /// Derived totals for this cycle.
    pub totals: MeterTotals,
    /// Record to persist, or `None` when the cycle must not touch storage.
    pub next: Option<MeterState>,
}

/// Merge a fresh reading with the persisted record for the given local day.
///
/// Policy, in order:
///
/// 1. Day rollover (stored date differs from `today`, including first run):
///    re-baseline on the fresh lifetime value when present, otherwise on the
///    stored one; day meters are 0 unconditionally, whether or not the fetch
///    brought data. Persisted immediately.
/// 2. Empty reading, no rollover: the site is unreachable or its markup
///    drifted. Derive totals from the stored record and persist nothing.
/// 3. Otherwise: absent fields fall back to stored values; day meters are
///    `lifetime - baseline` clamped at zero (an upstream counter reset must
///    not produce a negative day). Date and baseline stay as they are.
///
/// A fetched value smaller than the stored one is accepted as the new truth;
/// the site legitimately resets season counters at season boundaries.
pub fn reconcile(fresh: &MeterReading, previous: &MeterState, today: NaiveDate) -> CycleOutcome {
    if previous.date != Some(today) {
        let lifetime = fresh.lifetime.unwrap_or(previous.lifetime);
        let season = fresh.season.unwrap_or(previous.season);
        let next = MeterState {
            date: Some(today),
            baseline: lifetime,
            lifetime,
            season,
        };
        return CycleOutcome {
            totals: MeterTotals {
                lifetime_meters: lifetime,
                day_meters: 0,
                season_meters: season,
            },
            next: Some(next),
        };
    }

    if fresh.is_empty() {
        return CycleOutcome {
            totals: MeterTotals {
                lifetime_meters: previous.lifetime,
                day_meters: previous.lifetime.saturating_sub(previous.baseline),
                season_meters: previous.season,
            },
            next: None,
        };
    }

    let lifetime = fresh.lifetime.unwrap_or(previous.lifetime);
    let season = fresh.season.unwrap_or(previous.season);
    let day_meters = lifetime.saturating_sub(previous.baseline);

    CycleOutcome {
        totals: MeterTotals {
            lifetime_meters: lifetime,
            day_meters,
            season_meters: season,
        },
        next: Some(MeterState {
            date: previous.date,
            baseline: previous.baseline,
            lifetime,
            season,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn steady_state() -> MeterState {
        MeterState {
            date: Some(date("2024-01-02")),
            baseline: 1500,
            lifetime: 1500,
            season: 300,
        }
    }

    #[test]
    fn first_run_establishes_baseline() {
        let outcome = reconcile(
            &MeterReading::new(1500, 300),
            &MeterState::default(),
            date("2024-01-01"),
        );

        assert_eq!(
            outcome.totals,
            MeterTotals {
                lifetime_meters: 1500,
                day_meters: 0,
                season_meters: 300,
            }
        );
        let next = outcome.next.unwrap();
        assert_eq!(next.date, Some(date("2024-01-01")));
        assert_eq!(next.baseline, 1500);
    }

    #[test]
    fn rollover_zeroes_day_and_rebaselines() {
        let previous = MeterState {
            date: Some(date("2024-01-01")),
            baseline: 1000,
            lifetime: 1500,
            season: 300,
        };
        let outcome = reconcile(&MeterReading::new(1500, 300), &previous, date("2024-01-02"));

        assert_eq!(
            outcome.totals,
            MeterTotals {
                lifetime_meters: 1500,
                day_meters: 0,
                season_meters: 300,
            }
        );
        assert_eq!(outcome.next.unwrap().baseline, 1500);
    }

    #[test]
    fn rollover_with_empty_reading_still_persists_the_new_day() {
        let previous = MeterState {
            date: Some(date("2024-01-01")),
            baseline: 1000,
            lifetime: 1500,
            season: 300,
        };
        let outcome = reconcile(&MeterReading::default(), &previous, date("2024-01-02"));

        assert_eq!(outcome.totals.day_meters, 0);
        assert_eq!(outcome.totals.lifetime_meters, 1500);
        let next = outcome.next.expect("rollover always persists");
        assert_eq!(next.date, Some(date("2024-01-02")));
        assert_eq!(next.baseline, 1500);
    }

    #[test]
    fn mid_day_growth() {
        let outcome = reconcile(
            &MeterReading::new(1800, 300),
            &steady_state(),
            date("2024-01-02"),
        );

        assert_eq!(
            outcome.totals,
            MeterTotals {
                lifetime_meters: 1800,
                day_meters: 300,
                season_meters: 300,
            }
        );
        let next = outcome.next.unwrap();
        assert_eq!(next.lifetime, 1800);
        assert_eq!(next.baseline, 1500);
        assert_eq!(next.date, Some(date("2024-01-02")));
    }

    #[test]
    fn same_reading_twice_is_idempotent() {
        let first = reconcile(
            &MeterReading::new(1800, 300),
            &steady_state(),
            date("2024-01-02"),
        );
        let second = reconcile(
            &MeterReading::new(1800, 300),
            &first.next.unwrap(),
            date("2024-01-02"),
        );

        assert_eq!(first.totals, second.totals);
        assert_eq!(first.next, second.next);
    }

    #[test]
    fn empty_reading_keeps_stale_values_and_touches_nothing() {
        let previous = MeterState {
            date: Some(date("2024-01-02")),
            baseline: 1500,
            lifetime: 1800,
            season: 300,
        };
        let outcome = reconcile(&MeterReading::default(), &previous, date("2024-01-02"));

        assert_eq!(
            outcome.totals,
            MeterTotals {
                lifetime_meters: 1800,
                day_meters: 300,
                season_meters: 300,
            }
        );
        assert_eq!(outcome.next, None);
    }

    #[test]
    fn partial_reading_fills_from_previous() {
        let fresh = MeterReading {
            lifetime: None,
            season: Some(350),
        };
        let outcome = reconcile(&fresh, &steady_state(), date("2024-01-02"));

        assert_eq!(outcome.totals.lifetime_meters, 1500);
        assert_eq!(outcome.totals.season_meters, 350);
        let next = outcome.next.unwrap();
        assert_eq!(next.lifetime, 1500);
        assert_eq!(next.season, 350);
    }

    #[test]
    fn day_meters_clamp_at_zero() {
        // Upstream anomaly: the counter fell below the day baseline.
        let fresh = MeterReading::new(1400, 300);
        let outcome = reconcile(&fresh, &steady_state(), date("2024-01-02"));

        assert_eq!(outcome.totals.day_meters, 0);
        assert_eq!(outcome.totals.lifetime_meters, 1400);
        // The smaller value is the new truth.
        assert_eq!(outcome.next.unwrap().lifetime, 1400);
    }

    #[test]
    fn season_reset_is_accepted() {
        let previous = MeterState {
            date: Some(date("2024-05-01")),
            baseline: 9000,
            lifetime: 9000,
            season: 800_000,
        };
        let outcome = reconcile(&MeterReading::new(9100, 100), &previous, date("2024-05-01"));

        assert_eq!(outcome.totals.season_meters, 100);
        assert_eq!(outcome.next.unwrap().season, 100);
    }

    #[test]
    fn stale_fallback_clamps_when_baseline_outruns_lifetime() {
        let previous = MeterState {
            date: Some(date("2024-01-02")),
            baseline: 2000,
            lifetime: 1800,
            season: 300,
        };
        let outcome = reconcile(&MeterReading::default(), &previous, date("2024-01-02"));
        assert_eq!(outcome.totals.day_meters, 0);
    }
}
