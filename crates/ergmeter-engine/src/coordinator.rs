//! Per-account update coordinator.

use crate::error::EngineResult;
use crate::reconcile::reconcile;
use chrono::{Local, NaiveDate};
use ergmeter_core::{MeterState, MeterTotals, PollInterval, StatsSource};
use ergmeter_store::StateStore;
use tracing::{debug, info, warn};

/// Runs one full update cycle at a time for a single account:
/// fetch → load → reconcile → persist-if-changed → totals.
///
/// Owns the account's stats source and state store exclusively. The caller
/// (the scheduler) guarantees cycles never overlap; the coordinator only
/// writes state after a fully computed record exists, so a cancelled cycle
/// cannot leave a partial write behind.
pub struct UpdateCoordinator<S> {
    source: S,
    store: StateStore,
    interval: PollInterval,
    attempts: u64,
    last_success: bool,
    last_totals: Option<MeterTotals>,
    last_state: Option<MeterState>,
}

impl<S: StatsSource> UpdateCoordinator<S> {
    pub fn new(source: S, store: StateStore, interval: PollInterval) -> Self {
        Self {
            source,
            store,
            interval,
            attempts: 0,
            last_success: false,
            last_totals: None,
            last_state: None,
        }
    }

    /// Number of cycles attempted since construction.
    #[must_use]
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Whether the most recent cycle completed. Degraded cycles that fell
    /// back to stale values count as completed; only a store failure does not.
    #[must_use]
    pub fn last_success(&self) -> bool {
        self.last_success
    }

    /// Totals from the most recent completed cycle.
    #[must_use]
    pub fn last_totals(&self) -> Option<MeterTotals> {
        self.last_totals
    }

    /// Persisted record as of the most recent completed cycle.
    #[must_use]
    pub fn last_state(&self) -> Option<MeterState> {
        self.last_state
    }

    /// Configured poll interval.
    #[must_use]
    pub fn interval(&self) -> PollInterval {
        self.interval
    }

    /// Run one update cycle against the current local calendar date.
    pub async fn run_cycle(&mut self) -> EngineResult<MeterTotals> {
        let today = Local::now().date_naive();
        self.run_cycle_on(today).await
    }

    /// Run one update cycle for an explicit date. Split out so tests can
    /// drive day rollovers without waiting for midnight.
    pub async fn run_cycle_on(&mut self, today: NaiveDate) -> EngineResult<MeterTotals> {
        self.attempts += 1;
        info!(
            attempt = self.attempts,
            interval_min = self.interval.minutes(),
            "starting update cycle"
        );

        match self.cycle_inner(today).await {
            Ok(totals) => {
                self.last_success = true;
                self.last_totals = Some(totals);
                debug!(
                    lifetime = totals.lifetime_meters,
                    day = totals.day_meters,
                    season = totals.season_meters,
                    "finished update cycle"
                );
                Ok(totals)
            }
            Err(err) => {
                self.last_success = false;
                Err(err)
            }
        }
    }

    async fn cycle_inner(&mut self, today: NaiveDate) -> EngineResult<MeterTotals> {
        let fresh = self.source.fetch().await;
        if fresh.is_empty() {
            warn!("no fresh stats; using last known values");
        }

        let previous = self.store.load().await?;
        let outcome = reconcile(&fresh, &previous, today);

        match &outcome.next {
            Some(next) => {
                self.store.save(next).await?;
                self.last_state = Some(*next);
            }
            None => self.last_state = Some(previous),
        }

        Ok(outcome.totals)
    }
}
