//! Stats source trait.
//!
//! Seam between the reconciliation engine and whatever produces fresh
//! readings (the live HTTP client in production, a scripted source in
//! tests). A source never fails: absent fields already express every
//! failure mode the engine needs to know about.

use crate::types::MeterReading;
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Mutex;

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Producer of fresh meter readings, one per update cycle.
pub trait StatsSource: Send {
    /// Fetch the current counters. Infallible by contract: transport,
    /// authentication, and parse failures all surface as absent fields.
    fn fetch(&mut self) -> BoxFuture<'_, MeterReading>;
}

/// Scripted source for exercising the engine without a live site.
///
/// Pops one queued reading per fetch; an exhausted script yields empty
/// readings, which is exactly what a dead site looks like.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    readings: Mutex<VecDeque<MeterReading>>,
}

impl ScriptedSource {
    /// Create a source that replays `readings` in order.
    pub fn new(readings: impl IntoIterator<Item = MeterReading>) -> Self {
        Self {
            readings: Mutex::new(readings.into_iter().collect()),
        }
    }

    /// Queue another reading.
    pub fn push(&self, reading: MeterReading) {
        self.readings
            .lock()
            .expect("scripted source lock poisoned")
            .push_back(reading);
    }
}

impl StatsSource for ScriptedSource {
    fn fetch(&mut self) -> BoxFuture<'_, MeterReading> {
        Box::pin(async {
            self.readings
                .lock()
                .expect("scripted source lock poisoned")
                .pop_front()
                .unwrap_or_default()
        })
    }
}
