//! Run metrics and logging setup.
//!
//! The orchestrator feeds every emitted [`SimEvent`] into [`Metrics`], which
//! keeps per-kind counters and logs a population summary every 1000 ticks.

use orchard_data::SimEvent;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

pub struct Metrics {
    tick_count: AtomicU64,
    creature_count: AtomicU64,
    tree_count: AtomicU64,
    counters: Mutex<BTreeMap<String, u64>>,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("tick_count", &self.tick_count())
            .field("counters", &self.counters())
            .finish()
    }
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tick_count: AtomicU64::new(0),
            creature_count: AtomicU64::new(0),
            tree_count: AtomicU64::new(0),
            counters: Mutex::new(BTreeMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Records a completed tick with its wall-clock duration.
    pub fn record_tick(&self, duration: Duration, creatures: usize, trees: usize) {
        let tick = self.tick_count.fetch_add(1, Ordering::Relaxed) + 1;
        self.creature_count.store(creatures as u64, Ordering::Relaxed);
        self.tree_count.store(trees as u64, Ordering::Relaxed);

        if tick.is_multiple_of(1000) {
            tracing::info!(
                tick,
                creatures,
                trees,
                duration_us = duration.as_micros() as u64,
                "Simulation tick"
            );
        }
    }

    /// Counts `event` under its kind; deaths are also counted per cause.
    pub fn record_event(&self, event: &SimEvent) {
        self.increment_counter(event.kind());
        if let SimEvent::CreatureDeath { cause, .. } = event {
            self.increment_counter(&format!("creature_death.{cause:?}"));
        }
    }

    pub fn increment_counter(&self, name: &str) {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        *counters.entry(name.to_string()).or_insert(0) += 1;
    }

    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters.get(name).copied().unwrap_or(0)
    }

    /// Snapshot of every named counter, sorted by name.
    #[must_use]
    pub fn counters(&self) -> BTreeMap<String, u64> {
        self.counters
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn creature_count(&self) -> u64 {
        self.creature_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn tree_count(&self) -> u64 {
        self.tree_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Installs the global fmt subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(filter)
            .finish(),
    )
    .ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use orchard_data::{DeathCause, EntityId};

    #[test]
    fn test_record_tick() {
        let metrics = Metrics::new();
        metrics.record_tick(Duration::from_millis(2), 100, 30);
        assert_eq!(metrics.tick_count(), 1);
        assert_eq!(metrics.creature_count(), 100);
        assert_eq!(metrics.tree_count(), 30);
    }

    #[test]
    fn test_death_causes_are_counted_separately() {
        let metrics = Metrics::new();
        metrics.record_event(&SimEvent::CreatureDeath {
            id: EntityId(1),
            cause: DeathCause::Starvation,
        });
        metrics.record_event(&SimEvent::CreatureDeath {
            id: EntityId(2),
            cause: DeathCause::Aging,
        });
        assert_eq!(metrics.counter("creature_death"), 2);
        assert_eq!(metrics.counter("creature_death.Starvation"), 1);
        assert_eq!(metrics.counter("creature_death.Aging"), 1);
        assert_eq!(metrics.counter("fruit_created"), 0);
    }
}
